use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::models::UserProfile;

/// Parse the user table from any reader.
///
/// The header row names the fields (matched case-insensitively). Only
/// `user_id` is required; missing optional columns read as empty text and
/// rows with a blank id are skipped.
pub fn parse_users_csv<R: Read>(reader: R) -> Result<Vec<UserProfile>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV headers")?.clone();

    let col =
        |name: &str| -> Option<usize> { headers.iter().position(|h| h.eq_ignore_ascii_case(name)) };

    let Some(idx_id) = col("user_id") else {
        bail!("Missing required column: user_id");
    };

    let columns = [
        col("first_name"),
        col("last_name"),
        col("city"),
        col("dietary_preference"),
        col("medical_conditions"),
        col("physical_limitations"),
        col("latest_cgm"),
        col("mood"),
    ];

    let mut users = Vec::new();

    for (line_num, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to parse CSV row {}", line_num + 2))?;

        let user_id = record.get(idx_id).unwrap_or("").to_string();
        if user_id.is_empty() {
            continue;
        }

        let [
            first_name,
            last_name,
            city,
            dietary_preference,
            medical_conditions,
            physical_limitations,
            latest_cgm,
            mood,
        ] = columns.map(|idx| {
            idx.and_then(|i| record.get(i))
                .unwrap_or("")
                .to_string()
        });

        users.push(UserProfile {
            user_id,
            first_name,
            last_name,
            city,
            dietary_preference,
            medical_conditions,
            physical_limitations,
            latest_cgm,
            mood,
        });
    }

    Ok(users)
}

/// User table indexed by id. Loaded once and read-only afterwards.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Vec<UserProfile>,
    by_id: HashMap<String, usize>,
}

impl UserDirectory {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let users = parse_users_csv(reader)?;
        let mut by_id = HashMap::with_capacity(users.len());
        for (i, u) in users.iter().enumerate() {
            // first row wins for a repeated id
            by_id.entry(u.user_id.clone()).or_insert(i);
        }
        Ok(Self { users, by_id })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open user table: {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Failed to load user table: {}", path.display()))
    }

    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<&UserProfile> {
        self.by_id.get(user_id.trim()).map(|&i| &self.users[i])
    }

    #[must_use]
    pub fn contains(&self, user_id: &str) -> bool {
        self.get(user_id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserProfile> {
        self.users.iter()
    }
}
