use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use gluco_core::service::AgentService;
use gluco_core::users::parse_users_csv;

/// Load a user CSV into the agent database and make it the default login table.
pub fn cmd_import_users(config: &Config, path: &Path, json: bool) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let users = parse_users_csv(file)?;

    if users.is_empty() {
        if json {
            println!(
                "{}",
                serde_json::json!({ "error": "No users found in CSV file" })
            );
        } else {
            eprintln!("No users found in CSV file.");
        }
        return Ok(());
    }

    let service = AgentService::new(&config.db_path)?;
    let imported = service.import_users(&users)?;

    let same_file = std::fs::canonicalize(path).ok()
        == std::fs::canonicalize(&config.users_path).ok();
    if !same_file {
        std::fs::copy(path, &config.users_path).with_context(|| {
            format!("Failed to copy user table to {}", config.users_path.display())
        })?;
    }

    if json {
        println!(
            "{}",
            serde_json::json!({
                "users_imported": imported,
                "users_path": config.users_path,
                "db_path": config.db_path,
            })
        );
    } else {
        println!("Import complete.\n");
        println!("  Users imported: {imported}");
        println!("  User table:     {}", config.users_path.display());
        println!("  Agent database: {}", config.db_path.display());
    }

    Ok(())
}
