use std::fmt::Write as _;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::agent::{AgentBackend, AgentRequest, AgentResponse, extract_mood, first_number};
use crate::db::Database;
use crate::meal_plan::generate_meal_plan;
use crate::models::{
    CRITICAL_HIGH_MG_DL, CRITICAL_LOW_MG_DL, GlucoseStatus, Intent, LogEntry, LogKind, Macros,
    NutritionInfo, UserProfile,
};
use crate::nutrition;
use crate::responder::contextual_response;
use crate::users::parse_users_csv;

pub const INVALID_ID_RESPONSE: &str =
    "Invalid ID. Please use a valid ID, such as '1001', for this demo.";
pub const NOT_VALIDATED_RESPONSE: &str =
    "Please validate your User ID before proceeding with logs or plans.";
pub const UNKNOWN_INTENT_RESPONSE: &str = "Unknown intent. How can I assist you today?";
pub const RETURN_TO_FLOW: &str = "Now, what would you like to log or plan next?";

/// Backend side of the agent API: a rule engine over the `users`/`logs`
/// store. One instance is shared by every request handler.
pub struct AgentService {
    db: Mutex<Database>,
}

impl AgentService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db: Mutex::new(db) })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db: Mutex::new(db) })
    }

    fn db(&self) -> MutexGuard<'_, Database> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Users ---

    pub fn import_users_csv<R: std::io::Read>(&self, reader: R) -> Result<usize> {
        let users = parse_users_csv(reader)?;
        let n = self.db().import_users(&users)?;
        info!(count = n, "imported users");
        Ok(n)
    }

    pub fn import_users(&self, users: &[UserProfile]) -> Result<usize> {
        self.db().import_users(users)
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.db().get_user(user_id)
    }

    pub fn count_users(&self) -> Result<i64> {
        self.db().count_users()
    }

    pub fn get_logs(
        &self,
        user_id: &str,
        kind: Option<LogKind>,
        limit: i64,
    ) -> Result<Vec<LogEntry>> {
        self.db().get_logs(user_id, kind, limit)
    }

    // --- Agent ---

    /// Route one request. Intent labels are matched case-insensitively;
    /// every intent except `validate` needs a known user.
    pub fn handle(&self, request: &AgentRequest) -> Result<AgentResponse> {
        let user_id = request.user_id.trim();
        let intent = request.intent.parse::<Intent>().ok();
        info!(user_id, intent = %request.intent, "agent request");

        let Some(user) = self.get_user(user_id)? else {
            debug!(user_id, "unknown user");
            return Ok(AgentResponse::text(if intent == Some(Intent::Validate) {
                INVALID_ID_RESPONSE
            } else {
                NOT_VALIDATED_RESPONSE
            }));
        };

        let Some(intent) = intent else {
            warn!(intent = %request.intent, "unknown intent");
            return Ok(AgentResponse::text(UNKNOWN_INTENT_RESPONSE));
        };

        match intent {
            Intent::Validate => Ok(AgentResponse::with_user(greeting(&user), user)),
            Intent::LogGlucose => self.log_glucose(user, &request.message),
            Intent::LogMood => self.log_mood(user, &request.message),
            Intent::LogFood => self.log_food(user, &request.message),
            Intent::GeneratePlan => {
                let text = render_meal_plan(&user);
                Ok(AgentResponse::with_user(text, user))
            }
            Intent::GeneralQuery => {
                let text = format!(
                    "{}\n\n{RETURN_TO_FLOW}",
                    contextual_response(&request.message, &user)
                );
                Ok(AgentResponse::with_user(text, user))
            }
        }
    }

    fn log_glucose(&self, user: UserProfile, message: &str) -> Result<AgentResponse> {
        let Some(digits) = first_number(message) else {
            return Ok(AgentResponse::with_user(
                "I couldn't find a glucose reading in that message. \
                 Try something like \"Log glucose 120\".",
                user,
            ));
        };
        let Some(reading) = digits.parse::<i64>().ok().filter(|v| *v > 0) else {
            debug!(user_id = %user.user_id, digits, "rejected glucose value");
            return Ok(AgentResponse::with_user(
                format!(
                    "{digits} isn't a valid glucose reading. \
                     Please enter a reading in mg/dL, for example \"Log glucose 120\"."
                ),
                user,
            ));
        };

        let updated = {
            let db = self.db();
            db.insert_log(&user.user_id, LogKind::Cgm, None, Some(reading))?;
            db.get_user(&user.user_id)?
        };
        info!(user_id = %user.user_id, reading, "logged CGM reading");

        let status = GlucoseStatus::from_reading(reading);
        let mut text = format!(
            "Logged your glucose reading of {reading} mg/dL ({}).",
            status.label().to_lowercase()
        );
        if !(CRITICAL_LOW_MG_DL..=CRITICAL_HIGH_MG_DL).contains(&reading) {
            warn!(user_id = %user.user_id, reading, "critical glucose reading");
            let _ = write!(
                text,
                "\n\n**CRITICAL ALERT:** {reading} mg/dL is outside the safe range of \
                 {CRITICAL_LOW_MG_DL}-{CRITICAL_HIGH_MG_DL} mg/dL. Take action now and \
                 contact your healthcare provider if it does not improve."
            );
        }

        Ok(AgentResponse::with_user(text, updated.unwrap_or(user)))
    }

    fn log_mood(&self, user: UserProfile, message: &str) -> Result<AgentResponse> {
        let Some(mood) = extract_mood(message) else {
            return Ok(AgentResponse::with_user(
                "Noted. I couldn't pick out a mood from that. \
                 Try words like happy, sad, tired or stressed.",
                user,
            ));
        };

        let updated = {
            let db = self.db();
            db.insert_log(&user.user_id, LogKind::Mood, Some(&mood), None)?;
            db.get_user(&user.user_id)?
        };
        info!(user_id = %user.user_id, mood = %mood, "logged mood");

        let text = format!("Noted. Feeling '{}' today!", mood.to_lowercase());
        Ok(AgentResponse::with_user(text, updated.unwrap_or(user)))
    }

    fn log_food(&self, user: UserProfile, message: &str) -> Result<AgentResponse> {
        let meal = message.trim();
        self.db()
            .insert_log(&user.user_id, LogKind::Food, Some(meal), None)?;
        info!(user_id = %user.user_id, "logged food");

        let mut items = nutrition::foods_mentioned(meal);
        if items.is_empty() {
            items.push(nutrition::estimate(meal));
        }

        let text = format!(
            "{}\nMeal logged successfully: {meal}",
            render_macro_table(&items)
        );
        Ok(AgentResponse::with_user(text, user))
    }
}

impl AgentBackend for AgentService {
    fn run_agent(&self, request: &AgentRequest) -> Result<AgentResponse> {
        self.handle(request)
    }

    fn health_check(&self) -> bool {
        self.count_users().is_ok()
    }
}

fn greeting(user: &UserProfile) -> String {
    format!(
        "Hello, {} from {}! Your ID is verified. You can log glucose, mood or meals, \
         or ask for a meal plan.",
        user.first_name.trim(),
        user.city.trim()
    )
}

/// Whole numbers print without decimals; anything else with one.
fn num(v: f64) -> String {
    if (v - v.round()).abs() < f64::EPSILON {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

fn macro_cells(m: &Macros) -> String {
    format!(
        "{} | {} | {} | {}",
        num(m.carbs_g),
        num(m.protein_g),
        num(m.fat_g),
        num(m.calories)
    )
}

fn render_macro_table(items: &[NutritionInfo]) -> String {
    let mut out = String::from(
        "| Food | Carbs (g) | Protein (g) | Fat (g) | Calories |\n\
         |------|-----------|-------------|---------|----------|\n",
    );
    for item in items {
        let name = if item.estimated {
            format!("{} (estimated)", item.name)
        } else {
            item.name.clone()
        };
        let _ = writeln!(out, "| {name} | {} |", macro_cells(&item.macros));
    }
    if items.len() > 1 {
        let total: Macros = items.iter().map(|i| i.macros).sum();
        let _ = writeln!(out, "| **Total** | {} |", macro_cells(&total));
    }
    out
}

fn render_meal_plan(user: &UserProfile) -> String {
    let plan = generate_meal_plan(user);
    let mut out = format!(
        "Here is your 3-meal plan based on your {} preference and latest CGM reading of {} mg/dL:\n\n\
         | Meal | Time | Plan | Carbs (g) | Protein (g) | Fat (g) | Calories |\n\
         |------|------|------|-----------|-------------|---------|----------|\n",
        user.diet().label().to_lowercase(),
        user.latest_cgm.trim()
    );
    for entry in &plan {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            entry.meal,
            entry.time,
            entry.description,
            macro_cells(&entry.nutrition)
        );
    }
    out
}
