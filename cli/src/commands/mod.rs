mod chat;
mod food;
mod helpers;
mod history;
mod import;
mod login;
mod plan;

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::config::Config;
use gluco_core::models::UserProfile;
use gluco_core::users::UserDirectory;

pub(crate) use chat::{cmd_ask, cmd_dashboard, cmd_health};
pub(crate) use food::{cmd_food_lookup, cmd_food_search};
pub(crate) use history::cmd_history;
pub(crate) use import::cmd_import_users;
pub(crate) use login::{cmd_login, cmd_logout, cmd_profile};
pub(crate) use plan::cmd_plan;

/// Load the user table, pointing at the import command when it is missing.
pub(super) fn load_directory(path: &Path) -> Result<UserDirectory> {
    if !path.exists() {
        bail!(
            "User table not found at {}. Pass --users <file> or run `gluco import users <file>`",
            path.display()
        );
    }
    UserDirectory::load(path)
}

/// Profile of the logged-in user, re-read from the user table.
pub(super) fn current_profile(config: &Config) -> Result<UserProfile> {
    let Some(user_id) = config.load_session()? else {
        bail!("Not logged in. Run `gluco login <user-id>` first");
    };
    let users = load_directory(&config.users_path)?;
    users
        .get(&user_id)
        .cloned()
        .with_context(|| format!("User ID '{user_id}' from the saved session is no longer in the user table"))
}
