use anyhow::Result;

use crate::config::Config;
use gluco_core::dashboard::Dashboard;
use gluco_core::session;

use super::helpers::{print_profile, print_stats};
use super::{current_profile, load_directory};

pub(crate) fn cmd_login(config: &Config, user_id: &str, json: bool) -> Result<()> {
    let users = load_directory(&config.users_path)?;
    let profile = session::login(user_id, &users)?;
    config.save_session(&profile.user_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Welcome, {}!", profile.display_name());
        print_stats(&Dashboard::new(profile).stats());
    }
    Ok(())
}

pub(crate) fn cmd_logout(config: &Config, json: bool) -> Result<()> {
    let was_logged_in = config.clear_session()?;
    if json {
        println!("{}", serde_json::json!({ "logged_out": was_logged_in }));
    } else if was_logged_in {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub(crate) fn cmd_profile(config: &Config, json: bool) -> Result<()> {
    let profile = current_profile(config)?;
    let dashboard = Dashboard::new(profile);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "profile": dashboard.profile(),
                "stats": dashboard.stats(),
            }))?
        );
    } else {
        print_stats(&dashboard.stats());
        print_profile(dashboard.profile());
    }
    Ok(())
}
