use anyhow::Result;

use crate::config::Config;
use gluco_core::dashboard::Dashboard;

use super::current_profile;
use super::helpers::print_meal_plan;

pub(crate) fn cmd_plan(config: &Config, json: bool) -> Result<()> {
    let mut dashboard = Dashboard::new(current_profile(config)?);
    let plan = dashboard.generate_meal_plan();

    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
    } else {
        let p = dashboard.profile();
        println!(
            "Meal plan for {} ({} diet, latest CGM {} mg/dL)",
            p.display_name(),
            p.diet().label(),
            p.latest_cgm.trim()
        );
        print_meal_plan(dashboard.meal_plan());
    }
    Ok(())
}
