use anyhow::Result;
use std::process;

use gluco_core::error::DashboardError;
use gluco_core::nutrition;

use super::helpers::{json_error, print_nutrition_table};

pub(crate) fn cmd_food_lookup(name: &str, strict: bool, json: bool) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DashboardError::EmptyFoodName.into());
    }

    let info = if strict {
        if let Some(info) = nutrition::lookup(name) {
            info
        } else {
            let err = DashboardError::UnknownFood {
                name: name.to_string(),
                suggestions: nutrition::suggest(name),
            };
            if json {
                println!("{}", json_error(&err.to_string()));
            } else {
                eprintln!("{err}");
            }
            process::exit(2);
        }
    } else {
        nutrition::estimate(name)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_nutrition_table(std::slice::from_ref(&info));
        if info.estimated {
            eprintln!("Note: '{name}' is not in the nutrition table; values are a category estimate.");
        }
    }
    Ok(())
}

pub(crate) fn cmd_food_search(query: &str, json: bool) -> Result<()> {
    let results = nutrition::search(query);

    if results.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No foods found for '{query}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_nutrition_table(&results);
    }
    Ok(())
}
