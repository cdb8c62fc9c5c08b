use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use gluco_core::dashboard::StatsCards;
use gluco_core::models::{LoggedFood, Macros, MealPlanEntry, NutritionInfo, UserProfile};

fn fmt_macro(v: f64) -> String {
    format!("{:.1}", no_neg_zero(v))
}

pub(crate) fn print_nutrition_table(items: &[NutritionInfo]) {
    #[derive(Tabled)]
    struct NutritionRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Food")]
        name: String,
        #[tabled(rename = "Serving")]
        serving: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Fat")]
        fat: String,
        #[tabled(rename = "Cal")]
        calories: String,
    }

    let rows: Vec<NutritionRow> = items
        .iter()
        .enumerate()
        .map(|(i, n)| NutritionRow {
            idx: i + 1,
            name: if n.estimated {
                format!("{} (est.)", truncate(&n.name, 30))
            } else {
                truncate(&n.name, 35)
            },
            serving: truncate(&n.serving_size, 28),
            carbs: fmt_macro(n.macros.carbs_g),
            protein: fmt_macro(n.macros.protein_g),
            fat: fmt_macro(n.macros.fat_g),
            calories: format!("{:.0}", no_neg_zero(n.macros.calories)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..7)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_food_log(foods: &[LoggedFood], totals: &Macros) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "#")]
        idx: String,
        #[tabled(rename = "Food")]
        name: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Fat")]
        fat: String,
        #[tabled(rename = "Cal")]
        calories: String,
    }

    let row = |idx: String, name: String, time: String, m: &Macros| FoodRow {
        idx,
        name,
        time,
        carbs: fmt_macro(m.carbs_g),
        protein: fmt_macro(m.protein_g),
        fat: fmt_macro(m.fat_g),
        calories: format!("{:.0}", no_neg_zero(m.calories)),
    };

    let mut rows: Vec<FoodRow> = foods
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let name = if f.nutrition.estimated {
                format!("{} (est.)", truncate(&f.name, 30))
            } else {
                truncate(&f.name, 35)
            };
            row(
                (i + 1).to_string(),
                name,
                f.logged_at.clone(),
                &f.nutrition.macros,
            )
        })
        .collect();
    rows.push(row(String::new(), "TOTAL".into(), String::new(), totals));

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..7)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_meal_plan(plan: &[MealPlanEntry]) {
    #[derive(Tabled)]
    struct PlanRow {
        #[tabled(rename = "Meal")]
        meal: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Plan")]
        description: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Fat")]
        fat: String,
        #[tabled(rename = "Cal")]
        calories: String,
    }

    let rows: Vec<PlanRow> = plan
        .iter()
        .map(|m| PlanRow {
            meal: m.meal.clone(),
            time: m.time.clone(),
            description: m.description.clone(),
            carbs: fmt_macro(m.nutrition.carbs_g),
            protein: fmt_macro(m.nutrition.protein_g),
            fat: fmt_macro(m.nutrition.fat_g),
            calories: format!("{:.0}", m.nutrition.calories),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..7)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_stats(stats: &StatsCards) {
    let status = stats
        .glucose_status
        .map_or("Unknown", |s| s.label());
    println!(
        "Glucose: {} ({status})  |  Mood: {}  |  Diet: {}  |  Tracking: {}",
        stats.glucose, stats.mood, stats.diet, stats.tracking
    );
}

pub(crate) fn print_profile(user: &UserProfile) {
    #[derive(Tabled)]
    struct FieldRow {
        #[tabled(rename = "Field")]
        field: &'static str,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows = [
        ("User ID", user.user_id.clone()),
        ("Name", user.display_name()),
        ("City", user.city.clone()),
        ("Diet", user.dietary_preference.clone()),
        ("Medical conditions", user.medical_conditions.clone()),
        ("Physical limitations", user.physical_limitations.clone()),
        ("Latest CGM (mg/dL)", user.latest_cgm.clone()),
        ("Mood", user.mood.clone()),
    ]
    .map(|(field, value)| FieldRow { field, value });

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
