use crate::models::{DietaryPreference, GlucoseStatus, Macros, MealPlanEntry, UserProfile};

const MEAL_SLOTS: [(&str, &str); 3] = [
    ("Breakfast", "8:00 AM"),
    ("Lunch", "1:00 PM"),
    ("Dinner", "7:00 PM"),
];

type Template = [(&'static str, Macros); 3];

const VEGETARIAN: Template = [
    (
        "Vegetable upma with coconut chutney and sambar",
        Macros::new(45.0, 12.0, 10.0, 320.0),
    ),
    (
        "Brown rice with dal, mixed vegetable curry, and cucumber raita",
        Macros::new(60.0, 18.0, 8.0, 420.0),
    ),
    (
        "Whole wheat roti with palak paneer and salad",
        Macros::new(45.0, 20.0, 15.0, 400.0),
    ),
];

const NON_VEGETARIAN: Template = [
    (
        "Egg omelette with vegetables and two whole wheat toast slices",
        Macros::new(35.0, 25.0, 18.0, 380.0),
    ),
    (
        "Grilled chicken breast with quinoa and steamed broccoli",
        Macros::new(40.0, 45.0, 12.0, 450.0),
    ),
    (
        "Fish curry with brown rice and mixed vegetable salad",
        Macros::new(50.0, 35.0, 15.0, 480.0),
    ),
];

const VEGAN: Template = [
    (
        "Oatmeal with almond butter, banana slices, and chia seeds",
        Macros::new(55.0, 15.0, 12.0, 350.0),
    ),
    (
        "Quinoa bowl with chickpea curry, roasted vegetables, and tahini dressing",
        Macros::new(65.0, 22.0, 15.0, 450.0),
    ),
    (
        "Lentil soup with whole grain bread and mixed greens salad",
        Macros::new(55.0, 20.0, 8.0, 400.0),
    ),
];

const DEFAULT: Template = [
    (
        "Scrambled eggs with whole wheat toast and avocado",
        Macros::new(35.0, 25.0, 18.0, 400.0),
    ),
    (
        "Grilled chicken breast with sweet potato and green beans",
        Macros::new(45.0, 35.0, 12.0, 440.0),
    ),
    (
        "Baked salmon with quinoa and roasted asparagus",
        Macros::new(42.0, 38.0, 20.0, 500.0),
    ),
];

/// Per-meal substitution and fixed macros for diabetes: (from, to, macros).
const DIABETES_SWAPS: [(&str, &str, Macros); 3] = [
    ("upma", "vegetable poha", Macros::new(30.0, 10.0, 8.0, 250.0)),
    ("brown rice", "cauliflower rice", Macros::new(25.0, 20.0, 10.0, 300.0)),
    ("brown rice", "quinoa", Macros::new(35.0, 25.0, 12.0, 350.0)),
];

const HIGH_GLUCOSE_CARB_CUT: f64 = 10.0;
const HIGH_GLUCOSE_MIN_CARBS: f64 = 10.0;
const HIGH_GLUCOSE_CALORIE_CUT: f64 = 50.0;
const HIGH_GLUCOSE_MIN_CALORIES: f64 = 200.0;
const LOW_GLUCOSE_EXTRA_CARBS: f64 = 15.0;
const LOW_GLUCOSE_EXTRA_CALORIES: f64 = 80.0;

fn template_for(diet: DietaryPreference) -> &'static Template {
    match diet {
        DietaryPreference::Vegetarian => &VEGETARIAN,
        DietaryPreference::NonVegetarian => &NON_VEGETARIAN,
        DietaryPreference::Vegan => &VEGAN,
        DietaryPreference::Pescatarian | DietaryPreference::Unspecified => &DEFAULT,
    }
}

/// Build a fresh breakfast/lunch/dinner plan for `user`.
///
/// The diet template is adjusted in a fixed order: medical conditions first
/// (diabetes swaps, otherwise hypertension tags), then the current glucose
/// status. Later steps see the output of earlier ones.
#[must_use]
pub fn generate_meal_plan(user: &UserProfile) -> Vec<MealPlanEntry> {
    let mut plan: Vec<MealPlanEntry> = MEAL_SLOTS
        .iter()
        .zip(template_for(user.diet()))
        .map(|((meal, time), (description, nutrition))| MealPlanEntry {
            meal: (*meal).to_string(),
            time: (*time).to_string(),
            description: (*description).to_string(),
            nutrition: *nutrition,
        })
        .collect();

    if user.has_condition("diabetes") {
        for (entry, (from, to, macros)) in plan.iter_mut().zip(DIABETES_SWAPS) {
            entry.description = entry.description.replacen(from, to, 1);
            entry.nutrition = macros;
        }
    } else if user.has_condition("hypertension") {
        for entry in &mut plan {
            entry.description.push_str(" (low sodium)");
        }
    }

    match user.glucose_status() {
        Some(GlucoseStatus::High) => {
            for entry in &mut plan {
                entry.description.push_str(" (low glycemic)");
                let n = &mut entry.nutrition;
                n.carbs_g = (n.carbs_g - HIGH_GLUCOSE_CARB_CUT).max(HIGH_GLUCOSE_MIN_CARBS);
                n.calories =
                    (n.calories - HIGH_GLUCOSE_CALORIE_CUT).max(HIGH_GLUCOSE_MIN_CALORIES);
            }
        }
        Some(GlucoseStatus::Low) => {
            if let Some(breakfast) = plan.first_mut() {
                breakfast.description.push_str(" with dates or honey");
                breakfast.nutrition.carbs_g += LOW_GLUCOSE_EXTRA_CARBS;
                breakfast.nutrition.calories += LOW_GLUCOSE_EXTRA_CALORIES;
            }
        }
        Some(GlucoseStatus::Normal) | None => {}
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(diet: &str, conditions: &str, cgm: &str) -> UserProfile {
        UserProfile {
            user_id: "1001".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Nair".to_string(),
            city: "Kochi".to_string(),
            dietary_preference: diet.to_string(),
            medical_conditions: conditions.to_string(),
            physical_limitations: "None".to_string(),
            latest_cgm: cgm.to_string(),
            mood: "Neutral".to_string(),
        }
    }

    #[test]
    fn test_three_meals_in_order() {
        let plan = generate_meal_plan(&user("vegan", "None", "100"));
        let meals: Vec<(&str, &str)> = plan
            .iter()
            .map(|m| (m.meal.as_str(), m.time.as_str()))
            .collect();
        assert_eq!(
            meals,
            vec![
                ("Breakfast", "8:00 AM"),
                ("Lunch", "1:00 PM"),
                ("Dinner", "7:00 PM")
            ]
        );
        assert!(plan[0].description.starts_with("Oatmeal"));
    }

    #[test]
    fn test_templates_by_diet() {
        let veg = generate_meal_plan(&user("vegetarian", "None", "100"));
        assert_eq!(
            veg[0].description,
            "Vegetable upma with coconut chutney and sambar"
        );
        assert_eq!(veg[1].nutrition, Macros::new(60.0, 18.0, 8.0, 420.0));

        let nonveg = generate_meal_plan(&user("non-vegetarian", "None", "100"));
        assert!(nonveg[1].description.starts_with("Grilled chicken breast with quinoa"));

        let other = generate_meal_plan(&user("pescatarian", "None", "100"));
        assert!(other[2].description.starts_with("Baked salmon"));
    }

    #[test]
    fn test_diabetes_swaps_and_overrides() {
        let plan = generate_meal_plan(&user("vegetarian", "Type 2 Diabetes", "100"));
        assert_eq!(
            plan[0].description,
            "Vegetable vegetable poha with coconut chutney and sambar"
        );
        assert_eq!(
            plan[1].description,
            "Brown rice with dal, mixed vegetable curry, and cucumber raita"
        );
        assert_eq!(plan[0].nutrition, Macros::new(30.0, 10.0, 8.0, 250.0));
        assert_eq!(plan[1].nutrition, Macros::new(25.0, 20.0, 10.0, 300.0));
        assert_eq!(plan[2].nutrition, Macros::new(35.0, 25.0, 12.0, 350.0));

        let nonveg = generate_meal_plan(&user("non-vegetarian", "diabetes", "100"));
        assert_eq!(
            nonveg[2].description,
            "Fish curry with quinoa and mixed vegetable salad"
        );
    }

    #[test]
    fn test_hypertension_tags() {
        let plan = generate_meal_plan(&user("vegan", "Hypertension", "100"));
        assert!(plan.iter().all(|m| m.description.ends_with(" (low sodium)")));
        // macros untouched
        assert_eq!(plan[0].nutrition, Macros::new(55.0, 15.0, 12.0, 350.0));
    }

    #[test]
    fn test_diabetes_takes_precedence_over_hypertension() {
        let plan = generate_meal_plan(&user("vegan", "Diabetes, Hypertension", "100"));
        assert!(plan.iter().all(|m| !m.description.contains("low sodium")));
    }

    #[test]
    fn test_high_glucose_lowers_carbs_and_calories() {
        let plan = generate_meal_plan(&user("vegetarian", "None", "180"));
        assert!(plan.iter().all(|m| m.description.ends_with(" (low glycemic)")));
        assert_eq!(plan[0].nutrition.carbs_g, 35.0);
        assert_eq!(plan[0].nutrition.calories, 270.0);
        assert_eq!(plan[1].nutrition.carbs_g, 50.0);
    }

    #[test]
    fn test_high_glucose_floors() {
        // diabetes override gives lunch 25g/300kcal, breakfast 250kcal
        let plan = generate_meal_plan(&user("vegetarian", "diabetes", "250"));
        assert_eq!(plan[0].nutrition.calories, 200.0);
        assert_eq!(plan[1].nutrition.carbs_g, 15.0);
        assert_eq!(plan[1].nutrition.calories, 250.0);
    }

    #[test]
    fn test_low_glucose_boosts_breakfast_only() {
        let plan = generate_meal_plan(&user("non-vegetarian", "None", "55"));
        assert!(plan[0].description.ends_with(" with dates or honey"));
        assert_eq!(plan[0].nutrition.carbs_g, 50.0);
        assert_eq!(plan[0].nutrition.calories, 460.0);
        assert_eq!(plan[1].nutrition, Macros::new(40.0, 45.0, 12.0, 450.0));
    }

    #[test]
    fn test_regenerated_not_accumulated() {
        let u = user("vegetarian", "Hypertension", "180");
        assert_eq!(generate_meal_plan(&u), generate_meal_plan(&u));
    }
}
