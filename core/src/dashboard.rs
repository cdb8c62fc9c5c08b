use chrono::Local;
use serde::Serialize;

use crate::error::DashboardError;
use crate::meal_plan;
use crate::models::{
    GlucoseStatus, LoggedFood, Macros, MealPlanEntry, NutritionInfo, UserProfile,
};
use crate::nutrition;

/// Contents of the four stats cards at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsCards {
    pub glucose: String,
    pub glucose_status: Option<GlucoseStatus>,
    pub mood: String,
    pub diet: String,
    pub tracking: &'static str,
}

/// Per-session dashboard state: the logged-in profile, today's food log and
/// the most recently generated meal plan.
pub struct Dashboard {
    profile: UserProfile,
    foods: Vec<LoggedFood>,
    meal_plan: Vec<MealPlanEntry>,
}

impl Dashboard {
    #[must_use]
    pub fn new(profile: UserProfile) -> Self {
        Self {
            profile,
            foods: Vec::new(),
            meal_plan: Vec::new(),
        }
    }

    #[must_use]
    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Log a food, falling back to a keyword estimate for unknown names.
    pub fn add_food(&mut self, name: &str) -> Result<&LoggedFood, DashboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::EmptyFoodName);
        }
        let info = nutrition::estimate(name);
        Ok(self.push(name, info))
    }

    /// Log a food only if it is in the nutrition table.
    pub fn add_food_strict(&mut self, name: &str) -> Result<&LoggedFood, DashboardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::EmptyFoodName);
        }
        let info = nutrition::lookup(name).ok_or_else(|| DashboardError::UnknownFood {
            name: name.to_string(),
            suggestions: nutrition::suggest(name),
        })?;
        Ok(self.push(name, info))
    }

    fn push(&mut self, name: &str, nutrition: NutritionInfo) -> &LoggedFood {
        self.foods.push(LoggedFood {
            name: name.to_string(),
            nutrition,
            logged_at: Local::now().format("%-I:%M %p").to_string(),
        });
        let last = self.foods.len() - 1;
        &self.foods[last]
    }

    pub fn remove_food(&mut self, index: usize) -> Result<LoggedFood, DashboardError> {
        if index >= self.foods.len() {
            return Err(DashboardError::FoodIndexOutOfRange {
                index,
                len: self.foods.len(),
            });
        }
        Ok(self.foods.remove(index))
    }

    #[must_use]
    pub fn foods(&self) -> &[LoggedFood] {
        &self.foods
    }

    /// Always recomputed from the current food list.
    #[must_use]
    pub fn totals(&self) -> Macros {
        self.foods.iter().map(|f| f.nutrition.macros).sum()
    }

    pub fn generate_meal_plan(&mut self) -> &[MealPlanEntry] {
        self.meal_plan = meal_plan::generate_meal_plan(&self.profile);
        &self.meal_plan
    }

    #[must_use]
    pub fn meal_plan(&self) -> &[MealPlanEntry] {
        &self.meal_plan
    }

    #[must_use]
    pub fn stats(&self) -> StatsCards {
        StatsCards {
            glucose: format!("{} mg/dL", self.profile.latest_cgm.trim()),
            glucose_status: self.profile.glucose_status(),
            mood: self.profile.mood.clone(),
            diet: self.profile.diet().label().to_string(),
            tracking: "Active",
        }
    }
}
