use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Deserializer, Serialize};

pub const MIN_USER_ID: i64 = 1001;
pub const MAX_USER_ID: i64 = 1100;

/// Readings below this are low (mg/dL).
pub const GLUCOSE_LOW_MG_DL: i64 = 70;
/// Readings above this are high (mg/dL).
pub const GLUCOSE_HIGH_MG_DL: i64 = 140;

/// Readings outside this band raise a critical alert when logged.
pub const CRITICAL_LOW_MG_DL: i64 = 80;
pub const CRITICAL_HIGH_MG_DL: i64 = 300;

/// Marker used in the CSV and the agent database for "nothing recorded".
pub const NONE_MARKER: &str = "None";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default, deserialize_with = "text_or_null")]
    pub first_name: String,
    #[serde(default, deserialize_with = "text_or_null")]
    pub last_name: String,
    #[serde(default, deserialize_with = "text_or_null")]
    pub city: String,
    #[serde(default, deserialize_with = "text_or_null")]
    pub dietary_preference: String,
    #[serde(default = "none_marker", deserialize_with = "text_or_none_marker")]
    pub medical_conditions: String,
    #[serde(default = "none_marker", deserialize_with = "text_or_none_marker")]
    pub physical_limitations: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub latest_cgm: String,
    #[serde(default, deserialize_with = "text_or_null")]
    pub mood: String,
}

fn none_marker() -> String {
    NONE_MARKER.to_string()
}

// Agent database columns are nullable; null reads as the field's default.

fn text_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn text_or_none_marker<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(none_marker))
}

/// The agent database stores ids and readings as integers, the CSV as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

impl UserProfile {
    /// Latest CGM reading as an integer, parsed the way a browser's `parseInt` would:
    /// leading whitespace skipped, optional sign, then the longest run of digits.
    #[must_use]
    pub fn glucose_reading(&self) -> Option<i64> {
        parse_leading_int(&self.latest_cgm)
    }

    #[must_use]
    pub fn glucose_status(&self) -> Option<GlucoseStatus> {
        self.glucose_reading().map(GlucoseStatus::from_reading)
    }

    #[must_use]
    pub fn diet(&self) -> DietaryPreference {
        DietaryPreference::parse(&self.dietary_preference)
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        if last.is_empty() {
            first.to_string()
        } else {
            format!("{first} {last}")
        }
    }

    #[must_use]
    pub fn has_condition(&self, keyword: &str) -> bool {
        self.medical_conditions
            .to_lowercase()
            .contains(&keyword.to_lowercase())
    }

    #[must_use]
    pub fn has_medical_conditions(&self) -> bool {
        is_recorded(&self.medical_conditions)
    }

    #[must_use]
    pub fn has_physical_limitations(&self) -> bool {
        is_recorded(&self.physical_limitations)
    }
}

fn is_recorded(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && v != NONE_MARKER
}

#[must_use]
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlucoseStatus {
    Low,
    Normal,
    High,
}

impl GlucoseStatus {
    #[must_use]
    pub fn from_reading(mg_dl: i64) -> Self {
        if mg_dl < GLUCOSE_LOW_MG_DL {
            Self::Low
        } else if mg_dl > GLUCOSE_HIGH_MG_DL {
            Self::High
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
        }
    }
}

impl fmt::Display for GlucoseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryPreference {
    Vegetarian,
    NonVegetarian,
    Vegan,
    Pescatarian,
    Unspecified,
}

impl DietaryPreference {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match normalized.as_str() {
            "vegetarian" | "veg" => Self::Vegetarian,
            "nonvegetarian" | "nonveg" => Self::NonVegetarian,
            "vegan" => Self::Vegan,
            "pescatarian" => Self::Pescatarian,
            _ => Self::Unspecified,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Vegetarian => "Vegetarian",
            Self::NonVegetarian => "Non-Vegetarian",
            Self::Vegan => "Vegan",
            Self::Pescatarian => "Pescatarian",
            Self::Unspecified => "Unspecified",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub carbs_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub calories: f64,
}

impl Macros {
    #[must_use]
    pub const fn new(carbs_g: f64, protein_g: f64, fat_g: f64, calories: f64) -> Self {
        Self {
            carbs_g,
            protein_g,
            fat_g,
            calories,
        }
    }
}

impl Add for Macros {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            carbs_g: self.carbs_g + rhs.carbs_g,
            protein_g: self.protein_g + rhs.protein_g,
            fat_g: self.fat_g + rhs.fat_g,
            calories: self.calories + rhs.calories,
        }
    }
}

impl AddAssign for Macros {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Macros> for Macros {
    fn sum<I: Iterator<Item = &'a Macros>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    pub name: String,
    #[serde(flatten)]
    pub macros: Macros,
    pub serving_size: String,
    /// Set when the value came from the keyword estimator rather than the table.
    #[serde(default)]
    pub estimated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedFood {
    pub name: String,
    pub nutrition: NutritionInfo,
    pub logged_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub created_at: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: chrono::Local::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanEntry {
    pub meal: String,
    pub time: String,
    pub description: String,
    pub nutrition: Macros,
}

/// Routing label for a chat message. The serialized form is the agent API's wire label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Validate,
    #[serde(rename = "log_cgm")]
    LogGlucose,
    LogMood,
    LogFood,
    GeneratePlan,
    GeneralQuery,
}

impl Intent {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::LogGlucose => "log_cgm",
            Self::LogMood => "log_mood",
            Self::LogFood => "log_food",
            Self::GeneratePlan => "generate_plan",
            Self::GeneralQuery => "general_query",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Validate => "User validation",
            Self::LogGlucose => "Glucose logging",
            Self::LogMood => "Mood tracking",
            Self::LogFood => "Food logging",
            Self::GeneratePlan => "Meal planning",
            Self::GeneralQuery => "General query",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s.trim().to_lowercase().as_str() {
            "validate" => Self::Validate,
            "log_cgm" => Self::LogGlucose,
            "log_mood" => Self::LogMood,
            "log_food" => Self::LogFood,
            "generate_plan" => Self::GeneratePlan,
            "general_query" => Self::GeneralQuery,
            other => bail!("Unknown intent '{other}'"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogKind {
    Cgm,
    Mood,
    Food,
}

impl LogKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cgm => "CGM",
            Self::Mood => "MOOD",
            Self::Food => "FOOD",
        }
    }
}

impl FromStr for LogKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(match s.trim().to_lowercase().as_str() {
            "cgm" | "glucose" => Self::Cgm,
            "mood" => Self::Mood,
            "food" => Self::Food,
            other => bail!("Unknown log kind '{other}'. Must be one of: cgm, mood, food"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub user_id: String,
    pub kind: LogKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_int: Option<i64>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(cgm: &str) -> UserProfile {
        UserProfile {
            user_id: "1001".to_string(),
            first_name: "Tanya".to_string(),
            last_name: "Ramsey".to_string(),
            city: "East John".to_string(),
            dietary_preference: "vegetarian".to_string(),
            medical_conditions: "Type 2 Diabetes".to_string(),
            physical_limitations: "None".to_string(),
            latest_cgm: cgm.to_string(),
            mood: "Happy".to_string(),
        }
    }

    #[test]
    fn test_glucose_status_thresholds() {
        assert_eq!(GlucoseStatus::from_reading(160), GlucoseStatus::High);
        assert_eq!(GlucoseStatus::from_reading(50), GlucoseStatus::Low);
        assert_eq!(GlucoseStatus::from_reading(100), GlucoseStatus::Normal);
        assert_eq!(GlucoseStatus::from_reading(70), GlucoseStatus::Normal);
        assert_eq!(GlucoseStatus::from_reading(140), GlucoseStatus::Normal);
        assert_eq!(GlucoseStatus::from_reading(69), GlucoseStatus::Low);
        assert_eq!(GlucoseStatus::from_reading(141), GlucoseStatus::High);
    }

    #[test]
    fn test_glucose_reading_parses_leading_integer() {
        assert_eq!(profile("120").glucose_reading(), Some(120));
        assert_eq!(profile(" 95 mg/dL").glucose_reading(), Some(95));
        assert_eq!(profile("150.7").glucose_reading(), Some(150));
        assert_eq!(profile("n/a").glucose_reading(), None);
        assert_eq!(profile("").glucose_reading(), None);
        assert_eq!(profile("160").glucose_status(), Some(GlucoseStatus::High));
    }

    #[test]
    fn test_parse_leading_int_sign() {
        assert_eq!(parse_leading_int("-12abc"), Some(-12));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn test_dietary_preference_parse() {
        assert_eq!(
            DietaryPreference::parse("vegetarian"),
            DietaryPreference::Vegetarian
        );
        assert_eq!(
            DietaryPreference::parse("Non-Vegetarian"),
            DietaryPreference::NonVegetarian
        );
        assert_eq!(
            DietaryPreference::parse(" non vegetarian "),
            DietaryPreference::NonVegetarian
        );
        assert_eq!(DietaryPreference::parse("VEGAN"), DietaryPreference::Vegan);
        assert_eq!(
            DietaryPreference::parse("pescatarian"),
            DietaryPreference::Pescatarian
        );
        assert_eq!(
            DietaryPreference::parse("keto"),
            DietaryPreference::Unspecified
        );
    }

    #[test]
    fn test_macros_sum() {
        let items = [
            Macros::new(28.0, 4.0, 8.0, 200.0),
            Macros::new(45.0, 4.0, 0.5, 205.0),
        ];
        let total: Macros = items.iter().sum();
        assert_eq!(total, Macros::new(73.0, 8.0, 8.5, 405.0));

        let empty: Macros = std::iter::empty::<Macros>().sum();
        assert_eq!(empty, Macros::default());
    }

    #[test]
    fn test_profile_conditions() {
        let p = profile("100");
        assert!(p.has_condition("diabetes"));
        assert!(!p.has_condition("hypertension"));
        assert!(p.has_medical_conditions());
        assert!(!p.has_physical_limitations());
        assert_eq!(p.display_name(), "Tanya Ramsey");
    }

    #[test]
    fn test_profile_deserializes_numeric_fields() {
        let json = r#"{
            "user_id": 1002,
            "first_name": "Ravi",
            "city": "Chennai",
            "dietary_preference": "vegan",
            "medical_conditions": "None",
            "physical_limitations": "None",
            "latest_cgm": 180,
            "mood": "Tired"
        }"#;
        let p: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(p.user_id, "1002");
        assert_eq!(p.latest_cgm, "180");
        assert_eq!(p.last_name, "");
        assert_eq!(p.glucose_status(), Some(GlucoseStatus::High));
    }

    #[test]
    fn test_profile_null_fields_read_as_defaults() {
        let json = r#"{
            "user_id": 1004,
            "first_name": "Daniel",
            "last_name": null,
            "city": "Lagos",
            "dietary_preference": null,
            "medical_conditions": null,
            "physical_limitations": null,
            "latest_cgm": null,
            "mood": null
        }"#;
        let p: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(p.user_id, "1004");
        assert_eq!(p.last_name, "");
        assert_eq!(p.medical_conditions, NONE_MARKER);
        assert_eq!(p.physical_limitations, NONE_MARKER);
        assert!(!p.has_medical_conditions());
        assert_eq!(p.latest_cgm, "");
        assert_eq!(p.glucose_status(), None);
        assert_eq!(p.mood, "");
    }

    #[test]
    fn test_intent_wire_labels() {
        assert_eq!(
            serde_json::to_string(&Intent::LogGlucose).unwrap(),
            "\"log_cgm\""
        );
        assert_eq!(
            serde_json::to_string(&Intent::GeneratePlan).unwrap(),
            "\"generate_plan\""
        );
        assert_eq!("LOG_MOOD".parse::<Intent>().unwrap(), Intent::LogMood);
        assert!("dance".parse::<Intent>().is_err());
        for intent in [
            Intent::Validate,
            Intent::LogGlucose,
            Intent::LogMood,
            Intent::LogFood,
            Intent::GeneratePlan,
            Intent::GeneralQuery,
        ] {
            assert_eq!(intent.as_str().parse::<Intent>().unwrap(), intent);
        }
    }

    #[test]
    fn test_log_kind_parse() {
        assert_eq!("glucose".parse::<LogKind>().unwrap(), LogKind::Cgm);
        assert_eq!("MOOD".parse::<LogKind>().unwrap(), LogKind::Mood);
        assert!("sleep".parse::<LogKind>().is_err());
        assert_eq!(serde_json::to_string(&LogKind::Cgm).unwrap(), "\"CGM\"");
    }
}
