//! Request/response contract shared by the local simulation, the HTTP client
//! and the backend service.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::{Intent, UserProfile};
use crate::responder::contextual_response;

/// Mood labels the backend recognizes in free text, in match priority order.
pub const MOOD_LABELS: &[&str] = &[
    "happy", "sad", "excited", "tired", "anxious", "stressed", "neutral",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub user_id: String,
    /// Wire label; kept as text so unknown labels reach the backend intact.
    pub intent: String,
    pub message: String,
}

impl AgentRequest {
    #[must_use]
    pub fn new(user_id: impl Into<String>, intent: Intent, message: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            intent: intent.as_str().to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<UserProfile>,
}

impl AgentResponse {
    #[must_use]
    pub fn text(agent_response: impl Into<String>) -> Self {
        Self {
            agent_response: agent_response.into(),
            user_data: None,
        }
    }

    #[must_use]
    pub fn with_user(agent_response: impl Into<String>, user: UserProfile) -> Self {
        Self {
            agent_response: agent_response.into(),
            user_data: Some(user),
        }
    }
}

/// Anything that can answer an `AgentRequest`.
pub trait AgentBackend: Send + Sync {
    fn run_agent(&self, request: &AgentRequest) -> Result<AgentResponse>;

    fn health_check(&self) -> bool;
}

/// Answers locally with the rule-based responder. Never fails.
pub struct SimulatedAgent {
    profile: UserProfile,
}

impl SimulatedAgent {
    #[must_use]
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }
}

impl AgentBackend for SimulatedAgent {
    fn run_agent(&self, request: &AgentRequest) -> Result<AgentResponse> {
        Ok(AgentResponse::text(contextual_response(
            &request.message,
            &self.profile,
        )))
    }

    fn health_check(&self) -> bool {
        true
    }
}

/// First run of ASCII digits in `text`, unparsed.
#[must_use]
pub fn first_number(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// First run of ASCII digits in `text`, if it fits an `i64`.
#[must_use]
pub fn extract_glucose_value(text: &str) -> Option<i64> {
    first_number(text)?.parse().ok()
}

/// Earliest known mood label in `text`, capitalized ("Happy").
#[must_use]
pub fn extract_mood(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let (_, label) = MOOD_LABELS
        .iter()
        .filter_map(|label| lower.find(label).map(|pos| (pos, *label)))
        .min_by_key(|(pos, _)| *pos)?;

    let mut chars = label.chars();
    chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
}

/// Position of a mood on the 1–5 chart scale. Unknown labels sit in the middle.
#[must_use]
pub fn mood_score(label: &str) -> u8 {
    match label.trim().to_lowercase().as_str() {
        "happy" | "excited" => 5,
        "calm" | "content" | "good" => 4,
        "sad" | "anxious" | "stressed" => 2,
        "depressed" | "angry" => 1,
        _ => 3,
    }
}
