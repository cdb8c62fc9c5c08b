use anyhow::Result;
use tracing::warn;

use crate::agent::{AgentBackend, AgentRequest, AgentResponse};
use crate::error::DashboardError;
use crate::intent::classify_intent;
use crate::models::{ChatMessage, ChatRole, Intent, UserProfile};
use crate::responder::chatbot_greeting;

pub const APOLOGY: &str =
    "I apologize, but I'm having trouble responding right now. Please try again.";

/// A request that has been recorded but not yet answered.
#[derive(Debug)]
#[must_use = "a pending turn must be finished to release the session"]
pub struct PendingTurn {
    pub intent: Intent,
    pub request: AgentRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub intent: Intent,
    pub message: ChatMessage,
    /// Profile echoed back by the agent, if any. Informational only.
    pub user_data: Option<UserProfile>,
    pub failed: bool,
}

/// Append-only conversation with at most one request outstanding.
///
/// A turn is split into [`ChatSession::begin_turn`] and
/// [`ChatSession::finish_turn`] so callers can await a remote agent in
/// between; [`ChatSession::send`] does both against a synchronous backend.
pub struct ChatSession {
    user_id: String,
    messages: Vec<ChatMessage>,
    in_flight: bool,
}

impl ChatSession {
    #[must_use]
    pub fn new(profile: &UserProfile) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            messages: vec![ChatMessage::new(
                ChatRole::Assistant,
                chatbot_greeting(profile),
            )],
            in_flight: false,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn begin_turn(&mut self, text: &str) -> Result<PendingTurn, DashboardError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DashboardError::EmptyMessage);
        }
        if self.in_flight {
            return Err(DashboardError::RequestInFlight);
        }

        let intent = classify_intent(text);
        self.messages.push(ChatMessage::new(ChatRole::User, text));
        self.in_flight = true;

        Ok(PendingTurn {
            intent,
            request: AgentRequest::new(self.user_id.clone(), intent, text),
        })
    }

    pub fn finish_turn(&mut self, turn: PendingTurn, outcome: Result<AgentResponse>) -> TurnReply {
        self.in_flight = false;

        let (content, user_data, failed) = match outcome {
            Ok(resp) => (resp.agent_response, resp.user_data, false),
            Err(e) => {
                warn!(intent = %turn.intent, error = %format!("{e:#}"), "agent request failed");
                (APOLOGY.to_string(), None, true)
            }
        };

        let message = ChatMessage::new(ChatRole::Assistant, content);
        self.messages.push(message.clone());
        TurnReply {
            intent: turn.intent,
            message,
            user_data,
            failed,
        }
    }

    pub fn send(
        &mut self,
        backend: &dyn AgentBackend,
        text: &str,
    ) -> Result<TurnReply, DashboardError> {
        let turn = self.begin_turn(text)?;
        let outcome = backend.run_agent(&turn.request);
        Ok(self.finish_turn(turn, outcome))
    }
}
