use anyhow::{Context, Result};
use tracing::debug;

use gluco_core::agent::{AgentRequest, AgentResponse};

pub const DEFAULT_AGENT_URL: &str = "http://localhost:8000";

/// HTTP client for the agent API (`POST /api/run_agent`, `GET /health`).
pub struct AgentClient {
    client: reqwest::Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "gluco-cli/{} (health dashboard)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn run_agent_async(&self, request: &AgentRequest) -> Result<AgentResponse> {
        let url = format!("{}/api/run_agent", self.base_url);
        debug!(%url, intent = %request.intent, "calling agent");

        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to reach agent API")?
            .error_for_status()
            .context("Agent API returned an error")?;

        resp.json()
            .await
            .context("Failed to parse agent response")
    }

    /// True when `/health` answers with a success status.
    pub async fn health_check_async(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use gluco_core::models::Intent;
    use gluco_core::service::AgentService;

    const USERS: &str = "user_id,first_name,city,dietary_preference,latest_cgm,mood\n\
                         1001,Tanya,East John,vegan,120,Happy\n";

    async fn spawn_server() -> String {
        let service = AgentService::new_in_memory().unwrap();
        service.import_users_csv(USERS.as_bytes()).unwrap();
        let app = crate::server::build_router(Arc::new(service));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = AgentClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn test_run_agent_against_local_server() {
        let url = spawn_server().await;
        let client = AgentClient::new(&url).unwrap();

        assert!(client.health_check_async().await);

        let resp = client
            .run_agent_async(&AgentRequest::new("1001", Intent::Validate, ""))
            .await
            .unwrap();
        assert!(resp.agent_response.starts_with("Hello, Tanya from East John!"));
        assert_eq!(resp.user_data.unwrap().user_id, "1001");
    }

    #[tokio::test]
    async fn test_unreachable_agent() {
        let client = AgentClient::new("http://127.0.0.1:1").unwrap();
        assert!(!client.health_check_async().await);
        let err = client
            .run_agent_async(&AgentRequest::new("1001", Intent::GeneralQuery, "hi"))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to reach agent API"));
    }
}
