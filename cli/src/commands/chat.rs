use std::io::{self, Write};

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::agent_client::AgentClient;
use crate::config::Config;
use gluco_core::agent::SimulatedAgent;
use gluco_core::chat::{ChatSession, TurnReply};
use gluco_core::dashboard::Dashboard;
use gluco_core::error::DashboardError;
use gluco_core::responder::assistant_greeting;

use super::current_profile;
use super::helpers::{print_food_log, print_meal_plan, print_profile, print_stats};

/// Where chat turns are answered.
pub(crate) enum Assistant {
    Local(SimulatedAgent),
    Remote(AgentClient),
}

impl Assistant {
    pub(crate) fn new(dashboard: &Dashboard, local: bool, agent_url: &str) -> Result<Self> {
        Ok(if local {
            Self::Local(SimulatedAgent::new(dashboard.profile().clone()))
        } else {
            Self::Remote(AgentClient::new(agent_url)?)
        })
    }

    fn label(&self) -> String {
        match self {
            Self::Local(_) => "local assistant".to_string(),
            Self::Remote(client) => format!("agent at {}", client.base_url()),
        }
    }

    /// One turn. Agent failures become an apology reply, never an error.
    pub(crate) async fn send(
        &self,
        chat: &mut ChatSession,
        text: &str,
    ) -> Result<TurnReply, DashboardError> {
        match self {
            Self::Local(agent) => chat.send(agent, text),
            Self::Remote(client) => {
                let turn = chat.begin_turn(text)?;
                let outcome = client.run_agent_async(&turn.request).await;
                Ok(chat.finish_turn(turn, outcome))
            }
        }
    }
}

pub(crate) async fn cmd_ask(
    config: &Config,
    agent_url: &str,
    message: &str,
    local: bool,
    json: bool,
) -> Result<()> {
    let dashboard = Dashboard::new(current_profile(config)?);
    let assistant = Assistant::new(&dashboard, local, agent_url)?;
    let mut chat = ChatSession::new(dashboard.profile());

    let reply = assistant.send(&mut chat, message).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "intent": reply.intent,
                "response": reply.message.content,
                "failed": reply.failed,
            }))?
        );
    } else {
        println!("{}", reply.message.content);
    }
    Ok(())
}

const DASHBOARD_HELP: &str = "\
Commands:
  /add <food>      Log a food (estimates unknown foods)
  /strict <food>   Log a food from the nutrition table only
  /remove <n>      Remove logged food number n
  /foods           Show logged foods and totals
  /plan            Generate today's meal plan
  /stats           Show the stats cards
  /profile         Show your profile
  /help            Show this help
  /quit            Leave the dashboard
Anything else is sent to the assistant.";

/// Interactive dashboard over stdin. Recoverable errors are printed and the loop continues.
pub(crate) async fn cmd_dashboard(config: &Config, agent_url: &str, local: bool) -> Result<()> {
    let mut dashboard = Dashboard::new(current_profile(config)?);
    let assistant = Assistant::new(&dashboard, local, agent_url)?;
    let mut chat = ChatSession::new(dashboard.profile());

    println!("Welcome, {}!", dashboard.profile().display_name());
    print_stats(&dashboard.stats());
    let greeting = match &assistant {
        Assistant::Local(_) => assistant_greeting(dashboard.profile()),
        Assistant::Remote(_) => chat
            .messages()
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default(),
    };
    println!("\n[{}] {greeting}", assistant.label());
    println!("\nType /help for commands.");

    run_dashboard(
        BufReader::new(tokio::io::stdin()),
        &mut dashboard,
        &assistant,
        &mut chat,
    )
    .await?;

    println!("Goodbye!");
    Ok(())
}

/// Read commands line by line until `/quit` or end of input.
async fn run_dashboard<R>(
    input: R,
    dashboard: &mut Dashboard,
    assistant: &Assistant,
    chat: &mut ChatSession,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, arg) = line.split_once(' ').map_or((line, ""), |(c, a)| (c, a.trim()));
        match command {
            "/quit" | "/exit" => break,
            "/help" => println!("{DASHBOARD_HELP}"),
            "/add" | "/strict" => {
                let added = if command == "/add" {
                    dashboard.add_food(arg)
                } else {
                    dashboard.add_food_strict(arg)
                };
                match added {
                    Ok(food) => println!(
                        "Added {} ({:.0} kcal{})",
                        food.name,
                        food.nutrition.macros.calories,
                        if food.nutrition.estimated { ", estimated" } else { "" }
                    ),
                    Err(e) => eprintln!("{e}"),
                }
            }
            "/remove" => match arg.parse::<usize>() {
                Ok(n) if n > 0 => match dashboard.remove_food(n - 1) {
                    Ok(food) => println!("Removed {}", food.name),
                    Err(e) => eprintln!("{e}"),
                },
                _ => eprintln!("Usage: /remove <n> (see /foods for numbers)"),
            },
            "/foods" => {
                if dashboard.foods().is_empty() {
                    println!("No foods logged yet.");
                } else {
                    print_food_log(dashboard.foods(), &dashboard.totals());
                }
            }
            "/plan" => print_meal_plan(dashboard.generate_meal_plan()),
            "/stats" => print_stats(&dashboard.stats()),
            "/profile" => print_profile(dashboard.profile()),
            _ if command.starts_with('/') => {
                eprintln!("Unknown command '{command}'. Type /help for commands.");
            }
            _ => match assistant.send(chat, line).await {
                Ok(reply) => println!("{}", reply.message.content),
                Err(e) => eprintln!("{e}"),
            },
        }
    }
    Ok(())
}

pub(crate) async fn cmd_health(agent_url: &str, json: bool) -> Result<()> {
    let client = AgentClient::new(agent_url)?;
    let healthy = client.health_check_async().await;

    if json {
        println!(
            "{}",
            serde_json::json!({ "agent_url": client.base_url(), "healthy": healthy })
        );
    } else if healthy {
        println!("Agent at {} is running.", client.base_url());
    } else {
        println!("Agent at {} is not reachable.", client.base_url());
    }

    if !healthy {
        std::process::exit(2);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gluco_core::models::{ChatRole, UserProfile};

    fn profile() -> UserProfile {
        UserProfile {
            user_id: "1001".to_string(),
            first_name: "Tanya".to_string(),
            last_name: "Ramsey".to_string(),
            city: "East John".to_string(),
            dietary_preference: "vegetarian".to_string(),
            medical_conditions: "None".to_string(),
            physical_limitations: "None".to_string(),
            latest_cgm: "128".to_string(),
            mood: "Happy".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dashboard_reads_until_quit() {
        let mut dashboard = Dashboard::new(profile());
        let assistant = Assistant::Local(SimulatedAgent::new(profile()));
        let mut chat = ChatSession::new(dashboard.profile());

        let input: &[u8] =
            b"/add dosa\n\n/add rice\n/remove 9\nhow is my glucose?\n/strict pizza\n/quit\n/add idli\n";
        run_dashboard(input, &mut dashboard, &assistant, &mut chat)
            .await
            .unwrap();

        assert_eq!(dashboard.foods().len(), 2);
        assert_eq!(dashboard.totals().carbs_g, 73.0);
        let roles: Vec<ChatRole> = chat.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
        );
        assert!(!chat.is_busy());
    }

    #[tokio::test]
    async fn test_dashboard_stops_at_end_of_input() {
        let mut dashboard = Dashboard::new(profile());
        let assistant = Assistant::Local(SimulatedAgent::new(profile()));
        let mut chat = ChatSession::new(dashboard.profile());

        let input: &[u8] = b"/add idli";
        run_dashboard(input, &mut dashboard, &assistant, &mut chat)
            .await
            .unwrap();

        assert_eq!(dashboard.foods().len(), 1);
        assert_eq!(chat.messages().len(), 1);
    }
}
