mod agent_client;
mod commands;
mod config;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::agent_client::DEFAULT_AGENT_URL;
use crate::commands::{
    cmd_ask, cmd_dashboard, cmd_food_lookup, cmd_food_search, cmd_health, cmd_history,
    cmd_import_users, cmd_login, cmd_logout, cmd_plan, cmd_profile,
};
use crate::config::Config;
use gluco_core::service::AgentService;

#[derive(Parser)]
#[command(
    name = "gluco",
    version,
    about = "A terminal health dashboard with a glucose-aware assistant",
    long_about = "\n\n   ██████╗ ██╗     ██╗   ██╗ ██████╗ ██████╗
  ██╔════╝ ██║     ██║   ██║██╔════╝██╔═══██╗
  ██║  ███╗██║     ██║   ██║██║     ██║   ██║
  ██║   ██║██║     ██║   ██║██║     ██║   ██║
  ╚██████╔╝███████╗╚██████╔╝╚██████╗╚██████╔╝
   ╚═════╝ ╚══════╝ ╚═════╝  ╚═════╝ ╚═════╝
        know your numbers.
"
)]
struct Cli {
    /// Base URL of the agent API
    #[arg(long, global = true, env = "GLUCO_AGENT_URL", default_value = DEFAULT_AGENT_URL)]
    agent_url: String,
    /// User table CSV (default: users.csv in the data directory)
    #[arg(long, global = true, env = "GLUCO_USERS_CSV", value_name = "PATH")]
    users: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with a user ID (1001-1100)
    Login {
        /// User ID from the user table
        user_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Forget the logged-in user
    Logout {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the logged-in user's profile and stats cards
    Profile {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up nutrition values
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Generate a meal plan for the logged-in user
    Plan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send one message to the assistant
    Ask {
        /// Message text
        message: String,
        /// Answer with the built-in assistant instead of the agent API
        #[arg(long)]
        local: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open the interactive dashboard
    Dashboard {
        /// Answer with the built-in assistant instead of the agent API
        #[arg(long)]
        local: bool,
    },
    /// Start the agent API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
    /// Import data from external sources
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Show readings recorded by the agent server
    History {
        /// Log kind: cgm, mood, food
        #[arg(short, long, default_value = "cgm")]
        kind: String,
        /// Maximum number of entries
        #[arg(short, long, default_value = "20")]
        limit: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check whether the agent API is reachable
    Health {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Nutrition for one food (estimated when not in the table)
    Lookup {
        /// Food name
        name: String,
        /// Only accept foods from the nutrition table
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search the nutrition table
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Import the user table CSV
    Users {
        /// Path to the CSV file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_env("GLUCO_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(if matches!(cli.command, Commands::Serve { .. }) {
        "info"
    } else {
        "warn"
    });

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.users)?;
    let agent_url = cli.agent_url;

    match cli.command {
        Commands::Login { user_id, json } => cmd_login(&config, &user_id, json),
        Commands::Logout { json } => cmd_logout(&config, json),
        Commands::Profile { json } => cmd_profile(&config, json),
        Commands::Food { command } => match command {
            FoodCommands::Lookup { name, strict, json } => cmd_food_lookup(&name, strict, json),
            FoodCommands::Search { query, json } => cmd_food_search(&query, json),
        },
        Commands::Plan { json } => cmd_plan(&config, json),
        Commands::Ask {
            message,
            local,
            json,
        } => cmd_ask(&config, &agent_url, &message, local, json).await,
        Commands::Dashboard { local } => cmd_dashboard(&config, &agent_url, local).await,
        Commands::Serve { port, bind } => {
            let service = AgentService::new(&config.db_path)?;
            if service.count_users()? == 0 && config.users_path.exists() {
                let file = std::fs::File::open(&config.users_path)?;
                let imported = service.import_users_csv(file)?;
                tracing::info!(imported, path = %config.users_path.display(), "seeded users");
            }
            server::start_server(service, port, &bind).await
        }
        Commands::Import { command } => match command {
            ImportCommands::Users { file, json } => cmd_import_users(&config, &file, json),
        },
        Commands::History { kind, limit, json } => cmd_history(&config, &kind, limit, json),
        Commands::Health { json } => cmd_health(&agent_url, json).await,
    }
}
