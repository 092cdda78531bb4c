use std::sync::Arc;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use refnet::config::Config;
use refnet::storage::{InMemoryStorage, Storage};
use refnet::{auth, logging, server};

#[derive(Parser)]
#[command(name = "refnet")]
#[command(about = "Referral network management backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "refnet.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Mint a bearer token for a configured account
    Token {
        /// Account id to issue the token for
        #[arg(long)]
        account: Uuid,
        /// Token lifetime in minutes (defaults to the configured TTL)
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
            server::start_server(storage, &config, port).await?;
        }
        Commands::Token {
            account,
            ttl_minutes,
        } => {
            if !config.auth.accounts.iter().any(|a| a.id == account) {
                return Err(format!("account {account} is not configured").into());
            }
            let ttl = ttl_minutes.unwrap_or(config.auth.token_ttl_minutes);
            let token = auth::mint_token(account, &config.auth.token_secret, ttl)?;
            println!("{token}");
        }
    }

    Ok(())
}
