// Operator CLI: bootstrap admin accounts and run maintenance tasks that
// have no place on the request path.
use anyhow::Result;
use clap::{Parser, Subcommand};

use onlytrack_api::auth::credentials;
use onlytrack_api::services::{AdminService, SessionService};

#[derive(Parser)]
#[command(name = "onlytrack", about = "OnlyTrack API operator tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a super-admin account (the admin plane has no signup route)
    AdminCreate {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// Omit to have a policy-satisfying password generated and printed once
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete expired session rows to bound storage growth
    SessionSweep,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::AdminCreate {
            email,
            name,
            password,
        } => {
            let (password, generated) = match password {
                Some(password) => {
                    credentials::validate_password(&password)
                        .map_err(|message| anyhow::anyhow!(message))?;
                    (password, false)
                }
                None => (credentials::generate_secure_password(), true),
            };

            let service = AdminService::new().await?;
            let admin = service.create(&email, &name, &password).await?;

            println!("Created admin {} ({})", admin.email, admin.id);
            if generated {
                // Printed once; only the hash is stored.
                println!("Generated password: {}", password);
            }
        }
        Commands::SessionSweep => {
            let service = SessionService::new().await?;
            let removed = service.sweep_expired().await?;
            println!("Removed {} expired sessions", removed);
        }
    }

    Ok(())
}
