//! Pet adoption CLI - database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending database migrations
//! pets-cli migrate
//!
//! # Create an account and print its token
//! pets-cli user create -u alice -e alice@example.com -p 'correct horse'
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create an account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pets-cli")]
#[command(author, version, about = "Pet adoption CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new account
    Create {
        /// Username (letters, digits and @/./+/-/_)
        #[arg(short, long)]
        username: String,

        /// Contact email address
        #[arg(short, long)]
        email: Option<String>,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                password,
            } => {
                let token = commands::user::create(username, email, password).await?;
                #[allow(clippy::print_stdout)]
                {
                    println!("{}", token.as_str());
                }
            }
        },
    }
    Ok(())
}
