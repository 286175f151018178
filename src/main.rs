use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use account_links::configuration::{AppConfig, TokenPurpose};
use account_links::email::{Delivery, EmailManager, User};
use account_links::render::DefaultRenderer;
use account_links::transport::LogTransport;
use clap::{Parser, Subcommand};
use url_token::VerifyOutcome;

#[derive(Debug, Parser)]
#[command(name = "account-links", about = "Issue and check signed account links")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "conf.yaml")]
    conf: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a token for an account id
    Generate { id: u64 },
    /// Check a token; exits non-zero unless it is valid
    Verify {
        token: String,
        /// Maximum token age in seconds (defaults to the confirm-email expiration)
        #[arg(long)]
        max_age: Option<u64>,
    },
    /// Render a confirmation email and hand it to the log transport
    SendConfirmation { id: u64, email: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Enable basic logging; set RUST_LOG=info for visibility.
    env_logger::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> account_links::Result<ExitCode> {
    let config = AppConfig::from_file(&cli.conf)?;
    let tokens = config.token_manager()?;

    match cli.command {
        Command::Generate { id } => {
            println!("{}", tokens.generate_token(id)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { token, max_age } => {
            let max_age = max_age
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.email.max_age(TokenPurpose::ConfirmEmail));
            match tokens.verify_token(&token, max_age) {
                VerifyOutcome::Valid(id) => {
                    println!("valid {id}");
                    Ok(ExitCode::SUCCESS)
                }
                VerifyOutcome::Expired => {
                    println!("expired");
                    Ok(ExitCode::from(2))
                }
                VerifyOutcome::Invalid => {
                    println!("invalid");
                    Ok(ExitCode::from(1))
                }
            }
        }
        Command::SendConfirmation { id, email } => {
            config.email.validate()?;
            let manager = EmailManager::new(
                Arc::new(tokens),
                Arc::new(DefaultRenderer),
                Arc::new(LogTransport),
                config.email,
                config.links,
            );
            let user = User {
                id,
                email,
                username: None,
            };
            match manager.send_confirm_email(&user, None).await? {
                Delivery::Sent => println!("sent"),
                Delivery::Skipped => println!("skipped (disabled in config)"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
