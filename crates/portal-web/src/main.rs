//! Portal server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p portal-web -- serve
//! ```
//!
//! Configuration is loaded from environment variables or a `.env` file.

use clap::Parser;
use portal_common::{AppConfig, AppError, Environment, TracingConfig};
use portal_web::cli::{Cli, Command};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = TracingConfig::for_environment(Environment::from_env()).try_init() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(cli.into_command()).await {
        error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), AppError> {
    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        AppError::Config(e.to_string())
    })?;

    match command {
        Command::Serve => {
            info!(
                env = ?config.app.env,
                address = %config.server.address(),
                sessions = ?config.session.backend,
                mail = ?config.mail.backend,
                "Configuration loaded"
            );
            portal_web::run(config).await
        }
        Command::Migrate => portal_web::migrate(&config).await,
        Command::CreateSuperuser {
            username,
            email,
            password,
        } => portal_web::create_superuser(config, &username, &email, &password)
            .await
            .map(|_| ()),
    }
}
