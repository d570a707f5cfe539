//! greeter CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use greeter_client::cli::{Cli, Command, ConfigAction};
use greeter_client::config::ClientConfig;
use greeter_client::error::{ClientError, ClientResult};
use greeter_client::{GreeterClient, commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing; the server logs what it serves by default
    let default_level = match cli.command {
        Some(Command::Serve { .. }) => Level::INFO,
        _ => Level::WARN,
    };
    let filter = if cli.debug {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = if let Some(ref path) = cli.config {
        ClientConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    match cli.command {
        Some(Command::Serve { ref bind }) => {
            let mut settings = config.server.clone();
            if let Some(bind) = bind {
                settings.bind = bind.clone();
            }
            commands::serve::run(settings.to_server_config()).await
        }
        Some(Command::Config { ref action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(),
        },
        Some(Command::Hello { ref name }) => {
            commands::hello::run(&client(&cli, &config), name).await
        }
        None => commands::hello::run(&client(&cli, &config), "world").await,
    }
}

/// Builds the client, letting flags override the config file.
fn client(cli: &Cli, config: &ClientConfig) -> GreeterClient {
    let mut settings = config.client.clone();
    if let Some(ref addr) = cli.addr {
        settings.endpoint = addr.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        settings.timeout_ms = timeout_ms;
    }
    settings.to_client()
}
