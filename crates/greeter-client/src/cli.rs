//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// greeter - say hello over RPC
#[derive(Debug, Parser)]
#[command(name = "greeter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "GREETER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Server address to call (host:port)
    #[arg(long, env = "GREETER_ADDR")]
    pub addr: Option<String>,

    /// Call timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Call SayHello and print the greeting (default)
    Hello {
        /// Name to greet
        #[arg(default_value = "world")]
        name: String,
    },

    /// Run the greeter server in the foreground
    Serve {
        /// Address to listen on (host:port)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand() {
        let cli = Cli::try_parse_from(["greeter"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.debug);
        assert!(cli.timeout_ms.is_none());
    }

    #[test]
    fn hello_with_name() {
        let cli = Cli::try_parse_from(["greeter", "--timeout-ms", "250", "hello", "World"]).unwrap();
        assert_eq!(cli.timeout_ms, Some(250));
        assert!(matches!(cli.command, Some(Command::Hello { ref name }) if name == "World"));
    }

    #[test]
    fn hello_default_name() {
        let cli = Cli::try_parse_from(["greeter", "hello"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Hello { ref name }) if name == "world"));
    }

    #[test]
    fn serve_with_bind() {
        let cli = Cli::try_parse_from(["greeter", "serve", "--bind", "127.0.0.1:9000"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Serve { bind: Some(ref b) }) if b == "127.0.0.1:9000"
        ));
    }

    #[test]
    fn config_subcommands() {
        let cli = Cli::try_parse_from(["greeter", "config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Validate
            })
        ));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        assert!(Cli::try_parse_from(["greeter", "--timeout-ms", "soon"]).is_err());
    }
}
