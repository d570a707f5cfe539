//! `greeter config` subcommands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Prints the effective configuration as TOML.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("cannot render config as TOML: {}", e)))?;
    print!("{}", rendered);
    Ok(())
}

/// Checks the configuration and reports what it would use.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    config.validate().map_err(ClientError::Config)?;
    println!(
        "ok: calls {} ({}ms timeout), serves on {}",
        config.client.endpoint, config.client.timeout_ms, config.server.bind
    );
    Ok(())
}

/// Prints where the default configuration file is looked up.
pub fn path() -> ClientResult<()> {
    let config_path = ClientConfig::default_path();
    let state = if config_path.exists() {
        "present"
    } else {
        "absent, defaults apply"
    };
    println!("{} ({})", config_path.display(), state);
    Ok(())
}
