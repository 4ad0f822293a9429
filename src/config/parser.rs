use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Reads a TOML file and returns the validated configuration
///
/// Read failures surface as `ConfigError::Io`, syntax errors as
/// `ConfigError::Parse` and rejected values as `Validation`,
/// `InvalidUrl` or `UnsupportedStrategy`.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitescope::config::load_config;
///
/// let config = load_config(Path::new("sitescope.toml")).unwrap();
/// println!("Seed: {}", config.crawler.seed_url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}
