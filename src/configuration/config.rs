use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Command-line arguments.
///
/// Every override can also come from the environment, which is how the
/// service is usually configured inside a container.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ita-tracker")]
#[command(version)]
#[command(about = "ITA agreement and signed attendance service")]
pub struct CliArgs {
    /// Path to a TOML configuration file
    ///
    /// Every section and field is optional; missing values fall back to the
    /// built-in defaults.
    pub config_file: Option<PathBuf>,

    /// Database connection url, overrides `[database].url`
    ///
    /// # Command Line
    /// Use `--database-url <URL>` or the `ITA_DATABASE_URL` variable
    #[arg(long, env = "ITA_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to bind the HTTP server to, overrides `[server].bind_address`
    #[arg(long, env = "ITA_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// HTTP port, overrides `[server].port`
    #[arg(long, env = "ITA_PORT")]
    pub port: Option<u16>,
}

/// Application configuration structure that defines all runtime parameters.
///
/// # Fields Overview
///
/// - `server`: where the HTTP API listens
/// - `database`: connection url and pool sizing
/// - `pagination`: default and maximum page size of list endpoints
///
/// # Examples
///
/// ```toml
/// [server]
/// port = 8080
///
/// [database]
/// url = "mysql://school:secret@db:3306/school"
/// max_connections = 20
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
}

impl Config {
    /// Reads and validates a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config = Self::from_toml(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::TomlError(e.to_string()))
    }

    /// Builds the configuration from the file named on the command line (or
    /// the defaults) and applies the CLI/environment overrides on top.
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config_file {
            Some(path) => Self::from_toml(&fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        if let Some(url) = &args.database_url {
            config.database.url = url.clone();
        }
        if let Some(address) = &args.bind_address {
            config.server.bind_address = address.clone();
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if self.server.port == 0 {
            return Err(ConfigError::BadPort("port must not be 0".into()));
        }
        if self.pagination.default_limit == 0
            || self.pagination.default_limit > self.pagination.max_limit
        {
            return Err(ConfigError::BadPagination(format!(
                "default_limit ({}) must be between 1 and max_limit ({})",
                self.pagination.default_limit, self.pagination.max_limit
            )));
        }
        if self.database.max_connections == 0
            || self.database.min_connections > self.database.max_connections
        {
            return Err(ConfigError::BadPoolSize(format!(
                "min_connections ({}) must not exceed max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args_under_test(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["ita-tracker"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap_or_else(|e| panic!("{}", e))
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [pagination]
            max_limit = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.pagination.default_limit, 10);
        assert_eq!(config.pagination.max_limit, 50);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            Config::from_toml("[server\nport = 1"),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(config.validate(), Err(ConfigError::BadPort(_))));

        let mut config = Config::default();
        config.pagination.default_limit = 500;
        assert!(matches!(config.validate(), Err(ConfigError::BadPagination(_))));

        let mut config = Config::default();
        config.database.min_connections = 50;
        assert!(matches!(config.validate(), Err(ConfigError::BadPoolSize(_))));

        let mut config = Config::default();
        config.database.url = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::MissingDatabaseUrl)));
    }

    #[test]
    #[serial]
    fn test_file_then_cli_overrides() {
        std::env::remove_var("ITA_PORT");
        std::env::remove_var("ITA_DATABASE_URL");
        std::env::remove_var("ITA_BIND_ADDRESS");

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[database]\nurl = \"mysql://file@db/school\"\n[server]\nport = 7000"
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_owned();

        let config = Config::load(&args_under_test(&[&path, "--port", "9000"])).unwrap();
        assert_eq!(config.database.url, "mysql://file@db/school");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        std::env::set_var("ITA_DATABASE_URL", "mysql://env@db/school");
        std::env::set_var("ITA_PORT", "4100");
        let config = Config::load(&args_under_test(&[]));
        std::env::remove_var("ITA_DATABASE_URL");
        std::env::remove_var("ITA_PORT");

        let config = config.unwrap();
        assert_eq!(config.database.url, "mysql://env@db/school");
        assert_eq!(config.server.port, 4100);
    }
}
