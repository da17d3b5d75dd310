use std::sync::Arc;

use log::{error, info};

use crate::configuration::config::Config;
use crate::error_handling::types::*;
use crate::storage::database_storage::DatabaseStorage;
use crate::storage::storage_trait::Storage;
use crate::web_interface::web_server::WebServer;

/// Owns the runtime configuration and wires storage to the web server.
pub struct Controller {
    pub config: Config,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        config.validate().map_err(|err| {
            error!("Rejected configuration: {}", err);
            ControllerError::ConfigurationError(err)
        })?;
        Ok(Self { config })
    }

    /// Connects to the database, applies pending migrations and serves the
    /// API until the process is stopped.
    pub async fn run(&self) -> Result<(), ControllerError> {
        info!("Connecting to database");
        let storage = DatabaseStorage::connect(&self.config.database).await?;
        storage.migrate().await?;

        let storage: Arc<dyn Storage> = Arc::new(storage);
        let server = WebServer::new(storage, self.config.pagination.clone());
        server.start(&self.config.server).await?;

        info!("Web server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            Controller::new(config),
            Err(ControllerError::ConfigurationError(ConfigError::BadPort(_)))
        ));
    }

    #[test]
    fn test_new_accepts_defaults() {
        let controller = Controller::new(Config::default()).unwrap();
        assert_eq!(controller.config.server.port, 3000);
    }

    #[tokio::test]
    async fn test_run_fails_on_unreachable_database() {
        let mut config = Config::default();
        config.database.url = "sqlite:///nonexistent-dir/for/sure/ita.db".into();
        config.database.connect_timeout_secs = 1;
        let controller = Controller::new(config).unwrap();
        assert!(matches!(
            controller.run().await,
            Err(ControllerError::StorageError(_))
        ));
    }
}
