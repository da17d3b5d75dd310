use std::fmt;

use sea_orm::DbErr;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    MissingDatabaseUrl,
    BadPort(String),
    BadPagination(String),
    BadPoolSize(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::MissingDatabaseUrl => write!(f, "Database url is empty"),
            ConfigError::BadPort(e) => write!(f, "Port error: {}", e),
            ConfigError::BadPagination(e) => write!(f, "Pagination error: {}", e),
            ConfigError::BadPoolSize(e) => write!(f, "Connection pool error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

/// Rejected input, reported to API clients as a 400.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingFields(Vec<&'static str>),
    Invalid(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields(fields) => {
                write!(f, "Missing required fields: {}", fields.join(", "))
            }
            ValidationError::Invalid(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum StorageError {
    ConnectionFailed(String),
    MigrationFailed(String),
    QueryFailed(String),
    NotFound(String),
    Validation(ValidationError),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionFailed(e) => write!(f, "Storage connection failed: {}", e),
            StorageError::MigrationFailed(e) => write!(f, "Schema migration failed: {}", e),
            StorageError::QueryFailed(e) => write!(f, "Database query failed: {}", e),
            StorageError::NotFound(what) => write!(f, "{} not found", what),
            StorageError::Validation(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation(err)
    }
}

#[derive(Debug)]
pub enum WebError {
    BadAddress(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BadAddress(e) => write!(f, "Invalid listen address: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    StorageError(StorageError),
    WebError(WebError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::StorageError(e) => write!(f, "Storage error: {}", e),
            ControllerError::WebError(e) => write!(f, "Web server error: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<ConfigError> for ControllerError {
    fn from(err: ConfigError) -> Self {
        ControllerError::ConfigurationError(err)
    }
}

impl From<StorageError> for ControllerError {
    fn from(err: StorageError) -> Self {
        ControllerError::StorageError(err)
    }
}

impl From<WebError> for ControllerError {
    fn from(err: WebError) -> Self {
        ControllerError::WebError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_every_field() {
        let err = ValidationError::MissingFields(vec!["student_id", "total_hours"]);
        assert_eq!(
            err.to_string(),
            "Missing required fields: student_id, total_hours"
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = StorageError::NotFound("ITA agreement".into());
        assert_eq!(err.to_string(), "ITA agreement not found");
    }
}
