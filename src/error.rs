//! Error types for build-keeper
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::domain::BuildNumber;

/// All error types that can occur while deciding retention
#[derive(Debug, Error)]
pub enum KeeperError {
    /// Policy or configuration value rejected at the configuration boundary
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Build not present in the job history
    #[error("Build not found: #{0}")]
    BuildNotFound(BuildNumber),

    /// A predecessor link that does not move strictly backwards
    #[error("Broken build chain: #{build} links to #{previous}")]
    BrokenChain { build: BuildNumber, previous: BuildNumber },

    /// Build appended out of number order
    #[error("Build #{number} is not newer than #{last}")]
    OutOfOrder { number: BuildNumber, last: BuildNumber },

    /// No build number is left after the last recorded one
    #[error("Build numbers exhausted after #{last}")]
    NumbersExhausted { last: BuildNumber },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for build-keeper operations
pub type Result<T> = std::result::Result<T, KeeperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_error() {
        let err = KeeperError::InvalidConfig("period must be at least 1".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: period must be at least 1");
    }

    #[test]
    fn test_build_not_found_error() {
        let err = KeeperError::BuildNotFound(42);
        assert_eq!(err.to_string(), "Build not found: #42");
    }

    #[test]
    fn test_broken_chain_error() {
        let err = KeeperError::BrokenChain { build: 3, previous: 7 };
        assert_eq!(err.to_string(), "Broken build chain: #3 links to #7");
    }

    #[test]
    fn test_out_of_order_error() {
        let err = KeeperError::OutOfOrder { number: 2, last: 5 };
        assert_eq!(err.to_string(), "Build #2 is not newer than #5");
    }

    #[test]
    fn test_numbers_exhausted_error() {
        let err = KeeperError::NumbersExhausted { last: u64::MAX };
        assert_eq!(err.to_string(), format!("Build numbers exhausted after #{}", u64::MAX));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KeeperError = io_err.into();
        assert!(matches!(err, KeeperError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: KeeperError = json_err.into();
        assert!(matches!(err, KeeperError::Json(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let err: KeeperError = yaml_err.into();
        assert!(matches!(err, KeeperError::Yaml(_)));
    }
}
