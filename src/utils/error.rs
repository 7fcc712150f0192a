use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BomError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Malformed XML in {}: {message}", path.display())]
    XmlParseError { path: PathBuf, message: String },

    #[error("{} is missing required element <{element}>", path.display())]
    MissingElementError { path: PathBuf, element: String },

    #[error("POM file not found: {}", path.display())]
    MissingFileError { path: PathBuf },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BomError {
    pub fn xml_parse(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        BomError::XmlParseError {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn missing_element(path: impl Into<PathBuf>, element: &str) -> Self {
        BomError::MissingElementError {
            path: path.into(),
            element: element.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BomError::ConfigError { .. }
            | BomError::ConfigValidationError { .. }
            | BomError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            BomError::XmlError(_)
            | BomError::XmlParseError { .. }
            | BomError::MissingElementError { .. }
            | BomError::MissingFileError { .. } => ErrorCategory::Input,
            BomError::SerializationError(_) | BomError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            BomError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            BomError::XmlParseError { path, .. } => {
                format!("Fix the XML syntax in {} and run again", path.display())
            }
            BomError::MissingElementError { element, .. } => format!(
                "Declare <{}> in the module or inherit it through its <parent> block",
                element
            ),
            BomError::MissingFileError { .. } => {
                "Check the <module> entries of the aggregator POM against the directory layout"
                    .to_string()
            }
            BomError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            BomError::ConfigError { .. }
            | BomError::ConfigValidationError { .. }
            | BomError::InvalidConfigValueError { .. } => {
                "Review the command line flags or the TOML configuration file".to_string()
            }
            _ => "Re-run with --verbose for more details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read the Maven project: {}", self),
            ErrorCategory::Processing => format!("Conversion failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, BomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_is_input_error() {
        let err = BomError::missing_element("a/pom.xml", "groupId");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("<groupId>"));
        assert!(err.recovery_suggestion().contains("<parent>"));
    }

    #[test]
    fn test_config_errors_exit_with_two() {
        let err = BomError::ConfigError {
            message: "cannot read pom2bom.toml".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 2);
        assert!(err.user_friendly_message().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = BomError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }
}
