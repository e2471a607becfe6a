use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Authentication failed: {message}")]
    AuthenticationError {
        status: Option<u16>,
        message: String,
    },

    #[error("No modules found for semester {semester}")]
    NotFoundError { semester: u32 },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Portal answered HTTP {status}: {reason}")]
    HttpStatusError { status: u16, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    SheetError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    Data,
    Network,
    Storage,
    Rendering,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StrategyError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StrategyError::AuthenticationError { .. } => ErrorCategory::Authentication,
            StrategyError::NotFoundError { .. } | StrategyError::SerializationError(_) => {
                ErrorCategory::Data
            }
            StrategyError::ApiError(_) | StrategyError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            StrategyError::IoError(_) => ErrorCategory::Storage,
            StrategyError::SheetError(_) => ErrorCategory::Rendering,
            StrategyError::ConfigError { .. } | StrategyError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Authentication | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Rendering => ErrorSeverity::Critical,
        }
    }

    /// Process exit code reported by the CLI for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            StrategyError::AuthenticationError { .. } => 2,
            StrategyError::NotFoundError { .. } => 3,
            StrategyError::IoError(_) => 4,
            _ => 1,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            StrategyError::AuthenticationError { .. } => {
                "Log in to the intranet again and copy a fresh Cookie header from your browser"
            }
            StrategyError::NotFoundError { .. } => {
                "Check the semester number, or omit --semester to use the latest one"
            }
            StrategyError::ApiError(_) => "Check your network connection and try again",
            StrategyError::HttpStatusError { status, .. } if *status >= 500 => {
                "The intranet is temporarily unavailable, try again in a few minutes"
            }
            StrategyError::HttpStatusError { .. } => "Check the portal settings in your config file",
            StrategyError::IoError(_) => "Make sure the output directory exists and is writable",
            StrategyError::SerializationError(_) => {
                "The intranet returned an unexpected payload, check the modules endpoint"
            }
            StrategyError::SheetError(_) => "Report the issue together with the --verbose log",
            StrategyError::ConfigError { .. } | StrategyError::InvalidConfigValueError { .. } => {
                "Fix the command-line arguments or the TOML config file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StrategyError::AuthenticationError { status: Some(status), .. } => {
                format!("Invalid or expired cookie (HTTP {})", status)
            }
            StrategyError::AuthenticationError { message, .. } => {
                format!("Invalid or expired cookie: {}", message)
            }
            StrategyError::NotFoundError { semester } => {
                format!("No modules found for semester {}", semester)
            }
            StrategyError::ApiError(e) => format!("Could not reach the intranet: {}", e),
            StrategyError::IoError(e) => format!("Could not write the output file: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StrategyError>;
