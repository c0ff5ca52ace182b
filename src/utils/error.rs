use thiserror::Error;

/// Pipeline stage that produced a terminal "nothing found" outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    EnzymeIdentity,
    ProteinRecord,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::EnzymeIdentity => "enzyme identity",
            Stage::ProteinRecord => "protein record",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ZymeError {
    #[error("No {stage} found for '{subject}'{}", cause_suffix(.cause))]
    NotFound {
        stage: Stage,
        subject: String,
        /// Exhausted transient failure that ended the stage, if any.
        cause: Option<String>,
    },

    #[error("Output directory already processed: {path}")]
    AlreadyProcessed { path: String },

    #[error("{step} failed after retries: {message}")]
    TransientService {
        step: String,
        status: Option<u16>,
        message: String,
    },

    #[error("{step} failed: {message}")]
    FatalService {
        step: String,
        status: Option<u16>,
        message: String,
    },

    #[error("{step} returned an unexpected response: {message}")]
    MalformedResponse { step: String, message: String },

    #[error("Sequence generation failed: {message}")]
    Generation { message: String },

    #[error("Manifest error: {message}")]
    ManifestError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Service,
    Generation,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ZymeError {
    pub fn not_found(stage: Stage, subject: impl Into<String>) -> Self {
        ZymeError::NotFound {
            stage,
            subject: subject.into(),
            cause: None,
        }
    }

    /// NotFound-class outcome for a stage whose service stayed unavailable
    /// after retries. The message still names the failing step.
    pub fn unavailable(stage: Stage, subject: impl Into<String>, cause: &ZymeError) -> Self {
        ZymeError::NotFound {
            stage,
            subject: subject.into(),
            cause: Some(cause.to_string()),
        }
    }

    pub fn malformed(step: impl Into<String>, message: impl Into<String>) -> Self {
        ZymeError::MalformedResponse {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Relabels a service error with the external step that issued the call.
    pub fn at_step(self, step: &str) -> Self {
        match self {
            ZymeError::TransientService {
                status, message, ..
            } => ZymeError::TransientService {
                step: step.to_string(),
                status,
                message,
            },
            ZymeError::FatalService {
                status, message, ..
            } => ZymeError::FatalService {
                step: step.to_string(),
                status,
                message,
            },
            ZymeError::MalformedResponse { message, .. } => ZymeError::MalformedResponse {
                step: step.to_string(),
                message,
            },
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ZymeError::NotFound { .. })
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ZymeError::TransientService { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ZymeError::TransientService { status, .. } | ZymeError::FatalService { status, .. } => {
                *status
            }
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ZymeError::NotFound { .. } | ZymeError::AlreadyProcessed { .. } => {
                ErrorCategory::NotFound
            }
            ZymeError::TransientService { .. }
            | ZymeError::FatalService { .. }
            | ZymeError::MalformedResponse { .. } => ErrorCategory::Service,
            ZymeError::Generation { .. } => ErrorCategory::Generation,
            ZymeError::ConfigValidationError { .. }
            | ZymeError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ZymeError::ManifestError { .. }
            | ZymeError::IoError(_)
            | ZymeError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ZymeError::NotFound { .. } | ZymeError::AlreadyProcessed { .. } => ErrorSeverity::Low,
            ZymeError::TransientService { .. } | ZymeError::Generation { .. } => {
                ErrorSeverity::Medium
            }
            ZymeError::FatalService { .. }
            | ZymeError::MalformedResponse { .. }
            | ZymeError::ConfigValidationError { .. }
            | ZymeError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            ZymeError::ManifestError { .. }
            | ZymeError::IoError(_)
            | ZymeError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ZymeError::NotFound { cause: Some(_), .. } => {
                "The upstream service is unavailable; retry later".to_string()
            }
            ZymeError::NotFound { stage, .. } => match stage {
                Stage::EnzymeIdentity => {
                    "Try another ligand name, add it to [identity.table], or switch --strategy".to_string()
                }
                Stage::ProteinRecord => {
                    "Add a query hint for this enzyme under [protein.query_hints]".to_string()
                }
            },
            ZymeError::AlreadyProcessed { .. } => {
                "Remove the existing output directory or choose another --output-root".to_string()
            }
            ZymeError::TransientService { .. } => {
                "The upstream service is unavailable; retry later".to_string()
            }
            ZymeError::FatalService { status: Some(401 | 403), .. } => {
                "Check the API token configured for this service".to_string()
            }
            ZymeError::FatalService { .. } | ZymeError::MalformedResponse { .. } => {
                "Check the service base URL in the configuration".to_string()
            }
            ZymeError::Generation { .. } => {
                "Check the generator endpoint or lower --count".to_string()
            }
            ZymeError::ConfigValidationError { .. } | ZymeError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command-line flags".to_string()
            }
            ZymeError::ManifestError { .. }
            | ZymeError::IoError(_)
            | ZymeError::SerializationError(_) => {
                "Check permissions and free space under the output root".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::NotFound => self.to_string(),
            ErrorCategory::Service => format!("External service error: {}", self),
            ErrorCategory::Generation => self.to_string(),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

fn cause_suffix(cause: &Option<String>) -> String {
    match cause {
        Some(cause) => format!(" ({})", cause),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, ZymeError>;
