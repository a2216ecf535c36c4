use thiserror::Error;

/// 遠端呼叫失敗的分類（皆不可重試）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Timeout,
    Authentication,
    NotFound,
    MalformedRequest,
    Endpoint,
    Decode,
    DeadlineExceeded,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::Transport => "transport failure",
            FailureKind::Timeout => "request timed out",
            FailureKind::Authentication => "authentication failed",
            FailureKind::NotFound => "endpoint not found",
            FailureKind::MalformedRequest => "malformed request",
            FailureKind::Endpoint => "endpoint error",
            FailureKind::Decode => "response decode failure",
            FailureKind::DeadlineExceeded => "deadline exceeded",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Config parsing error: {message}")]
    ConfigParse { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transient serving error{}: {message}", status_suffix(.status))]
    TransientServing { status: Option<u16>, message: String },

    #[error("Invocation failed ({kind}): {message}")]
    FatalInvocation { kind: FailureKind, message: String },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Serving,
    Invocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RouterError {
    pub fn configuration(message: impl Into<String>) -> Self {
        RouterError::Configuration {
            message: message.into(),
        }
    }

    pub fn transient(status: Option<u16>, message: impl Into<String>) -> Self {
        RouterError::TransientServing {
            status,
            message: message.into(),
        }
    }

    pub fn fatal(kind: FailureKind, message: impl Into<String>) -> Self {
        RouterError::FatalInvocation {
            kind,
            message: message.into(),
        }
    }

    /// 只有模型服務端的暫時性錯誤可以重試
    pub fn is_transient(&self) -> bool {
        matches!(self, RouterError::TransientServing { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            RouterError::FatalInvocation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RouterError::Configuration { .. }
            | RouterError::InvalidConfigValue { .. }
            | RouterError::MissingConfig { .. }
            | RouterError::ConfigParse { .. }
            | RouterError::Io(_) => ErrorCategory::Configuration,
            RouterError::TransientServing { .. } => ErrorCategory::Serving,
            RouterError::FatalInvocation { .. } => ErrorCategory::Invocation,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RouterError::TransientServing { .. } => ErrorSeverity::Medium,
            RouterError::FatalInvocation { kind, .. } => match kind {
                FailureKind::Authentication | FailureKind::NotFound => ErrorSeverity::Critical,
                _ => ErrorSeverity::High,
            },
            _ => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            RouterError::Configuration { .. } => {
                "Make sure every classifier language/domain key has a registry entry"
            }
            RouterError::InvalidConfigValue { .. }
            | RouterError::MissingConfig { .. }
            | RouterError::ConfigParse { .. } => "Check the TOML configuration file",
            RouterError::Io(_) => "Check that the file exists and is readable",
            RouterError::TransientServing { .. } => {
                "The model server is busy or swapping adapters; try again shortly"
            }
            RouterError::FatalInvocation { kind, .. } => match kind {
                FailureKind::Authentication => "Check the endpoint credentials (auth_token)",
                FailureKind::NotFound => "Check the endpoint URL and that the endpoint is deployed",
                FailureKind::Timeout | FailureKind::DeadlineExceeded => {
                    "Increase timeout_seconds / deadline_seconds or shorten max_new_tokens"
                }
                FailureKind::Transport => "Check network connectivity to the endpoint",
                FailureKind::MalformedRequest => "Check the generation parameters and adapter name",
                FailureKind::Decode => "The endpoint must answer with a JSON object containing generated_text",
                FailureKind::Endpoint => "Inspect the endpoint logs",
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Router configuration problem: {}", self),
            ErrorCategory::Serving => format!("The model is temporarily unavailable: {}", self),
            ErrorCategory::Invocation => format!("Could not get a response from the model: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, RouterError>;
