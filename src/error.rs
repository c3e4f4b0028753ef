use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Backtrace taken where an error was raised. Empty unless `RUST_BACKTRACE`
/// or `RUST_LIB_BACKTRACE` enables capture.
#[derive(Clone)]
pub struct Origin(Arc<Backtrace>);

impl Origin {
    pub fn capture() -> Self {
        Origin(Arc::new(Backtrace::capture()))
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self.0.status() {
            BacktraceStatus::Captured => Some(self.0.as_ref()),
            _ => None,
        }
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.backtrace() {
            Some(_) => f.write_str("Origin(captured)"),
            None => f.write_str("Origin"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Missing prompt")]
    MissingPrompt,
    #[error("Missing init_image: img2img requires init_image")]
    MissingInitImage,
    #[error("Synthesis failed: {reason}")]
    SynthesisFailed {
        reason: String,
        #[source]
        source: Option<Box<GenerationError>>,
        origin: Origin,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("AWS error: {0}")]
    AwsError(String),
    #[error("AWS service error: {0}")]
    AwsServiceError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// How a failure is reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Synthesis,
    Unhandled,
}

impl GenerationError {
    pub fn synthesis(reason: impl Into<String>) -> Self {
        GenerationError::SynthesisFailed {
            reason: reason.into(),
            source: None,
            origin: Origin::capture(),
        }
    }

    /// Wraps a lower-level failure; the reason repeats its message so the
    /// caller-facing error stays self-contained.
    pub fn synthesis_caused_by(source: GenerationError) -> Self {
        GenerationError::SynthesisFailed {
            reason: source.to_string(),
            source: Some(Box::new(source)),
            origin: Origin::capture(),
        }
    }

    /// Backtrace captured where the error was raised, when one exists.
    pub fn origin(&self) -> Option<&Backtrace> {
        match self {
            GenerationError::SynthesisFailed { origin, .. } => origin.backtrace(),
            _ => None,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            GenerationError::MissingPrompt | GenerationError::MissingInitImage => {
                ErrorClass::Validation
            }
            GenerationError::SynthesisFailed { .. } => ErrorClass::Synthesis,
            _ => ErrorClass::Unhandled,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self.class() {
            ErrorClass::Validation => 400,
            ErrorClass::Synthesis | ErrorClass::Unhandled => 500,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.class() == ErrorClass::Validation
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
