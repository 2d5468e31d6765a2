//! Structured error types shared across remat crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`RematError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (indices, shapes, descriptor labels, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the remat engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum RematError {
    /// Grid shape and indexing errors.
    #[error("grid error: {0}")]
    Grid(ErrorInfo),
    /// Correlation tracker errors (unsupported descriptors, bad lengths).
    #[error("tracker error: {0}")]
    Tracker(ErrorInfo),
    /// Sampling strategy errors (exhausted retries, broken histograms).
    #[error("sampler error: {0}")]
    Sampler(ErrorInfo),
    /// Cost function preconditions and baseline errors.
    #[error("cost error: {0}")]
    Cost(ErrorInfo),
    /// Configuration construction errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Annealing kernel invariant violations.
    #[error("kernel error: {0}")]
    Kernel(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl RematError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            RematError::Grid(info)
            | RematError::Tracker(info)
            | RematError::Sampler(info)
            | RematError::Cost(info)
            | RematError::Config(info)
            | RematError::Kernel(info) => info,
        }
    }
}
