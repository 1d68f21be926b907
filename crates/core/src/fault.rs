//! Faults and Error Classification
//!
//! Every fallible call to the remote analysis engine fails with a [`Fault`].
//! [`classify`] maps a fault onto a fixed [`ErrorCategory`] plus the message a
//! user should see; [`ErrorState`] is the per-consumer record of the last
//! classified failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const NETWORK_MESSAGE: &str = "Network connection failed. Please check your internet connection.";
const AUTH_MESSAGE: &str = "Authentication failed. Please check your permissions.";
const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";
const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";
const SERVER_MESSAGE: &str = "Server error occurred. Please try again later.";

/// A failure raised by a collaborator call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The transport produced (or failed to produce) an HTTP-like status.
    /// Status `0` means no response was received at all.
    #[error("{message}")]
    Transport { status: u16, message: String },

    /// A failure without a status code.
    #[error("{message}")]
    Generic { message: String },

    /// A bare message.
    #[error("{0}")]
    Message(String),
}

impl Fault {
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// The fault's own message, before classification.
    pub fn message(&self) -> &str {
        match self {
            Fault::Transport { message, .. } => message,
            Fault::Generic { message } => message,
            Fault::Message(message) => message,
        }
    }

    /// Status code for transport faults.
    pub fn status(&self) -> Option<u16> {
        match self {
            Fault::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Fault::Message(message)
    }
}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Fault::Message(message.to_string())
    }
}

/// Fixed error taxonomy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    Network,
    Timeout,
    Auth,
    NotFound,
    Server,
    Client,
    #[default]
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Network => write!(f, "network"),
            ErrorCategory::Timeout => write!(f, "timeout"),
            ErrorCategory::Auth => write!(f, "auth"),
            ErrorCategory::NotFound => write!(f, "notFound"),
            ErrorCategory::Server => write!(f, "server"),
            ErrorCategory::Client => write!(f, "client"),
            ErrorCategory::Unknown => write!(f, "unknown"),
        }
    }
}

/// Result of classifying a fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub message: String,
    pub category: ErrorCategory,
}

impl Classification {
    fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            category,
        }
    }
}

/// Classify a fault into a category and a user-facing message.
pub fn classify(fault: &Fault) -> Classification {
    match fault {
        Fault::Transport { status, message } => classify_status(*status, message),
        Fault::Generic { message } => {
            let lower = message.to_lowercase();
            if lower.contains("network") {
                Classification::new(ErrorCategory::Network, NETWORK_MESSAGE)
            } else if lower.contains("timeout") {
                Classification::new(ErrorCategory::Timeout, TIMEOUT_MESSAGE)
            } else {
                Classification::new(ErrorCategory::Unknown, message.clone())
            }
        }
        Fault::Message(message) => Classification::new(ErrorCategory::Unknown, message.clone()),
    }
}

fn classify_status(status: u16, message: &str) -> Classification {
    match status {
        0 => Classification::new(ErrorCategory::Network, NETWORK_MESSAGE),
        401 | 403 => Classification::new(ErrorCategory::Auth, AUTH_MESSAGE),
        404 => {
            // A server-supplied detail beats the stock phrase.
            let specific = !message.trim().is_empty()
                && !message.trim().eq_ignore_ascii_case("not found");
            if specific {
                Classification::new(ErrorCategory::NotFound, message)
            } else {
                Classification::new(ErrorCategory::NotFound, NOT_FOUND_MESSAGE)
            }
        }
        408 => Classification::new(ErrorCategory::Timeout, TIMEOUT_MESSAGE),
        500.. => Classification::new(ErrorCategory::Server, SERVER_MESSAGE),
        400..=499 => {
            if message.trim().is_empty() {
                Classification::new(
                    ErrorCategory::Client,
                    format!("Request failed with status {}", status),
                )
            } else {
                Classification::new(ErrorCategory::Client, message)
            }
        }
        _ => Classification::new(ErrorCategory::Unknown, message),
    }
}

/// Error state owned by one consumer (a view or the session).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorState {
    pub message: Option<String>,
    pub is_error: bool,
    pub category: ErrorCategory,
}

impl ErrorState {
    /// The cleared state.
    pub fn none() -> Self {
        Self::default()
    }

    /// Error state carrying the classified message.
    pub fn from_fault(fault: &Fault) -> Self {
        let Classification { message, category } = classify(fault);
        Self {
            message: Some(message),
            is_error: true,
            category,
        }
    }

    /// Error state carrying the fault's own message, with the classified category.
    pub fn from_raw(fault: &Fault) -> Self {
        Self {
            message: Some(fault.message().to_string()),
            is_error: true,
            category: classify(fault).category,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::none();
    }
}
