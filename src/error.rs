/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/07/26
******************************************************************************/

//! Error taxonomy for the bridge.
//!
//! Every operation distinguishes its failure modes through [`AppError`] so
//! callers can branch on the variant instead of matching message strings.

use std::fmt;

/// Application-level error for all bridge operations
#[derive(Debug)]
pub enum AppError {
    /// An operation was attempted before a manager session was established
    NotConnected,
    /// The requested entity does not exist on the backend
    NotFound(String),
    /// A group with the same name already exists (cached or discovered)
    AlreadyExists(String),
    /// Balance operation attempted on an account without trading rights
    NoRights(u64),
    /// The backend call itself failed; carries the operation and subject
    Backend {
        /// Name of the gateway operation that failed
        operation: String,
        /// What went wrong, as reported by the backend
        detail: String,
    },
    /// Malformed or missing input from the caller
    InvalidInput(String),
    /// Transport-level HTTP failure talking to the manager endpoint
    Http(reqwest::Error),
    /// JSON (de)serialization failure
    Serialization(serde_json::Error),
}

impl AppError {
    /// Wraps a backend failure with the operation name and affected subject
    pub fn backend(operation: impl Into<String>, detail: impl fmt::Display) -> Self {
        AppError::Backend {
            operation: operation.into(),
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotConnected => write!(f, "Not connected to MT5 server"),
            AppError::NotFound(what) => write!(f, "{what} not found"),
            AppError::AlreadyExists(name) => write!(f, "Group '{name}' already exists"),
            AppError::NoRights(login) => {
                write!(f, "User {login} has no trading rights (rights = 0)")
            }
            AppError::Backend { operation, detail } => {
                write!(f, "Backend operation '{operation}' failed: {detail}")
            }
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            AppError::Http(e) => write!(f, "HTTP error: {e}"),
            AppError::Serialization(e) => write!(f, "Serialization error: {e}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Http(e) => Some(e),
            AppError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Http(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e)
    }
}
