//! Contract call error classification
//!
//! Every failed contract call is reduced to a [`ContractCallError`] here so
//! call sites never match on error text themselves.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const REVERT_DIAGNOSTIC: &str =
    "Contract call failed - the contract might not support this method";
pub const NETWORK_DIAGNOSTIC: &str = "Network connection error - please try again";
pub const UNKNOWN_ERROR_DIAGNOSTIC: &str = "Unknown error";

// Matched on whole words, so "disconnected" is not "connect" and a chain
// named in the text is not a network failure.
const REVERT_PHRASES: [&str; 5] = [
    "revert",
    "reverted",
    "call_exception",
    "call exception",
    "execution reverted",
];

const NETWORK_PHRASES: [&str; 14] = [
    "error sending request",
    "could not detect network",
    "network error",
    "connection refused",
    "connection reset",
    "connection closed",
    "connection error",
    "failed to connect",
    "error trying to connect",
    "timed out",
    "timeout",
    "dns error",
    "unreachable",
    "no route to host",
];

/// Broad category of a failed contract call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallErrorKind {
    /// The node executed the call and the contract reverted
    Revert,
    /// The request never got a usable answer from the node
    Network,
    Unknown,
}

/// A failed read against the lock contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?} contract call error: {message}")]
pub struct ContractCallError {
    pub kind: CallErrorKind,
    pub message: String,
}

impl ContractCallError {
    pub fn new(kind: CallErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build an error from raw text, deriving the kind from its content
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify(&message),
            message,
        }
    }

    /// User-facing text for a failed primary check
    pub fn diagnostic(&self) -> String {
        match self.kind {
            CallErrorKind::Revert => REVERT_DIAGNOSTIC.to_string(),
            CallErrorKind::Network => NETWORK_DIAGNOSTIC.to_string(),
            CallErrorKind::Unknown => unclassified_diagnostic(&self.message),
        }
    }
}

/// Categorize an error message. Revert wins over network when both match.
pub fn classify(message: &str) -> CallErrorKind {
    let lowered = message.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .collect();

    if contains_any(&words, &REVERT_PHRASES) {
        CallErrorKind::Revert
    } else if contains_any(&words, &NETWORK_PHRASES) {
        CallErrorKind::Network
    } else {
        CallErrorKind::Unknown
    }
}

fn contains_any(words: &[&str], phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| {
        let phrase: Vec<&str> = phrase.split(' ').collect();
        words.windows(phrase.len()).any(|window| window == phrase.as_slice())
    })
}

/// `"Error: <message>"`, or `"Unknown error"` when there is nothing to show
pub fn unclassified_diagnostic(message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        UNKNOWN_ERROR_DIAGNOSTIC.to_string()
    } else {
        format!("Error: {}", message)
    }
}
