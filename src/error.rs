//! Error types for the synchronization layer.

use crate::types::SubscriptionId;
use thiserror::Error;

/// Main error type for subscription operations.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Query rejected for {id}: {reason}")]
    QueryRejected { id: SubscriptionId, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Subscription not active: {0}")]
    SubscriptionNotActive(SubscriptionId),

    #[error("Invalid subscription: {0}")]
    InvalidSubscription(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Serialization(e.to_string())
    }
}

/// Result type for subscription operations.
pub type Result<T> = std::result::Result<T, SyncError>;
