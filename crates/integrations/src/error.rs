//! Error type shared by all integration clients.

use thiserror::Error;

/// Errors returned by CRM and mailbox collaborators.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Integration not connected: {0}")]
    NotConnected(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
