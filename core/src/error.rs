//! Error types for the branch API client and store.
//!
//! # Design
//! `ApiError` follows the three failure classes a round trip can hit:
//! the transport itself, a non-2xx status, or a body that does not decode.
//! The HTTP variant renders as `HTTP <status> <status text>` so the message
//! can be shown to the user as-is.
//!
//! `StoreError` is deliberately coarse. Update operations collapse every
//! cause into one fixed message; the underlying `ApiError` is still reachable
//! through `std::error::Error::source`.

use thiserror::Error;

/// Errors produced while building, executing or parsing an API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, TLS, reset...).
    #[error("{0}")]
    Network(String),

    /// The server answered with a status outside 200..=299.
    #[error("HTTP {status} {status_text}")]
    Http { status: u16, status_text: String },

    /// A JSON-declared response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request payload could not be encoded.
    #[error("failed to encode request: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Status code for `Http` errors, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors returned by the mutating `BranchStore` operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to update branch reservation status")]
    UpdateReservationStatus(#[source] ApiError),

    #[error("Failed to update branch")]
    UpdateBranch(#[source] ApiError),
}
