//! Error types for the two fallible collaborators: the transport and the capture device.
//!
//! Neither escapes the panel as a failure. Transport errors become a canned assistant
//! message, device errors become a one-shot notice.

use std::time::Duration;
use thiserror::Error;

/// Failure of one exchange with the remote endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {status}")]
    Status { status: u16 },

    /// No complete response within the configured bound.
    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    /// Connection, DNS or body read failure.
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built (bad URL, bad content type...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// The capture device could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceAccessError {
    #[error("permission to use the capture device was denied: {0}")]
    PermissionDenied(String),

    #[error("capture device unavailable: {0}")]
    Unavailable(String),

    #[error("capture device is already in use")]
    Busy,
}
