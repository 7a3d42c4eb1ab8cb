//! Error types for the resource client.
//!
//! # Design
//! The variants follow the two failure sources a request can hit: the
//! transport (bad URL, timeout, network, non-2xx status) and the response
//! body (envelope or value decoding). Operations never return `ApiError`
//! directly; they pass it through the resource's error mapping first.

use thiserror::Error;

/// Failures produced while sending a request or decoding its response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request URL could not be parsed by the transport.
    #[error("invalid url: {0}")]
    BadUrl(String),

    /// The transport gave up waiting for a response.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure (DNS, refused, reset, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// The response body did not match the envelope or the value decoder.
    #[error("unexpected response body: {0}")]
    BadBody(String),

    /// The request payload could not be encoded to JSON.
    #[error("request encoding failed: {0}")]
    Encode(String),
}

impl ApiError {
    /// Status code carried by a `BadStatus` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
