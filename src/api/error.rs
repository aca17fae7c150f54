//! Error types for the marketplace API client.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised by [`super::FluenceClient`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ApiError {
    /// Raised when the client is constructed with unusable settings.
    #[error("invalid client configuration: {0}")]
    Config(String),
    /// Raised when the request never produced an HTTP response.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Fully qualified request URL.
        url: String,
        /// Message reported by the HTTP stack.
        message: String,
    },
    /// Raised when the API answers with a non-success status code.
    #[error("API request failed with status {status}: {message}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// Human readable explanation, including any server supplied details.
        message: String,
    },
    /// Raised when a success response cannot be decoded.
    #[error("failed to decode response from {url}: {message}")]
    Decode {
        /// Fully qualified request URL.
        url: String,
        /// Parser error message.
        message: String,
    },
    /// Raised when a VM id is absent from the account's VM list.
    #[error("VM with ID {vm_id} not found in the list of VMs")]
    VmNotFound {
        /// Identifier requested by the caller.
        vm_id: String,
    },
}

impl ApiError {
    /// Builds a [`ApiError::Status`] for the given response.
    #[must_use]
    pub fn from_status(status: StatusCode, method: &str, url: &str, details: Option<&str>) -> Self {
        let mut message = format!("{} for {method} {url}", status_hint(status));
        if let Some(extra) = details.filter(|text| !text.trim().is_empty()) {
            message.push_str(" - Details: ");
            message.push_str(extra.trim());
        }
        Self::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// Returns the HTTP status code carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error describes a missing resource.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::VmNotFound { .. } | Self::Status { status: 404, .. }
        )
    }
}

fn status_hint(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or("Unknown");
    let hint = match status.as_u16() {
        400 | 422 => "the API rejected the request as invalid",
        401 => "authentication failed; check FLUENCE_API_KEY",
        403 => "this API key is not permitted to perform the operation",
        404 => "the requested resource does not exist",
        429 => "the API is rate limiting this client",
        code if code >= 500 => "the API reported an internal error",
        _ => "unexpected response",
    };
    format!("{} {reason} ({hint})", status.as_u16())
}
