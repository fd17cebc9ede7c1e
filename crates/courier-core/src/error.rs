//! Error types for API access and kernel operations.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by an [`ApiClient`](crate::ApiClient) or [`GrantStore`](crate::GrantStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The requested record does not exist.
    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },

    /// Credentials for the active grant were rejected.
    #[error("Unauthorized for grant {grant}")]
    Unauthorized { grant: String },

    /// The remote API asked us to slow down.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Transport-level failure.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The operation is not supported for this resource.
    #[error("{operation} is not supported for {resource}")]
    Unsupported { operation: String, resource: String },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl ApiError {
    /// Create an error with a free-form message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the kernel to the status line.
///
/// None of these are fatal; the dispatcher turns every one of them into a flash.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KernelError {
    /// A grant switch was requested but no grant store is configured.
    #[error("Grant switching is unavailable: no grant store is configured")]
    NoGrantStore,

    /// The grant store refused to change the default grant.
    #[error("Failed to switch grant to {grant}: {source}")]
    GrantStore {
        grant: String,
        #[source]
        source: ApiError,
    },

    /// An action needs a selected item but nothing is selected.
    #[error("Nothing selected to {action}")]
    NoSelection { action: String },

    /// The API call itself failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The worker did not finish within its deadline.
    #[error("{operation} timed out after {}s", after.as_secs())]
    Timeout { operation: String, after: Duration },

    /// The worker thread died before producing a result.
    #[error("Worker failed: {message}")]
    Worker { message: String },
}

impl KernelError {
    /// Create a missing-selection error for the named action.
    pub fn no_selection(action: impl Into<String>) -> Self {
        Self::NoSelection {
            action: action.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_converts_into_kernel_error() {
        let err: KernelError = ApiError::other("boom").into();
        assert!(matches!(err, KernelError::Api(ApiError::Other { .. })));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_timeout_message() {
        let err = KernelError::Timeout {
            operation: "load messages".into(),
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "load messages timed out after 30s");
    }

    #[test]
    fn test_no_grant_store_is_descriptive() {
        let message = KernelError::NoGrantStore.to_string();
        assert!(message.contains("no grant store"));
    }
}
