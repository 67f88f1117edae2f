use std::time::Duration;

use statusbundle_activator::ActivatorError;
use thiserror::Error;

/// Errors that can occur in this crate.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// Already active.
    #[error("already active")]
    AlreadyActive,

    /// The activation cycle closed while waiting for a service.
    #[error("activation cycle closed while waiting for {0}")]
    Cancelled(&'static str),

    /// A framework query failed.
    #[error("framework error: {0}")]
    Framework(String),

    /// A mandatory service was not registered in time.
    #[error("{service} unavailable after {timeout:?}")]
    ServiceUnavailable {
        /// The service that was looked up.
        service: &'static str,

        /// How long the lookup waited.
        timeout: Duration,
    },

    /// Listener registration or removal failed.
    #[error("subscription error: {0}")]
    Subscription(String),

    /// Report assembly panicked.
    #[error("unexpected failure while rendering report: {0}")]
    UnexpectedRenderFailure(String),
}

impl ActivatorError for Error {}
