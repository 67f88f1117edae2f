use statusbundle_framework::{FrameworkError, ListenerId, ModuleId};
use thiserror::Error;

/// Errors that can occur in this crate.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// Listener registration was refused.
    #[error("listener registration rejected")]
    SubscriptionRejected,

    /// No listener is registered under the given id.
    #[error("unknown listener: {0}")]
    UnknownListener(ListenerId),

    /// No module is installed under the given id.
    #[error("unknown module: {0}")]
    UnknownModule(ModuleId),

    /// A service query was configured to fail.
    #[error("query failed: {0}")]
    Query(String),
}

impl FrameworkError for Error {}
