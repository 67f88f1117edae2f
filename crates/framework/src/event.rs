//! Framework lifecycle notifications.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The kind of a framework lifecycle notification.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum FrameworkEventKind {
    /// The framework finished starting all modules up to its start level.
    Started,

    /// The framework start level changed.
    StartLevelChanged,

    /// A module reported an error.
    Error,

    /// A module reported a warning.
    Warning,

    /// A module reported an informational message.
    Info,

    /// The framework stopped.
    Stopped,
}

/// A framework lifecycle notification.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FrameworkEvent {
    /// What happened.
    pub kind: FrameworkEventKind,
}

impl FrameworkEvent {
    /// Create a new event of the given kind.
    #[must_use]
    pub const fn new(kind: FrameworkEventKind) -> Self {
        Self { kind }
    }

    /// Shorthand for a `Started` event.
    #[must_use]
    pub const fn started() -> Self {
        Self::new(FrameworkEventKind::Started)
    }
}

/// Handle identifying a registered listener.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Create a listener id from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Receives framework lifecycle notifications.
///
/// Hosts may deliver notifications from any task, concurrently with other
/// calls into the listener's owner.
#[async_trait]
pub trait FrameworkListener: Send + Sync + 'static {
    /// Handle a notification.
    async fn framework_event(&self, event: FrameworkEvent);
}
