//! Abstract interface to the host component framework.
//!
//! This crate provides:
//! - Module identity and lifecycle state types
//! - Lifecycle notification types and the listener trait
//! - The `Framework` trait covering the module registry, listener
//!   registration and service lookups
//! - Traits for the start level service, the configuration registry and
//!   the output sink
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod event;
mod module;

pub use event::{FrameworkEvent, FrameworkEventKind, FrameworkListener, ListenerId};
pub use module::{Module, ModuleId, ModuleState};

use std::error::Error;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Marker trait for framework errors
pub trait FrameworkError: Debug + Error + Send + Sync + 'static {}

/// Persistent identity of one configuration record.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRecordRef {
    /// The persistent identity of the record.
    pub pid: String,
}

impl ConfigurationRecordRef {
    /// Create a new record reference.
    pub fn new(pid: impl Into<String>) -> Self {
        Self { pid: pid.into() }
    }
}

/// Service assigning start levels (startup tiers) to modules.
#[async_trait]
pub trait TierService: Send + Sync + 'static {
    /// The error type for tier queries.
    type Error: FrameworkError;

    /// The start level the framework is currently at.
    async fn overall_tier(&self) -> Result<u32, Self::Error>;

    /// The start level assigned to a module.
    async fn tier_of(&self, module: ModuleId) -> Result<u32, Self::Error>;
}

/// Optional service holding persisted configuration records.
#[async_trait]
pub trait ConfigurationRegistry: Send + Sync + 'static {
    /// The error type for registry queries.
    type Error: FrameworkError;

    /// List all configuration records.
    ///
    /// Returns `Ok(None)` when the underlying store has nothing to report.
    async fn list_records(&self) -> Result<Option<Vec<ConfigurationRecordRef>>, Self::Error>;
}

/// Append-only, ordered destination for report lines.
pub trait OutputSink: Send + Sync + 'static {
    /// Emit one line.
    fn emit_line(&self, line: &str);
}

impl<T: OutputSink + ?Sized> OutputSink for Arc<T> {
    fn emit_line(&self, line: &str) {
        (**self).emit_line(line);
    }
}

/// A handle onto the running host framework.
///
/// Combines listener registration, the module registry and service lookup.
#[async_trait]
pub trait Framework
where
    Self: Clone + Send + Sync + 'static,
{
    /// The error type for framework operations.
    type Error: FrameworkError;

    /// The start level service type.
    type TierService: TierService;

    /// The configuration registry type.
    type ConfigurationRegistry: ConfigurationRegistry;

    /// Register a listener for lifecycle notifications.
    async fn add_listener(
        &self,
        listener: Arc<dyn FrameworkListener>,
    ) -> Result<ListenerId, Self::Error>;

    /// Remove a previously registered listener.
    async fn remove_listener(&self, listener: ListenerId) -> Result<(), Self::Error>;

    /// List all installed modules in registry iteration order.
    async fn modules(&self) -> Result<Vec<Module>, Self::Error>;

    /// The lifecycle state of the framework root module.
    async fn root_module_state(&self) -> Result<ModuleState, Self::Error>;

    /// Wait until a start level service is registered and return it.
    ///
    /// This may never complete; callers bound it with their own timeout.
    async fn wait_for_tier_service(&self) -> Self::TierService;

    /// Wait until a configuration registry is registered and return it.
    ///
    /// This may never complete; callers bound it with their own timeout.
    async fn wait_for_configuration_registry(&self) -> Self::ConfigurationRegistry;
}
