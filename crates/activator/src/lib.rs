//! Abstract interface for components activated and deactivated by a host framework.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::error::Error;
use std::fmt::Debug;

use async_trait::async_trait;

/// Marker trait for `Activator` errors
pub trait ActivatorError: Debug + Error + Send + Sync + 'static {}

/// Trait for components whose lifecycle is driven by the host framework.
///
/// A component may be activated and deactivated any number of times. Each
/// `activate` / `deactivate` pair forms one activation cycle.
#[async_trait]
pub trait Activator
where
    Self: Send + Sync + 'static,
{
    /// The error type for lifecycle operations.
    type Error: ActivatorError;

    /// Get the name of the component.
    fn name(&self) -> &str;

    /// Activate the component, opening a new activation cycle.
    async fn activate(&self) -> Result<(), Self::Error>;

    /// Deactivate the component, closing the current activation cycle.
    async fn deactivate(&self) -> Result<(), Self::Error>;
}
