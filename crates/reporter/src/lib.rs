//! Reports module, start level and configuration status once the host framework has started.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod config;
mod error;
mod format;
mod reporter;
mod snapshot;
mod stdout;

pub use config::ReporterConfig;
pub use error::Error;
pub use format::StatusFormatter;
pub use reporter::{ReporterState, StartupReporter, StartupReporterOptions};
pub use snapshot::{FrameworkSnapshot, ModuleSnapshot};
pub use stdout::StdoutSink;
