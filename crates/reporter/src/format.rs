//! Rendering of framework status into report lines.

use statusbundle_framework::ConfigurationRecordRef;

use crate::ModuleSnapshot;

/// Stateless renderer for report lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusFormatter;

impl StatusFormatter {
    /// Render the framework's overall start level.
    #[must_use]
    pub fn format_overall_level(tier: u32) -> String {
        format!("Framework start level: {tier}")
    }

    /// Render one module with its state and start level.
    #[must_use]
    pub fn format_module(module: &ModuleSnapshot) -> String {
        format!(
            "Module {} {}:{} (start level {})",
            module.id,
            module.symbolic_name,
            module.state.name(),
            module.tier
        )
    }

    /// Render one configuration record.
    #[must_use]
    pub fn format_configuration(record: &ConfigurationRecordRef) -> String {
        format!("Configuration PID: {}", record.pid)
    }
}
