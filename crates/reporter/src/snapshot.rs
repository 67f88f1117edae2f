//! Point-in-time view of the framework, gathered for one report.

use statusbundle_framework::{ConfigurationRecordRef, Module, ModuleId, ModuleState};

use crate::StatusFormatter;

/// A module together with its assigned start level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleSnapshot {
    /// The module id.
    pub id: ModuleId,

    /// The symbolic name of the module.
    pub symbolic_name: String,

    /// The lifecycle state at the time of the report.
    pub state: ModuleState,

    /// The assigned start level.
    pub tier: u32,
}

impl ModuleSnapshot {
    /// Combine a registry entry with its start level.
    #[must_use]
    pub fn new(module: Module, tier: u32) -> Self {
        Self {
            id: module.id,
            symbolic_name: module.symbolic_name,
            state: module.state,
            tier,
        }
    }
}

/// Everything one report shows.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrameworkSnapshot {
    /// The framework's overall start level.
    pub overall_tier: u32,

    /// Modules in registry iteration order.
    pub modules: Vec<ModuleSnapshot>,

    /// Configuration records; `None` when there is nothing to show.
    pub configurations: Option<Vec<ConfigurationRecordRef>>,
}

impl FrameworkSnapshot {
    /// Render the report lines in output order.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(1 + self.modules.len());

        lines.push(StatusFormatter::format_overall_level(self.overall_tier));
        lines.extend(self.modules.iter().map(StatusFormatter::format_module));

        if let Some(configurations) = &self.configurations {
            lines.extend(configurations.iter().map(StatusFormatter::format_configuration));
        }

        lines
    }
}
