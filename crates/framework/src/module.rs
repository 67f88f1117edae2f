//! Module identity and lifecycle state types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a module, unique and stable for the module's lifetime.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct ModuleId(u64);

impl ModuleId {
    /// The framework root module.
    pub const ROOT: Self = Self(0);

    /// Create a module id from its raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl From<u64> for ModuleId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a module.
///
/// Hosts report states as raw codes. Codes outside the known set are kept as
/// `Unknown` so newer hosts can add states without breaking readers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum ModuleState {
    /// The module has been removed from the framework.
    Uninstalled,

    /// The module is installed but its dependencies are not resolved.
    Installed,

    /// The module's dependencies are resolved; it is ready to start.
    Resolved,

    /// The module is being started.
    Starting,

    /// The module is being stopped.
    Stopping,

    /// The module is running.
    Active,

    /// A state code this crate does not recognise.
    Unknown(u32),
}

impl ModuleState {
    const UNINSTALLED: u32 = 0x01;
    const INSTALLED: u32 = 0x02;
    const RESOLVED: u32 = 0x04;
    const STARTING: u32 = 0x08;
    const STOPPING: u32 = 0x10;
    const ACTIVE: u32 = 0x20;

    /// Decode a raw host state code.
    #[must_use]
    pub const fn from_raw(code: u32) -> Self {
        match code {
            Self::UNINSTALLED => Self::Uninstalled,
            Self::INSTALLED => Self::Installed,
            Self::RESOLVED => Self::Resolved,
            Self::STARTING => Self::Starting,
            Self::STOPPING => Self::Stopping,
            Self::ACTIVE => Self::Active,
            other => Self::Unknown(other),
        }
    }

    /// Encode as a raw host state code.
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Uninstalled => Self::UNINSTALLED,
            Self::Installed => Self::INSTALLED,
            Self::Resolved => Self::RESOLVED,
            Self::Starting => Self::STARTING,
            Self::Stopping => Self::STOPPING,
            Self::Active => Self::ACTIVE,
            Self::Unknown(code) => code,
        }
    }

    /// Display name of the state, `"unknown"` for unrecognised codes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uninstalled => "UNINSTALLED",
            Self::Installed => "INSTALLED",
            Self::Resolved => "RESOLVED",
            Self::Starting => "STARTING",
            Self::Stopping => "STOPPING",
            Self::Active => "ACTIVE",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A module as listed by the framework's module registry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// The module id.
    pub id: ModuleId,

    /// The symbolic name of the module.
    pub symbolic_name: String,

    /// The current lifecycle state.
    pub state: ModuleState,
}

impl Module {
    /// Create a new module entry.
    pub fn new(
        id: impl Into<ModuleId>,
        symbolic_name: impl Into<String>,
        state: ModuleState,
    ) -> Self {
        Self {
            id: id.into(),
            symbolic_name: symbolic_name.into(),
            state,
        }
    }
}
