//! In-memory start level service, configuration registry and output sink.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use statusbundle_framework::{
    ConfigurationRecordRef, ConfigurationRegistry, ModuleId, OutputSink, TierService,
};

use crate::Error;

/// Start level assigned to modules with no explicit assignment.
pub const DEFAULT_MODULE_TIER: u32 = 1;

#[derive(Debug, Default)]
struct TierTable {
    overall: u32,
    assigned: HashMap<ModuleId, u32>,
    failure: Option<String>,
}

/// In-memory start level service.
#[derive(Clone, Debug, Default)]
pub struct MemoryTierService {
    table: Arc<RwLock<TierTable>>,
}

impl MemoryTierService {
    /// Creates a new service at the given overall start level.
    #[must_use]
    pub fn new(overall: u32) -> Self {
        Self {
            table: Arc::new(RwLock::new(TierTable {
                overall,
                ..TierTable::default()
            })),
        }
    }

    /// Assigns a start level to a module.
    #[must_use]
    pub fn with_tier(self, module: impl Into<ModuleId>, tier: u32) -> Self {
        self.assign(module, tier);
        self
    }

    /// Assigns a start level to a module.
    pub fn assign(&self, module: impl Into<ModuleId>, tier: u32) {
        self.table.write().assigned.insert(module.into(), tier);
    }

    /// Changes the overall start level.
    pub fn set_overall(&self, overall: u32) {
        self.table.write().overall = overall;
    }

    /// Makes every subsequent query fail with the given message, or succeed again with `None`.
    pub fn set_failure(&self, failure: Option<String>) {
        self.table.write().failure = failure;
    }

    fn check(&self) -> Result<(), Error> {
        self.table
            .read()
            .failure
            .clone()
            .map_or(Ok(()), |message| Err(Error::Query(message)))
    }
}

#[async_trait]
impl TierService for MemoryTierService {
    type Error = Error;

    async fn overall_tier(&self) -> Result<u32, Self::Error> {
        self.check()?;

        Ok(self.table.read().overall)
    }

    async fn tier_of(&self, module: ModuleId) -> Result<u32, Self::Error> {
        self.check()?;

        Ok(self
            .table
            .read()
            .assigned
            .get(&module)
            .copied()
            .unwrap_or(DEFAULT_MODULE_TIER))
    }
}

/// In-memory configuration registry.
#[derive(Clone, Debug)]
pub struct MemoryConfigurationRegistry {
    records: Arc<RwLock<Option<Vec<ConfigurationRecordRef>>>>,
}

impl MemoryConfigurationRegistry {
    /// Creates a registry holding no records.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            records: Arc::new(RwLock::new(Some(Vec::new()))),
        }
    }

    /// Creates a registry holding the given record ids, in order.
    pub fn with_records<I, S>(pids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records = pids.into_iter().map(ConfigurationRecordRef::new).collect();

        Self {
            records: Arc::new(RwLock::new(Some(records))),
        }
    }

    /// Creates a registry whose backing store answers listings with nothing at all.
    #[must_use]
    pub fn returning_nothing() -> Self {
        Self {
            records: Arc::new(RwLock::new(None)),
        }
    }

    /// Adds a record.
    pub fn add(&self, pid: impl Into<String>) {
        self.records
            .write()
            .get_or_insert_with(Vec::new)
            .push(ConfigurationRecordRef::new(pid));
    }
}

impl Default for MemoryConfigurationRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl ConfigurationRegistry for MemoryConfigurationRegistry {
    type Error = Error;

    async fn list_records(&self) -> Result<Option<Vec<ConfigurationRecordRef>>, Self::Error> {
        Ok(self.records.read().clone())
    }
}

/// Output sink capturing every emitted line.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Creates a new, empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines emitted so far, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl OutputSink for MemorySink {
    fn emit_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
