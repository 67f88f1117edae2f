//! In-memory (single process) implementation of the host framework for local development.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod services;

pub use error::Error;
pub use services::{
    DEFAULT_MODULE_TIER, MemoryConfigurationRegistry, MemorySink, MemoryTierService,
};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use statusbundle_framework::{
    Framework, FrameworkEvent, FrameworkListener, ListenerId, Module, ModuleId, ModuleState,
};
use tokio::sync::watch;
use tracing::debug;

/// Symbolic name of the root module installed by `MemoryFramework::new`.
pub const ROOT_MODULE_NAME: &str = "system.module";

/// In-memory host framework.
///
/// Holds a module table, registered listeners and one slot per service. Service
/// lookups wait until the corresponding slot is filled.
#[derive(Clone)]
pub struct MemoryFramework {
    modules: Arc<RwLock<Vec<Module>>>,
    listeners: Arc<Mutex<BTreeMap<ListenerId, Arc<dyn FrameworkListener>>>>,
    next_listener: Arc<AtomicU64>,
    reject_listeners: Arc<AtomicBool>,
    tier_service: Arc<watch::Sender<Option<MemoryTierService>>>,
    configuration_registry: Arc<watch::Sender<Option<MemoryConfigurationRegistry>>>,
}

impl MemoryFramework {
    /// Creates a new framework holding only the root module, in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let root = Module::new(ModuleId::ROOT, ROOT_MODULE_NAME, ModuleState::Starting);

        Self {
            modules: Arc::new(RwLock::new(vec![root])),
            listeners: Arc::new(Mutex::new(BTreeMap::new())),
            next_listener: Arc::new(AtomicU64::new(1)),
            reject_listeners: Arc::new(AtomicBool::new(false)),
            tier_service: Arc::new(watch::Sender::new(None)),
            configuration_registry: Arc::new(watch::Sender::new(None)),
        }
    }

    /// Installs a module, replacing any module with the same id in place.
    pub fn install(&self, module: Module) {
        let mut modules = self.modules.write();

        match modules.iter_mut().find(|existing| existing.id == module.id) {
            Some(existing) => *existing = module,
            None => modules.push(module),
        }
    }

    /// Changes the lifecycle state of an installed module.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownModule` if no module has the given id.
    pub fn set_state(&self, id: impl Into<ModuleId>, state: ModuleState) -> Result<(), Error> {
        let id = id.into();
        let mut modules = self.modules.write();

        let module = modules
            .iter_mut()
            .find(|module| module.id == id)
            .ok_or(Error::UnknownModule(id))?;
        module.state = state;

        Ok(())
    }

    /// Registers the start level service, waking any pending lookups.
    pub fn register_tier_service(&self, service: MemoryTierService) {
        self.tier_service.send_replace(Some(service));
    }

    /// Removes the start level service.
    pub fn unregister_tier_service(&self) {
        self.tier_service.send_replace(None);
    }

    /// Registers the configuration registry, waking any pending lookups.
    pub fn register_configuration_registry(&self, registry: MemoryConfigurationRegistry) {
        self.configuration_registry.send_replace(Some(registry));
    }

    /// Removes the configuration registry.
    pub fn unregister_configuration_registry(&self) {
        self.configuration_registry.send_replace(None);
    }

    /// Makes listener registration fail while `reject` is set.
    pub fn set_subscription_failure(&self, reject: bool) {
        self.reject_listeners.store(reject, Ordering::SeqCst);
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Delivers an event to every registered listener, in registration order.
    pub async fn publish(&self, event: FrameworkEvent) {
        let listeners: Vec<_> = self.listeners.lock().values().cloned().collect();

        debug!(kind = ?event.kind, listeners = listeners.len(), "publishing framework event");

        for listener in listeners {
            listener.framework_event(event.clone()).await;
        }
    }

    /// Marks the root module active and publishes a `Started` event.
    pub async fn finish_startup(&self) {
        if let Err(e) = self.set_state(ModuleId::ROOT, ModuleState::Active) {
            debug!("root module missing at startup: {}", e);
        }

        self.publish(FrameworkEvent::started()).await;
    }
}

impl Default for MemoryFramework {
    fn default() -> Self {
        Self::new()
    }
}

async fn wait_for_slot<T: Clone + Send + Sync>(slot: &watch::Sender<Option<T>>) -> T {
    let mut rx = slot.subscribe();

    let found = rx
        .wait_for(Option::is_some)
        .await
        .ok()
        .and_then(|value| (*value).clone());

    match found {
        Some(value) => value,
        None => std::future::pending().await,
    }
}

#[async_trait]
impl Framework for MemoryFramework {
    type Error = Error;
    type TierService = MemoryTierService;
    type ConfigurationRegistry = MemoryConfigurationRegistry;

    async fn add_listener(
        &self,
        listener: Arc<dyn FrameworkListener>,
    ) -> Result<ListenerId, Self::Error> {
        if self.reject_listeners.load(Ordering::SeqCst) {
            return Err(Error::SubscriptionRejected);
        }

        let id = ListenerId::new(self.next_listener.fetch_add(1, Ordering::SeqCst));
        self.listeners.lock().insert(id, listener);

        Ok(id)
    }

    async fn remove_listener(&self, listener: ListenerId) -> Result<(), Self::Error> {
        self.listeners
            .lock()
            .remove(&listener)
            .map(|_| ())
            .ok_or(Error::UnknownListener(listener))
    }

    async fn modules(&self) -> Result<Vec<Module>, Self::Error> {
        Ok(self.modules.read().clone())
    }

    async fn root_module_state(&self) -> Result<ModuleState, Self::Error> {
        self.modules
            .read()
            .iter()
            .find(|module| module.id == ModuleId::ROOT)
            .map(|module| module.state)
            .ok_or(Error::UnknownModule(ModuleId::ROOT))
    }

    async fn wait_for_tier_service(&self) -> Self::TierService {
        wait_for_slot(&self.tier_service).await
    }

    async fn wait_for_configuration_registry(&self) -> Self::ConfigurationRegistry {
        wait_for_slot(&self.configuration_registry).await
    }
}
