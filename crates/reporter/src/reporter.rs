//! Detects framework startup and emits exactly one status report per activation cycle.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use statusbundle_activator::Activator;
use statusbundle_framework::{
    ConfigurationRecordRef, ConfigurationRegistry, Framework, FrameworkEvent, FrameworkEventKind,
    FrameworkListener, ListenerId, ModuleState, OutputSink, TierService,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::{Error, FrameworkSnapshot, ModuleSnapshot, ReporterConfig};

const TIER_SERVICE: &str = "start level service";
const CONFIGURATION_REGISTRY: &str = "configuration registry";

/// Options for the startup reporter.
pub struct StartupReporterOptions<F, S>
where
    F: Framework,
    S: OutputSink,
{
    /// Lookup timeouts.
    pub config: ReporterConfig,

    /// The host framework to observe.
    pub framework: F,

    /// Where report lines go.
    pub sink: S,
}

/// Where the reporter is in its activation cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReporterState {
    /// Not activated.
    Idle,

    /// Activated and waiting for the framework to finish starting.
    Subscribed,

    /// The report for this activation cycle has been claimed.
    Reported,
}

/// Bookkeeping for the open activation cycle.
#[derive(Default)]
struct Cycle {
    listener: Option<ListenerId>,
    token: Option<CancellationToken>,
}

struct Inner<F, S> {
    config: ReporterConfig,
    cycle: Mutex<Cycle>,
    framework: F,
    reported: AtomicBool,
    sink: S,
}

/// Reports framework status once the framework has started.
///
/// Startup can be observed two ways: the root module is already active when
/// the reporter activates, or a `Started` notification arrives afterwards. Both
/// may fire for the same startup, on different tasks; only the first one to
/// claim the report guard produces output.
pub struct StartupReporter<F, S>
where
    F: Framework,
    S: OutputSink,
{
    inner: Arc<Inner<F, S>>,
}

impl<F, S> Clone for StartupReporter<F, S>
where
    F: Framework,
    S: OutputSink,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F, S> StartupReporter<F, S>
where
    F: Framework,
    S: OutputSink,
{
    /// Create a new startup reporter.
    pub fn new(
        StartupReporterOptions {
            config,
            framework,
            sink,
        }: StartupReporterOptions<F, S>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                cycle: Mutex::new(Cycle::default()),
                framework,
                reported: AtomicBool::new(false),
                sink,
            }),
        }
    }

    /// Current position in the activation cycle.
    #[must_use]
    pub fn state(&self) -> ReporterState {
        let cycle = self.inner.cycle.lock();
        if cycle.token.is_none() {
            ReporterState::Idle
        } else if self.inner.reported.load(Ordering::SeqCst) {
            ReporterState::Reported
        } else {
            ReporterState::Subscribed
        }
    }

    /// Report if the framework root module is already active.
    pub async fn check_started(&self) {
        self.inner.check_started().await;
    }

    /// Handle a lifecycle notification. Only `Started` triggers a report.
    pub async fn on_lifecycle_event(&self, event: FrameworkEvent) {
        self.inner.on_lifecycle_event(event).await;
    }
}

#[async_trait]
impl<F, S> Activator for StartupReporter<F, S>
where
    F: Framework,
    S: OutputSink,
{
    type Error = Error;

    fn name(&self) -> &str {
        "startup-reporter"
    }

    /// Subscribes to lifecycle notifications, then reports immediately if the
    /// framework has already started.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyActive` if a cycle is open, or
    /// `Error::Subscription` if the listener cannot be registered.
    async fn activate(&self) -> Result<(), Error> {
        let token = {
            let mut cycle = self.inner.cycle.lock();
            if cycle.token.is_some() {
                return Err(Error::AlreadyActive);
            }

            self.inner.reported.store(false, Ordering::SeqCst);
            let token = CancellationToken::new();
            cycle.token = Some(token.clone());
            token
        };

        let listener = Arc::new(StartedListener {
            inner: Arc::downgrade(&self.inner),
        });

        match self.inner.framework.add_listener(listener).await {
            Ok(id) => {
                // A deactivate that ran during the subscription cancelled this cycle
                let closed = {
                    let mut cycle = self.inner.cycle.lock();
                    if token.is_cancelled() {
                        true
                    } else {
                        cycle.listener = Some(id);
                        false
                    }
                };

                if closed {
                    debug!("startup reporter deactivated while subscribing");
                    if let Err(e) = self.inner.framework.remove_listener(id).await {
                        warn!("failed to remove startup listener {}: {}", id, e);
                    }

                    return Ok(());
                }
            }
            Err(e) => {
                {
                    let mut cycle = self.inner.cycle.lock();
                    if !token.is_cancelled() {
                        cycle.token = None;
                    }
                }
                error!("failed to register startup listener: {}", e);

                return Err(Error::Subscription(e.to_string()));
            }
        }

        info!("startup reporter activated");

        self.inner.check_started().await;

        Ok(())
    }

    /// Unsubscribes and resets the report guard so the next activation reports again.
    async fn deactivate(&self) -> Result<(), Error> {
        let Cycle { listener, token } = {
            let mut cycle = self.inner.cycle.lock();
            self.inner.reported.store(false, Ordering::SeqCst);
            let closed = std::mem::take(&mut *cycle);
            if let Some(token) = &closed.token {
                token.cancel();
            }
            closed
        };

        if token.is_none() {
            debug!("startup reporter not active");
            return Ok(());
        }

        let result = match listener {
            Some(id) => self
                .inner
                .framework
                .remove_listener(id)
                .await
                .map_err(|e| Error::Subscription(e.to_string())),
            None => Ok(()),
        };

        match &result {
            Ok(()) => info!("startup reporter deactivated"),
            Err(e) => warn!("startup reporter deactivated with error: {}", e),
        }

        result
    }
}

impl<F, S> Inner<F, S>
where
    F: Framework,
    S: OutputSink,
{
    async fn check_started(&self) {
        match self.framework.root_module_state().await {
            Ok(ModuleState::Active) => {
                debug!("framework already started");
                self.try_report().await;
            }
            Ok(state) => debug!("framework not started yet (root module {})", state),
            Err(e) => warn!("failed to check root module state: {}", e),
        }
    }

    async fn on_lifecycle_event(&self, event: FrameworkEvent) {
        if event.kind == FrameworkEventKind::Started {
            self.try_report().await;
        } else {
            trace!("ignoring framework event {:?}", event.kind);
        }
    }

    async fn try_report(&self) {
        // The guard is claimed under the cycle lock so it always belongs to the token taken here
        let token = {
            let cycle = self.cycle.lock();
            let Some(token) = cycle.token.clone() else {
                drop(cycle);
                debug!("startup signal outside an activation cycle");
                return;
            };

            if self
                .reported
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_err()
            {
                drop(cycle);
                debug!("startup already reported");
                return;
            }

            token
        };

        let outcome = AssertUnwindSafe(self.report(&token))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(Error::UnexpectedRenderFailure(panic_message(&*panic))));

        match outcome {
            Ok(lines) => info!("startup status reported ({} lines)", lines),
            Err(Error::Cancelled(service)) => {
                info!("startup status report abandoned while waiting for {}", service);
            }
            Err(e) => error!("startup status report failed: {}", e),
        }
    }

    async fn report(&self, token: &CancellationToken) -> Result<usize, Error> {
        let snapshot = self.snapshot(token).await?;
        let lines = snapshot.render();

        for line in &lines {
            self.sink.emit_line(line);
        }

        Ok(lines.len())
    }

    async fn snapshot(&self, token: &CancellationToken) -> Result<FrameworkSnapshot, Error> {
        let tiers = bounded_lookup(
            token,
            TIER_SERVICE,
            self.config.tier_service_timeout,
            self.framework.wait_for_tier_service(),
        )
        .await?;

        let overall_tier = tiers
            .overall_tier()
            .await
            .map_err(|e| Error::Framework(e.to_string()))?;

        let registered = self
            .framework
            .modules()
            .await
            .map_err(|e| Error::Framework(e.to_string()))?;

        let mut modules = Vec::with_capacity(registered.len());
        for module in registered {
            let tier = tiers
                .tier_of(module.id)
                .await
                .map_err(|e| Error::Framework(e.to_string()))?;
            modules.push(ModuleSnapshot::new(module, tier));
        }

        let configurations = self.configurations(token).await?;

        Ok(FrameworkSnapshot {
            overall_tier,
            modules,
            configurations,
        })
    }

    async fn configurations(
        &self,
        token: &CancellationToken,
    ) -> Result<Option<Vec<ConfigurationRecordRef>>, Error> {
        let registry = match bounded_lookup(
            token,
            CONFIGURATION_REGISTRY,
            self.config.configuration_registry_timeout,
            self.framework.wait_for_configuration_registry(),
        )
        .await
        {
            Ok(registry) => registry,
            Err(Error::ServiceUnavailable { .. }) => {
                debug!("no configuration registry; skipping configurations");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let records = registry
            .list_records()
            .await
            .map_err(|e| Error::Framework(e.to_string()))?;

        Ok(records.filter(|records| !records.is_empty()))
    }
}

/// Waits for a service until it appears, the timeout elapses or the cycle closes.
async fn bounded_lookup<T>(
    token: &CancellationToken,
    service: &'static str,
    timeout: Duration,
    lookup: impl Future<Output = T> + Send,
) -> Result<T, Error> {
    tokio::select! {
        () = token.cancelled() => Err(Error::Cancelled(service)),
        found = tokio::time::timeout(timeout, lookup) => {
            found.map_err(|_| Error::ServiceUnavailable { service, timeout })
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Forwards notifications to the reporter without keeping it alive.
struct StartedListener<F, S> {
    inner: Weak<Inner<F, S>>,
}

#[async_trait]
impl<F, S> FrameworkListener for StartedListener<F, S>
where
    F: Framework,
    S: OutputSink,
{
    async fn framework_event(&self, event: FrameworkEvent) {
        if let Some(inner) = self.inner.upgrade() {
            inner.on_lifecycle_event(event).await;
        }
    }
}
