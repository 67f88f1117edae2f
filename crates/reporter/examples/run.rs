use statusbundle_activator::Activator;
use statusbundle_framework::{Module, ModuleState};
use statusbundle_framework_memory::{
    MemoryConfigurationRegistry, MemoryFramework, MemoryTierService,
};
use statusbundle_reporter::{ReporterConfig, StartupReporter, StartupReporterOptions, StdoutSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let framework = MemoryFramework::new();
    framework.install(Module::new(1u64, "org.example.core", ModuleState::Active));
    framework.install(Module::new(2u64, "org.example.web", ModuleState::Resolved));
    framework.install(Module::new(3u64, "org.example.legacy", ModuleState::from_raw(0x40)));

    let reporter = StartupReporter::new(StartupReporterOptions {
        config: ReporterConfig::default(),
        framework: framework.clone(),
        sink: StdoutSink,
    });
    reporter.activate().await?;

    framework.register_tier_service(
        MemoryTierService::new(3)
            .with_tier(1u64, 1)
            .with_tier(2u64, 2)
            .with_tier(3u64, 3),
    );
    framework.register_configuration_registry(MemoryConfigurationRegistry::with_records([
        "org.example.web.http",
        "org.example.core.logging",
    ]));

    framework.finish_startup().await;

    reporter.deactivate().await?;

    Ok(())
}
