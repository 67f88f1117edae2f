//! End-to-end tests for the startup reporter against the in-memory framework.

use std::time::Duration;

use statusbundle_activator::Activator;
use statusbundle_framework::{FrameworkEvent, Module, ModuleId, ModuleState};
use statusbundle_framework_memory::{
    MemoryConfigurationRegistry, MemoryFramework, MemorySink, MemoryTierService,
};
use statusbundle_reporter::{
    ReporterConfig, ReporterState, StartupReporter, StartupReporterOptions,
};

const OVERALL_PREFIX: &str = "Framework start level:";

fn new_reporter(
    framework: &MemoryFramework,
) -> (StartupReporter<MemoryFramework, MemorySink>, MemorySink) {
    let sink = MemorySink::new();
    let reporter = StartupReporter::new(StartupReporterOptions {
        config: ReporterConfig::default(),
        framework: framework.clone(),
        sink: sink.clone(),
    });

    (reporter, sink)
}

fn report_count(sink: &MemorySink) -> usize {
    sink.lines()
        .iter()
        .filter(|line| line.starts_with(OVERALL_PREFIX))
        .count()
}

/// Framework holding `core` and `ext`, with both services registered.
fn two_module_framework() -> MemoryFramework {
    let framework = MemoryFramework::new();
    framework.install(Module::new(1u64, "core", ModuleState::Active));
    framework.install(Module::new(2u64, "ext", ModuleState::Installed));

    framework.register_tier_service(
        MemoryTierService::new(3)
            .with_tier(ModuleId::ROOT, 0)
            .with_tier(1u64, 0)
            .with_tier(2u64, 3),
    );
    framework.register_configuration_registry(MemoryConfigurationRegistry::empty());

    framework
}

#[tokio::test]
async fn test_report_after_started_event() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let framework = two_module_framework();
    let (reporter, sink) = new_reporter(&framework);

    reporter.activate().await.expect("Failed to activate reporter");
    assert!(sink.lines().is_empty());

    framework.finish_startup().await;

    assert_eq!(
        sink.lines(),
        vec![
            "Framework start level: 3",
            "Module 0 system.module:ACTIVE (start level 0)",
            "Module 1 core:ACTIVE (start level 0)",
            "Module 2 ext:INSTALLED (start level 3)",
        ]
    );
}

#[tokio::test]
async fn test_report_when_already_started() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let framework = two_module_framework();
    framework
        .set_state(ModuleId::ROOT, ModuleState::Active)
        .expect("Root module missing");
    framework.register_configuration_registry(MemoryConfigurationRegistry::with_records([
        "org.example.core",
    ]));
    let (reporter, sink) = new_reporter(&framework);

    reporter.activate().await.expect("Failed to activate reporter");

    // The notification for the same startup arrives late
    framework.publish(FrameworkEvent::started()).await;

    assert_eq!(report_count(&sink), 1);
    assert_eq!(
        sink.lines().last().map(String::as_str),
        Some("Configuration PID: org.example.core")
    );
    assert_eq!(reporter.state(), ReporterState::Reported);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_triggers_report_once() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    for round in 0..25 {
        let framework = two_module_framework();
        let (reporter, sink) = new_reporter(&framework);
        reporter.activate().await.expect("Failed to activate reporter");

        framework
            .set_state(ModuleId::ROOT, ModuleState::Active)
            .expect("Root module missing");

        let mut handles = Vec::new();
        for i in 0..8 {
            let reporter = reporter.clone();
            let framework = framework.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    reporter.check_started().await;
                } else {
                    framework.publish(FrameworkEvent::started()).await;
                }
            }));
        }

        for handle in handles {
            handle.await.expect("Trigger task panicked");
        }

        assert_eq!(report_count(&sink), 1, "round {round} reported more than once");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_activation_racing_started_event() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    for _ in 0..25 {
        let framework = two_module_framework();
        let (reporter, sink) = new_reporter(&framework);

        let activation = {
            let reporter = reporter.clone();
            tokio::spawn(async move { reporter.activate().await })
        };
        let startup = {
            let framework = framework.clone();
            tokio::spawn(async move { framework.finish_startup().await })
        };

        activation
            .await
            .expect("Activation task panicked")
            .expect("Failed to activate reporter");
        startup.await.expect("Startup task panicked");

        // Root is active by now, so whichever path lost still leaves exactly one report
        reporter.check_started().await;

        assert_eq!(report_count(&sink), 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_signals_spanning_reactivation_leave_one_report_per_cycle() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    for round in 0..25 {
        let framework = two_module_framework();
        framework
            .set_state(ModuleId::ROOT, ModuleState::Active)
            .expect("Root module missing");
        let (reporter, sink) = new_reporter(&framework);

        reporter.activate().await.expect("Failed to activate reporter");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let reporter = reporter.clone();
            handles.push(tokio::spawn(async move {
                reporter.check_started().await;
            }));
        }

        reporter.deactivate().await.expect("Failed to deactivate reporter");
        reporter.activate().await.expect("Failed to reactivate reporter");

        for handle in handles {
            handle.await.expect("Signal task panicked");
        }

        assert_eq!(report_count(&sink), 2, "round {round} lost or repeated a report");
        assert_eq!(reporter.state(), ReporterState::Reported);
    }
}

#[tokio::test]
async fn test_reactivation_reports_again() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let tiers = MemoryTierService::new(3);
    let framework = two_module_framework();
    framework.register_tier_service(tiers.clone());
    let (reporter, sink) = new_reporter(&framework);

    reporter.activate().await.expect("Failed to activate reporter");
    framework.finish_startup().await;
    assert_eq!(report_count(&sink), 1);

    reporter.deactivate().await.expect("Failed to deactivate reporter");
    assert_eq!(framework.listener_count(), 0);

    // Framework restarts at a higher start level while the reporter is inactive
    framework
        .set_state(ModuleId::ROOT, ModuleState::Starting)
        .expect("Root module missing");
    tiers.set_overall(5);

    reporter.activate().await.expect("Failed to reactivate reporter");
    assert_eq!(report_count(&sink), 1);

    framework.finish_startup().await;
    framework.publish(FrameworkEvent::started()).await;

    assert_eq!(report_count(&sink), 2);
    assert!(sink.lines().contains(&"Framework start level: 5".to_string()));
}

#[tokio::test]
async fn test_late_tier_service_within_bound() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let framework = MemoryFramework::new();
    framework
        .set_state(ModuleId::ROOT, ModuleState::Active)
        .expect("Root module missing");
    let (reporter, sink) = new_reporter(&framework);

    let registration = {
        let framework = framework.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            framework.register_tier_service(MemoryTierService::new(4));
        })
    };

    reporter.activate().await.expect("Failed to activate reporter");
    registration.await.expect("Registration task panicked");

    assert_eq!(
        sink.lines().first().map(String::as_str),
        Some("Framework start level: 4")
    );
}
