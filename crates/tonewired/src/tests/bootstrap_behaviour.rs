//! Bootstrap sequencing and health reporting.

use std::sync::Arc;

use rstest::rstest;

use crate::bootstrap::{BootstrapError, bootstrap_with};
use crate::dispatch::StreamFormat;
use tonewire_pcm::BitDepth;

use super::support::{FailingConfigLoader, HealthEvent, RecordingHealthReporter, TestConfigLoader};

#[rstest]
fn bootstrap_reports_start_and_success() {
    let loader = TestConfigLoader::new();
    let reporter = Arc::new(RecordingHealthReporter::default());

    let daemon = bootstrap_with(&loader, reporter.clone()).expect("bootstrap should succeed");

    assert_eq!(
        daemon.format(),
        StreamFormat {
            sample_rate_hz: 192_000,
            channels: 2,
            bit_depth: BitDepth::TwentyFour,
        }
    );
    assert_eq!(
        reporter.events(),
        vec![HealthEvent::BootstrapStarting, HealthEvent::BootstrapSucceeded]
    );
}

#[rstest]
fn configuration_failures_are_reported() {
    let reporter = Arc::new(RecordingHealthReporter::default());

    let error = bootstrap_with(&FailingConfigLoader, reporter.clone()).expect_err("must fail");

    assert!(matches!(error, BootstrapError::Configuration { .. }));
    let events = reporter.events();
    assert!(
        events
            .iter()
            .any(|event| matches!(event, HealthEvent::BootstrapFailed(_)))
    );
    assert!(!events.contains(&HealthEvent::BootstrapSucceeded));
}

#[rstest]
#[case::bit_depth(|config: &mut tonewire_config::Config| config.bit_depth = 20)]
#[case::channels(|config: &mut tonewire_config::Config| config.channels = 0)]
#[case::sample_rate(|config: &mut tonewire_config::Config| config.sample_rate_hz = 0)]
fn unsupported_stream_formats_fail_bootstrap(#[case] adjust: fn(&mut tonewire_config::Config)) {
    let loader = TestConfigLoader::with(adjust);
    let reporter = Arc::new(RecordingHealthReporter::default());

    let error = bootstrap_with(&loader, reporter.clone()).expect_err("must fail");

    assert!(matches!(error, BootstrapError::StreamFormat { .. }));
    assert!(matches!(
        reporter.events().last(),
        Some(HealthEvent::BootstrapFailed(_))
    ));
}
