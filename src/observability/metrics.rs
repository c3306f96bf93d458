//! Metrics collection for `delirium-sim`.
//!
//! Prometheus-compatible metrics with typed convenience functions. Every
//! label value comes from a closed enum, so label cardinality is bounded.
//! Recording without an installed recorder is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::SimError;
use crate::sim::{GameResult, Phase, ThresholdRule};

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns `SimError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), SimError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| SimError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!("delirium_sim_turns_total", "Nurse turns applied");
    describe_counter!(
        "delirium_sim_results_total",
        "Sessions that reached a terminal result"
    );
    describe_gauge!(
        "delirium_sim_current_phase",
        "Currently active patient phase (1 = active)"
    );
    describe_counter!(
        "delirium_sim_rules_fired_total",
        "Threshold rules fired during scoring"
    );
    describe_counter!(
        "delirium_sim_collaborator_errors_total",
        "Failed interpreter or narrator calls"
    );
    describe_histogram!(
        "delirium_sim_collaborator_duration_ms",
        "Interpreter and narrator call duration in milliseconds"
    );
}

/// Records an applied turn and the rules it fired.
pub fn record_turn(fired: &[ThresholdRule]) {
    counter!("delirium_sim_turns_total").increment(1);
    for rule in fired {
        counter!("delirium_sim_rules_fired_total", "rule" => rule.as_str()).increment(1);
    }
}

/// Records a terminal result.
pub fn record_result(result: GameResult) {
    counter!("delirium_sim_results_total", "result" => result.as_str()).increment(1);
}

/// Marks `phase` as the active phase. Every other phase label is zeroed,
/// so exactly one label reads 1 whatever the previous gauge state was.
pub fn set_current_phase(phase: Phase) {
    for other in Phase::ALL {
        let value = if other == phase { 1.0 } else { 0.0 };
        gauge!("delirium_sim_current_phase", "phase" => phase_label(other)).set(value);
    }
}

/// Records a collaborator call's duration.
pub fn record_collaborator_duration(collaborator: &'static str, duration: Duration) {
    histogram!("delirium_sim_collaborator_duration_ms", "collaborator" => collaborator)
        .record(duration.as_secs_f64() * 1000.0);
}

/// Records a failed collaborator call.
pub fn record_collaborator_error(collaborator: &'static str) {
    counter!("delirium_sim_collaborator_errors_total", "collaborator" => collaborator)
        .increment(1);
}

const fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Disoriented => "1",
        Phase::Agitated => "2",
        Phase::Stabilizing => "3",
    }
}
