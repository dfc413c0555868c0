//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Compilation and execution never touch `obs::metrics` directly; every
//! event goes through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EventOps, EventReport, EventState, TargetCounters, TargetSummary};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
