//! Metrics sink boundary.
//!
//! This module is the only bridge between compile/execute logic and the
//! thread-local metrics state.

use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    Compile {
        target: &'static str,
        fields: usize,
        parameters: usize,
    },
    CompileRejected {
        target: &'static str,
    },
    CacheHit,
    CacheMiss,
    ParametersResolved {
        count: usize,
    },
    Execute {
        target: &'static str,
        rows: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink; writes into the thread-local event state.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::Compile {
                target,
                fields,
                parameters,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.compile_calls = m.ops.compile_calls.saturating_add(1);
                    m.ops.fields_compiled = m.ops.fields_compiled.saturating_add(fields as u64);
                    m.ops.parameter_slots = m.ops.parameter_slots.saturating_add(parameters as u64);

                    let entry = m.targets.entry(target.to_string()).or_default();
                    entry.compile_calls = entry.compile_calls.saturating_add(1);
                });
            }

            MetricsEvent::CompileRejected { target } => {
                metrics::with_state_mut(|m| {
                    m.ops.compile_rejected = m.ops.compile_rejected.saturating_add(1);
                    let entry = m.targets.entry(target.to_string()).or_default();
                    entry.compile_rejected = entry.compile_rejected.saturating_add(1);
                });
            }

            MetricsEvent::CacheHit => {
                metrics::with_state_mut(|m| {
                    m.ops.cache_hits = m.ops.cache_hits.saturating_add(1);
                });
            }

            MetricsEvent::CacheMiss => {
                metrics::with_state_mut(|m| {
                    m.ops.cache_misses = m.ops.cache_misses.saturating_add(1);
                });
            }

            MetricsEvent::ParametersResolved { count } => {
                metrics::with_state_mut(|m| {
                    m.ops.parameters_resolved =
                        m.ops.parameters_resolved.saturating_add(count as u64);
                });
            }

            MetricsEvent::Execute { target, rows } => {
                metrics::with_state_mut(|m| {
                    m.ops.execute_calls = m.ops.execute_calls.saturating_add(1);
                    m.ops.rows_projected = m.ops.rows_projected.saturating_add(rows);

                    let entry = m.targets.entry(target.to_string()).or_default();
                    entry.execute_calls = entry.execute_calls.saturating_add(1);
                    entry.rows_projected = entry.rows_projected.saturating_add(rows);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    // clone out first so a sink may itself install an override
    let current = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match current {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state for the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with `sink` receiving every event recorded on this thread.
/// The previous sink is restored on return and on unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}
