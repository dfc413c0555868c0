use candid::CandidType;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for compile and execute operations.
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub targets: BTreeMap<String, TargetCounters>,
}

///
/// EventOps
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Compiler
    pub compile_calls: u64,
    pub compile_rejected: u64,
    pub fields_compiled: u64,
    pub parameter_slots: u64,

    // Shape cache
    pub cache_hits: u64,
    pub cache_misses: u64,

    // Execution
    pub execute_calls: u64,
    pub parameters_resolved: u64,
    pub rows_projected: u64,
}

///
/// TargetCounters
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TargetCounters {
    pub compile_calls: u64,
    pub compile_rejected: u64,
    pub execute_calls: u64,
    pub rows_projected: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: Option<EventState>,
    pub target_counters: Vec<TargetSummary>,
}

///
/// TargetSummary
///

#[derive(CandidType, Clone, Debug, Default, Deserialize, Serialize)]
pub struct TargetSummary {
    pub target: String,
    pub compile_calls: u64,
    pub compile_rejected: u64,
    pub execute_calls: u64,
    pub rows_projected: u64,
    pub avg_rows_per_execute: f64,
}

/// Build a report from the in-memory counters.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let mut target_counters: Vec<TargetSummary> = snap
        .targets
        .iter()
        .map(|(target, c)| TargetSummary {
            target: target.clone(),
            compile_calls: c.compile_calls,
            compile_rejected: c.compile_rejected,
            execute_calls: c.execute_calls,
            rows_projected: c.rows_projected,
            avg_rows_per_execute: if c.execute_calls > 0 {
                c.rows_projected as f64 / c.execute_calls as f64
            } else {
                0.0
            },
        })
        .collect();

    // busiest targets first, ties by name
    target_counters.sort_by(|a, b| {
        b.execute_calls
            .cmp(&a.execute_calls)
            .then_with(|| a.target.cmp(&b.target))
    });

    EventReport {
        counters: Some(snap),
        target_counters,
    }
}
