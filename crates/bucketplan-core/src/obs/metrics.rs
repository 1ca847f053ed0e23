use crate::bucket::BucketMapMode;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for descriptor construction and placement.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct EventState {
    pub(crate) ops: EventOps,
    pub(crate) rejections: BTreeMap<String, u64>,
    pub(crate) placements: BTreeMap<String, u64>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Factories
    pub dynamic_built: u64,
    pub fixed_built: u64,
    pub rejected: u64,

    // Placement
    pub placements: u64,
    pub buckets_placed: u64,
    pub placement_failures: u64,
}

impl EventOps {
    pub(crate) const fn count_built(&mut self, mode: BucketMapMode) {
        match mode {
            BucketMapMode::Dynamic => self.dynamic_built = self.dynamic_built.saturating_add(1),
            BucketMapMode::Fixed => self.fixed_built = self.fixed_built.saturating_add(1),
        }
    }
}

///
/// EventReport
/// Point-in-time copy of the counters.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub counters: EventOps,

    /// Rejected constructions keyed by failure reason.
    pub rejections: BTreeMap<String, u64>,

    /// Successful placements keyed by strategy name.
    pub placements: BTreeMap<String, u64>,
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

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Bump a keyed counter.
pub(crate) fn bump(counters: &mut BTreeMap<String, u64>, key: &str, by: u64) {
    let entry = counters.entry(key.to_string()).or_default();
    *entry = entry.saturating_add(by);
}

#[must_use]
pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        counters: m.ops.clone(),
        rejections: m.rejections.clone(),
        placements: m.placements.clone(),
    })
}
