//! Per-key cache slot: state machine + exclusion.
//!
//! Every key owns its own `Mutex` + `Condvar`, so transitions on unrelated
//! keys never contend. The outer key map is locked only long enough to fetch
//! or insert the slot `Arc`.

use std::collections::BTreeSet;
use std::sync::{Arc, Condvar, Mutex};

use hubcycle_catalog::UnitId;

/// Immutable availability snapshot shared with readers.
pub type Snapshot = Arc<BTreeSet<UnitId>>;

/// Lifecycle of one cache entry.
///
/// `Absent` is represented as `None` in the slot (or no slot at all);
/// tear-down removes the slot entirely.
#[derive(Debug, Clone)]
pub(crate) enum SlotState {
    /// A recomputation is in flight. `previous` is the last published
    /// snapshot, if any; `dirty` records an invalidation that arrived after
    /// the in-flight computation started and forces a follow-up pass.
    Building {
        previous: Option<Snapshot>,
        dirty: bool,
    },
    /// The entry reflects all invalidations received before the computation
    /// that produced it started.
    Valid { snapshot: Snapshot },
    /// An invalidation arrived after the entry became valid. The snapshot is
    /// kept for serve-stale readers but must not be served as fresh.
    Stale { snapshot: Snapshot },
}

/// Externally observable entry status (diagnostics and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Absent,
    Building,
    Valid,
    Stale,
}

#[derive(Debug, Default)]
pub(crate) struct Slot {
    pub(crate) state: Mutex<Option<SlotState>>,
    pub(crate) cond: Condvar,
}

impl Slot {
    pub(crate) fn status(&self) -> EntryStatus {
        match self.state.lock().unwrap().as_ref() {
            None => EntryStatus::Absent,
            Some(SlotState::Building { .. }) => EntryStatus::Building,
            Some(SlotState::Valid { .. }) => EntryStatus::Valid,
            Some(SlotState::Stale { .. }) => EntryStatus::Stale,
        }
    }

    /// Apply an invalidation: Valid becomes Stale, an in-flight build is
    /// marked dirty, Absent and Stale are unchanged.
    pub(crate) fn invalidate(&self) {
        let mut state = self.state.lock().unwrap();
        match state.take() {
            Some(SlotState::Valid { snapshot }) => {
                *state = Some(SlotState::Stale { snapshot });
            }
            Some(SlotState::Building { previous, .. }) => {
                *state = Some(SlotState::Building {
                    previous,
                    dirty: true,
                });
            }
            other => *state = other,
        }
    }
}
