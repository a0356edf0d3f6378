// ==========================================
// Production Slot Scheduler - Scheduler Engine
// ==========================================
// Orchestrates the shift calendar, the workload calculator and
// the slot store: full scheduling walk, incremental
// reconciliation after edits, adjustment after progress.
// ==========================================

mod core;
mod cursor;
mod reconcile;
mod types;


pub use cursor::{current_slot_key, is_working_day, monday_of_week, SlotCursor};
pub use types::{PlannedSlot, ScheduleOutcome, ScheduleSummary};

use crate::config::SchedulerConfig;
use crate::engine::locks::KeyedLocks;
use crate::repository::{OrderReader, SlotStore};
use std::sync::Arc;

// ==========================================
// Scheduler - the scheduling engine
// ==========================================
// Operations are synchronous and request-scoped; the per-order
// lock registry (shared with the cell writer) serializes
// concurrent operations on the same order, and every operation
// writes through one transactional batch.
pub struct Scheduler {
    order_reader: Arc<dyn OrderReader>,
    slot_store: Arc<dyn SlotStore>,
    config: SchedulerConfig,
    order_locks: Arc<KeyedLocks>,
}
