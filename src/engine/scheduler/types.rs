// ==========================================
// Production Slot Scheduler - Scheduler Result Types
// ==========================================

use crate::domain::types::{ShiftWindow, SlotKey};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// ScheduleOutcome - finite result set
// ==========================================
// Every scheduler operation ends in exactly one of these.
// Expected business conditions (missing data, completed orders,
// past delivery dates) are outcomes, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScheduleOutcome {
    /// Full (re)build produced a fresh calendar.
    Scheduled(ScheduleSummary),
    /// Planned slots already match the required quarters.
    Aligned,
    /// Reconciliation appended quarters after the last planned slot.
    Extended { quarters: u32 },
    /// Reconciliation removed the chronologically latest quarters.
    Trimmed { quarters: u32 },
    /// Nothing remains to produce; planning was cleared.
    Completed { quarters_removed: u32 },
    /// Rate or crew data missing; no mutation performed.
    InsufficientData,
    /// The order does not exist.
    NotFound { order_id: String },
    /// Full scheduling requires a delivery date.
    MissingDeliveryDate,
    /// The requested delivery date is already in the past.
    PastDelivery { requested: NaiveDate },
}

// ==========================================
// ScheduleSummary - auto-schedule report
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub quarters_created: u32,    // slots written by the walk
    pub start: NaiveDateTime,     // first planned slot
    pub window: ShiftWindow,      // working-hour window used
    pub workers_per_slot: u32,    // headcount assigned to every slot
}

// ==========================================
// PlannedSlot - one flattened calendar entry
// ==========================================
// Planning records flatten into these tuples for counting,
// ordering and tail removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSlot {
    pub workline_id: String,
    pub plan_date: NaiveDate,
    pub slot_key: SlotKey,
    pub workers: u32,
}
