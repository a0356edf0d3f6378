// ==========================================
// Production Slot Scheduler - Cell Writer
// ==========================================
// Manual single-cell / single-hour edits against the slot
// store. The empty-map-deletes-record invariant is enforced by
// the shared settle helper on every path.
// ==========================================

use crate::domain::planning::{PlanningKey, SlotMap, SlotState};
use crate::domain::types::{
    hour_slot_keys, slot_key, Granularity, SlotKey, SummaryType, QUARTER_MINUTES,
};
use crate::engine::locks::KeyedLocks;
use crate::repository::{RepositoryError, RepositoryResult, SlotStore};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

// ==========================================
// Write results
// ==========================================
/// Resulting mapping (possibly empty) and the surviving record
/// identity (none when the record was deleted).
#[derive(Debug, Clone, PartialEq)]
pub struct CellWriteResult {
    pub slots: SlotMap,
    pub record: Option<PlanningKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryWriteResult {
    pub slots: SlotMap,
    pub record: Option<(NaiveDate, SummaryType)>,
}

// ==========================================
// CellWriter
// ==========================================
pub struct CellWriter {
    slot_store: Arc<dyn SlotStore>,
    // shared with the scheduler so cell edits and reconciliations
    // on the same order serialize
    order_locks: Arc<KeyedLocks>,
    summary_locks: KeyedLocks,
}

impl CellWriter {
    pub fn new(slot_store: Arc<dyn SlotStore>, order_locks: Arc<KeyedLocks>) -> Self {
        Self {
            slot_store,
            order_locks,
            summary_locks: KeyedLocks::new(),
        }
    }

    /// Manually edit one cell of an order's day.
    ///
    /// Hour granularity touches all four quarter keys of the hour
    /// uniformly; quarter granularity touches the single
    /// (hour, minute) key. A zero worker count clears the touched
    /// keys.
    pub fn write_cell(
        &self,
        order_id: &str,
        workline_id: &str,
        plan_date: NaiveDate,
        hour: u32,
        minute: u32,
        workers: u32,
        granularity: Granularity,
    ) -> RepositoryResult<CellWriteResult> {
        let keys = touched_keys(hour, minute, granularity)?;
        self.order_locks.run(order_id, || {
            self.write_cell_locked(order_id, workline_id, plan_date, &keys, workers)
        })
    }

    fn write_cell_locked(
        &self,
        order_id: &str,
        workline_id: &str,
        plan_date: NaiveDate,
        keys: &[SlotKey],
        workers: u32,
    ) -> RepositoryResult<CellWriteResult> {
        let mut record = self
            .slot_store
            .find_or_create_planning_record(order_id, workline_id, plan_date)?;
        apply_keys(&mut record.slots, keys, workers);

        debug!(
            order_id,
            workline_id,
            date = %plan_date,
            ?keys,
            workers,
            "manual cell edit"
        );

        match SlotState::settle(record.slots) {
            SlotState::Absent => {
                self.slot_store.delete_planning_record(&PlanningKey {
                    order_id: order_id.to_string(),
                    workline_id: workline_id.to_string(),
                    plan_date,
                })?;
                Ok(CellWriteResult {
                    slots: SlotMap::new(),
                    record: None,
                })
            }
            SlotState::Present(slots) => {
                record.slots = slots.clone();
                self.slot_store.upsert_planning_record(&record)?;
                Ok(CellWriteResult {
                    slots,
                    record: Some(record.key()),
                })
            }
        }
    }

    /// Manually edit one cell of a summary row. `reset` forces
    /// clearing the touched keys regardless of `value`.
    pub fn write_summary_cell(
        &self,
        summary_type: SummaryType,
        plan_date: NaiveDate,
        hour: u32,
        minute: u32,
        value: u32,
        reset: bool,
        granularity: Granularity,
    ) -> RepositoryResult<SummaryWriteResult> {
        let keys = touched_keys(hour, minute, granularity)?;
        let effective = if reset { 0 } else { value };
        let lock_key = format!("{}:{}", plan_date, summary_type);
        self.summary_locks.run(&lock_key, || {
            self.write_summary_cell_locked(summary_type, plan_date, &keys, effective)
        })
    }

    fn write_summary_cell_locked(
        &self,
        summary_type: SummaryType,
        plan_date: NaiveDate,
        keys: &[SlotKey],
        effective: u32,
    ) -> RepositoryResult<SummaryWriteResult> {
        let mut record = self
            .slot_store
            .find_or_create_summary_record(plan_date, summary_type)?;
        apply_keys(&mut record.slots, keys, effective);

        debug!(
            summary = %summary_type,
            date = %plan_date,
            ?keys,
            value = effective,
            "manual summary edit"
        );

        match SlotState::settle(record.slots) {
            SlotState::Absent => {
                self.slot_store.delete_summary_record(plan_date, summary_type)?;
                Ok(SummaryWriteResult {
                    slots: SlotMap::new(),
                    record: None,
                })
            }
            SlotState::Present(slots) => {
                record.slots = slots.clone();
                self.slot_store.upsert_summary_record(&record)?;
                Ok(SummaryWriteResult {
                    slots,
                    record: Some((plan_date, summary_type)),
                })
            }
        }
    }
}

/// Keys touched by one edit.
fn touched_keys(hour: u32, minute: u32, granularity: Granularity) -> RepositoryResult<Vec<SlotKey>> {
    if hour >= 24 {
        return Err(RepositoryError::DataIntegrityError(format!(
            "hour {hour} out of range"
        )));
    }
    match granularity {
        Granularity::Hour => Ok(hour_slot_keys(hour).to_vec()),
        Granularity::Quarter => {
            if !QUARTER_MINUTES.contains(&minute) {
                return Err(RepositoryError::DataIntegrityError(format!(
                    "minute {minute} is not a quarter boundary"
                )));
            }
            Ok(vec![slot_key(hour, minute)])
        }
    }
}

/// Set or clear the touched keys uniformly.
fn apply_keys(slots: &mut SlotMap, keys: &[SlotKey], workers: u32) {
    for key in keys {
        slots.set(*key, workers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touched_keys_hour() {
        let keys = touched_keys(10, 0, Granularity::Hour).unwrap();
        assert_eq!(keys, vec![1000, 1015, 1030, 1045]);
        // minute is ignored at hour granularity
        let keys = touched_keys(10, 30, Granularity::Hour).unwrap();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn test_touched_keys_quarter() {
        assert_eq!(touched_keys(6, 30, Granularity::Quarter).unwrap(), vec![630]);
        assert!(touched_keys(6, 20, Granularity::Quarter).is_err());
        assert!(touched_keys(24, 0, Granularity::Hour).is_err());
    }

    #[test]
    fn test_apply_keys_zero_clears() {
        let mut map: SlotMap = [(1000, 2), (1015, 2)].into_iter().collect();
        apply_keys(&mut map, &[1000, 1015, 1030, 1045], 0);
        assert!(map.is_empty());

        apply_keys(&mut map, &[1000, 1015], 3);
        assert_eq!(map.get(1000), Some(3));
        assert_eq!(map.len(), 2);
    }
}
