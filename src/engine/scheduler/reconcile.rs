// ==========================================
// Production Slot Scheduler - Reconciliation
// ==========================================
// The two incremental operations keeping planning aligned with
// a freshly recomputed required-quarters count. They differ in
// baseline: manual-edit reconciliation counts only future slots
// and never touches the past; progress reconciliation counts
// (and may remove) everything. Kept as two named operations
// because their removable-slot semantics are easy to conflate.
// ==========================================

use super::cursor::SlotCursor;
use super::types::{PlannedSlot, ScheduleOutcome};
use crate::domain::order::OrderSnapshot;
use crate::domain::planning::{PlanningRecord, SlotMap};
use crate::engine::workload::Workload;
use crate::engine::{shift_calendar, Scheduler};
use crate::repository::{PlanningWrite, RepositoryResult};
use chrono::NaiveDateTime;
use tracing::info;

impl Scheduler {
    // ==========================================
    // Operation: reconcile_after_manual_edit
    // ==========================================
    /// Align *future* planning with the current need after an order
    /// edit. Past slots are untouched; appends merge into existing
    /// day maps; removals drop the chronologically latest future
    /// slots first.
    pub fn reconcile_after_manual_edit(
        &self,
        order_id: &str,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleOutcome> {
        self.order_locks
            .run(order_id, || self.reconcile_after_manual_edit_locked(order_id, now))
    }

    fn reconcile_after_manual_edit_locked(
        &self,
        order_id: &str,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleOutcome> {
        let (snapshot, workload) = match self.resolve(order_id)? {
            Ok(resolved) => resolved,
            Err(outcome) => return Ok(outcome),
        };

        let records = self.slot_store.find_planning_records(order_id)?;

        // Fully worked: clear today-and-future planning, keep history.
        if workload.remaining_quantity <= 0.0 {
            let victims = Self::future_slots(&records, now);
            let removed = victims.len() as u32;
            if removed > 0 {
                let batch = Self::removal_writes(&records, &victims);
                self.slot_store.apply(&batch)?;
            }
            info!(order_id, removed, "order complete, future planning cleared");
            return Ok(ScheduleOutcome::Completed {
                quarters_removed: removed,
            });
        }

        let future = Self::future_slots(&records, now);
        let diff = i64::from(workload.quarters_needed) - future.len() as i64;
        info!(
            order_id,
            needed = workload.quarters_needed,
            planned_future = future.len(),
            diff,
            "manual-edit reconciliation"
        );

        match diff {
            0 => Ok(ScheduleOutcome::Aligned),
            d if d > 0 => {
                // Nothing planned yet: fall back to a full schedule.
                let Some(last) = Self::last_planned_slot(&records) else {
                    return self.auto_schedule_locked(order_id, false, now);
                };
                let batch =
                    self.append_writes(&snapshot, &workload, &records, &last, d as u32);
                self.slot_store.apply(&batch)?;
                Ok(ScheduleOutcome::Extended { quarters: d as u32 })
            }
            d => {
                let count = d.unsigned_abs() as usize;
                let victims: Vec<PlannedSlot> =
                    future[future.len() - count..].to_vec();
                let batch = Self::removal_writes(&records, &victims);
                self.slot_store.apply(&batch)?;
                Ok(ScheduleOutcome::Trimmed {
                    quarters: count as u32,
                })
            }
        }
    }

    // ==========================================
    // Operation: reconcile_after_progress
    // ==========================================
    /// Align *all* planning (past and future) with the total
    /// remaining need after the worked quantity changed.
    pub fn reconcile_after_progress(
        &self,
        order_id: &str,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleOutcome> {
        self.order_locks
            .run(order_id, || self.reconcile_after_progress_locked(order_id, now))
    }

    fn reconcile_after_progress_locked(
        &self,
        order_id: &str,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleOutcome> {
        let (snapshot, workload) = match self.resolve(order_id)? {
            Ok(resolved) => resolved,
            Err(outcome) => return Ok(outcome),
        };

        let records = self.slot_store.find_planning_records(order_id)?;
        let all = Self::all_slots(&records);

        // Nothing left to plan: the whole calendar goes.
        if workload.quarters_needed == 0 {
            let removed = all.len() as u32;
            if removed > 0 {
                self.slot_store.apply(&[PlanningWrite::DeletePlanningFrom {
                    order_id: order_id.to_string(),
                    date_from: None,
                }])?;
            }
            info!(order_id, removed, "order complete, all planning cleared");
            return Ok(ScheduleOutcome::Completed {
                quarters_removed: removed,
            });
        }

        let diff = i64::from(workload.quarters_needed) - all.len() as i64;
        info!(
            order_id,
            needed = workload.quarters_needed,
            planned = all.len(),
            diff,
            "progress reconciliation"
        );

        match diff {
            0 => Ok(ScheduleOutcome::Aligned),
            d if d > 0 => {
                let Some(last) = Self::last_planned_slot(&records) else {
                    return self.auto_schedule_locked(order_id, true, now);
                };
                let batch =
                    self.append_writes(&snapshot, &workload, &records, &last, d as u32);
                self.slot_store.apply(&batch)?;
                Ok(ScheduleOutcome::Extended { quarters: d as u32 })
            }
            d => {
                let count = d.unsigned_abs() as usize;
                // Tail removal across all time, not just the future.
                let victims: Vec<PlannedSlot> = all[all.len() - count..].to_vec();
                let batch = Self::removal_writes(&records, &victims);
                self.slot_store.apply(&batch)?;
                Ok(ScheduleOutcome::Trimmed {
                    quarters: count as u32,
                })
            }
        }
    }

    // ==========================================
    // Append - merge quarters after the last planned slot
    // ==========================================
    /// Writes appending `count` quarters starting immediately after
    /// the last planned slot, skipping non-working days and merging
    /// into each day's existing map (unlike the full walk, which
    /// replaces).
    fn append_writes(
        &self,
        snapshot: &OrderSnapshot,
        workload: &Workload,
        records: &[PlanningRecord],
        last: &PlannedSlot,
        count: u32,
    ) -> Vec<PlanningWrite> {
        let order = &snapshot.order;
        let window = shift_calendar::window_for_order(order);
        let mut cursor = SlotCursor::after_slot(
            window,
            order.work_saturday,
            last.plan_date,
            last.slot_key,
        );

        let mut writes = Vec::new();
        let mut remaining = count;
        while remaining > 0 {
            let day = cursor.date();
            let mut day_map = records
                .iter()
                .find(|r| r.plan_date == day && r.workline_id == order.workline_id)
                .map(|r| r.slots.clone())
                .unwrap_or_else(SlotMap::new);
            while cursor.date() == day && remaining > 0 {
                day_map.set(cursor.slot_key(), workload.worker_count);
                remaining -= 1;
                cursor.advance();
            }
            writes.push(PlanningWrite::UpsertPlanning(PlanningRecord {
                order_id: order.order_id.clone(),
                workline_id: order.workline_id.clone(),
                plan_date: day,
                slots: day_map,
            }));
        }
        writes
    }
}
