// ==========================================
// Production Slot Scheduler - Scheduler Core
// ==========================================
// Full-horizon (re)scheduling walk plus the shared helpers the
// reconciliation operations build on: order locking, slot
// flattening, tail removal.
// ==========================================

use super::cursor::{current_slot_key, monday_of_week, SlotCursor};
use super::types::{PlannedSlot, ScheduleOutcome, ScheduleSummary};
use crate::config::SchedulerConfig;
use crate::domain::order::OrderSnapshot;
use crate::domain::planning::{PlanningRecord, SlotMap, SlotState};
use crate::domain::types::{slot_hour, slot_minute};
use crate::engine::locks::KeyedLocks;
use crate::engine::workload::{self, Workload};
use crate::engine::{shift_calendar, Scheduler};
use crate::repository::{
    OrderReader, PlanningWrite, RepositoryResult, SlotStore,
};
use chrono::{Days, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

impl Scheduler {
    /// `order_locks` is the per-order lock registry shared with
    /// every other engine mutating the same planning records.
    pub fn new(
        order_reader: Arc<dyn OrderReader>,
        slot_store: Arc<dyn SlotStore>,
        config: SchedulerConfig,
        order_locks: Arc<KeyedLocks>,
    ) -> Self {
        Self {
            order_reader,
            slot_store,
            config,
            order_locks,
        }
    }

    /// Resolve the order snapshot and its workload, short-circuiting
    /// into the validate-then-act outcomes shared by every operation.
    pub(super) fn resolve(
        &self,
        order_id: &str,
    ) -> RepositoryResult<Result<(OrderSnapshot, Workload), ScheduleOutcome>> {
        let Some(snapshot) = self.order_reader.load_snapshot(order_id)? else {
            return Ok(Err(ScheduleOutcome::NotFound {
                order_id: order_id.to_string(),
            }));
        };
        match workload::calculate(&snapshot) {
            workload::WorkloadResult::Insufficient => Ok(Err(ScheduleOutcome::InsufficientData)),
            workload::WorkloadResult::Computed(w) => Ok(Ok((snapshot, w))),
        }
    }

    // ==========================================
    // Operation: auto_schedule - full (re)build
    // ==========================================
    /// Rebuild the order's slot calendar from scratch (`is_new`) or
    /// from the reference start onward. Each walked day's slot map
    /// replaces any pre-existing map for that day: the full
    /// reschedule is authoritative.
    pub fn auto_schedule(
        &self,
        order_id: &str,
        is_new: bool,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleOutcome> {
        self.order_locks
            .run(order_id, || self.auto_schedule_locked(order_id, is_new, now))
    }

    /// Body of `auto_schedule`, callable by the reconciliation
    /// operations that already hold the order lock.
    pub(super) fn auto_schedule_locked(
        &self,
        order_id: &str,
        is_new: bool,
        now: NaiveDateTime,
    ) -> RepositoryResult<ScheduleOutcome> {
        let (snapshot, workload) = match self.resolve(order_id)? {
            Ok(resolved) => resolved,
            Err(outcome) => return Ok(outcome),
        };
        if workload.quarters_needed == 0 {
            return Ok(ScheduleOutcome::Completed {
                quarters_removed: 0,
            });
        }

        let order = &snapshot.order;
        let Some(delivery) = order.delivery_requested_date else {
            return Ok(ScheduleOutcome::MissingDeliveryDate);
        };
        if delivery < now.date() {
            return Ok(ScheduleOutcome::PastDelivery { requested: delivery });
        }

        let window = shift_calendar::window_for_order(order);
        let reference_date = monday_of_week(delivery)
            - Days::new(u64::from(self.config.delivery_buffer_days));

        // Start point and deletion scope: a new order starts at the
        // reference and drops everything; an existing one keeps its
        // past planning and restarts from the reference, or from now
        // when the reference has already gone by.
        let (cursor, delete_from) = if is_new {
            (
                SlotCursor::at_day_start(window, order.work_saturday, reference_date),
                None,
            )
        } else {
            let reference_start = reference_date
                .and_hms_opt(window.start_hour, 0, 0)
                .expect("shift start hour is a valid time");
            let cursor = if reference_start < now {
                SlotCursor::from_instant(window, order.work_saturday, now)
            } else {
                SlotCursor::at_day_start(window, order.work_saturday, reference_date)
            };
            let from = cursor.date();
            (cursor, Some(from))
        };

        let batch = self.build_walk(&snapshot, &workload, cursor.clone(), delete_from);
        self.slot_store.apply(&batch)?;

        let start = cursor
            .date()
            .and_hms_opt(slot_hour(cursor.slot_key()), slot_minute(cursor.slot_key()), 0)
            .expect("slot key encodes a valid time");
        info!(
            order_id,
            is_new,
            quarters = workload.quarters_needed,
            start = %start,
            window = %window,
            "full schedule written"
        );
        Ok(ScheduleOutcome::Scheduled(ScheduleSummary {
            quarters_created: workload.quarters_needed,
            start,
            window,
            workers_per_slot: workload.worker_count,
        }))
    }

    /// Assemble the deletion plus the day-by-day replacement maps of
    /// a full scheduling walk into one write batch.
    fn build_walk(
        &self,
        snapshot: &OrderSnapshot,
        workload: &Workload,
        mut cursor: SlotCursor,
        delete_from: Option<NaiveDate>,
    ) -> Vec<PlanningWrite> {
        let order = &snapshot.order;
        let mut batch = vec![PlanningWrite::DeletePlanningFrom {
            order_id: order.order_id.clone(),
            date_from: delete_from,
        }];

        let mut remaining = workload.quarters_needed;
        while remaining > 0 {
            let day = cursor.date();
            let mut day_map = SlotMap::new();
            while cursor.date() == day && remaining > 0 {
                day_map.set(cursor.slot_key(), workload.worker_count);
                remaining -= 1;
                cursor.advance();
            }
            debug!(order_id = order.order_id, date = %day, quarters = day_map.len(), "day planned");
            batch.push(PlanningWrite::UpsertPlanning(PlanningRecord {
                order_id: order.order_id.clone(),
                workline_id: order.workline_id.clone(),
                plan_date: day,
                slots: day_map,
            }));
        }
        batch
    }

    // ==========================================
    // Slot flattening helpers
    // ==========================================

    /// Flatten planning records into slots sorted by (date, key).
    pub(super) fn all_slots(records: &[PlanningRecord]) -> Vec<PlannedSlot> {
        let mut slots: Vec<PlannedSlot> = records
            .iter()
            .flat_map(|record| {
                record.slots.iter().map(|(key, workers)| PlannedSlot {
                    workline_id: record.workline_id.clone(),
                    plan_date: record.plan_date,
                    slot_key: key,
                    workers,
                })
            })
            .collect();
        slots.sort_by(|a, b| {
            (a.plan_date, a.slot_key, &a.workline_id).cmp(&(b.plan_date, b.slot_key, &b.workline_id))
        });
        slots
    }

    /// Slots at or after the reference instant: strictly later dates,
    /// or same-day slots from the current quarter on.
    pub(super) fn future_slots(records: &[PlanningRecord], from: NaiveDateTime) -> Vec<PlannedSlot> {
        let today = from.date();
        let current_key = current_slot_key(from);
        Self::all_slots(records)
            .into_iter()
            .filter(|slot| {
                slot.plan_date > today
                    || (slot.plan_date == today && slot.slot_key >= current_key)
            })
            .collect()
    }

    /// Latest planned slot across all records, if any planning exists.
    pub(super) fn last_planned_slot(records: &[PlanningRecord]) -> Option<PlannedSlot> {
        Self::all_slots(records).into_iter().last()
    }

    // ==========================================
    // Tail removal
    // ==========================================
    /// Writes that remove the given victim slots from their records,
    /// deleting any record whose map becomes empty.
    pub(super) fn removal_writes(
        records: &[PlanningRecord],
        victims: &[PlannedSlot],
    ) -> Vec<PlanningWrite> {
        let mut touched: BTreeMap<(NaiveDate, String), PlanningRecord> = BTreeMap::new();
        for victim in victims {
            let record = touched
                .entry((victim.plan_date, victim.workline_id.clone()))
                .or_insert_with(|| {
                    records
                        .iter()
                        .find(|r| {
                            r.plan_date == victim.plan_date && r.workline_id == victim.workline_id
                        })
                        .cloned()
                        .expect("victim slot flattened from these records")
                });
            record.slots.remove(victim.slot_key);
        }

        touched
            .into_values()
            .map(|record| match SlotState::settle(record.slots.clone()) {
                SlotState::Absent => PlanningWrite::DeletePlanning(record.key()),
                SlotState::Present(_) => PlanningWrite::UpsertPlanning(record),
            })
            .collect()
    }
}
