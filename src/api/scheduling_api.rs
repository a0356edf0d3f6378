// ==========================================
// Production Slot Scheduler - Scheduling API
// ==========================================
// The operation surface consumed by controllers/UI. Wires the
// engines to the storage contracts and wraps every outcome into
// a structured report with a human-readable message. Expected
// business conditions are reported, never raised.
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::types::{Granularity, SummaryType};
use crate::engine::cell_writer::{CellWriteResult, CellWriter, SummaryWriteResult};
use crate::engine::locks::KeyedLocks;
use crate::engine::scheduler::{ScheduleOutcome, Scheduler};
use crate::engine::workload::{self, Workload, WorkloadResult};
use crate::api::error::ApiResult;
use crate::repository::{OrderReader, SlotStore};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

// ==========================================
// Report DTOs
// ==========================================

/// Outcome of a scheduling operation, with a display message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationReport {
    pub order_id: String,
    pub outcome: ScheduleOutcome,
    pub message: Option<String>,
}

/// Workload figures for calendar display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkloadReport {
    NotFound { order_id: String },
    InsufficientData { order_id: String },
    Computed { order_id: String, workload: Workload },
}

// ==========================================
// SchedulingApi
// ==========================================
pub struct SchedulingApi {
    order_reader: Arc<dyn OrderReader>,
    scheduler: Scheduler,
    cell_writer: CellWriter,
}

impl SchedulingApi {
    pub fn new(
        order_reader: Arc<dyn OrderReader>,
        slot_store: Arc<dyn SlotStore>,
        config: SchedulerConfig,
    ) -> Self {
        // one per-order lock registry shared by every engine that
        // mutates planning records
        let order_locks = Arc::new(KeyedLocks::new());
        let scheduler = Scheduler::new(
            order_reader.clone(),
            slot_store.clone(),
            config,
            order_locks.clone(),
        );
        let cell_writer = CellWriter::new(slot_store, order_locks);
        Self {
            order_reader,
            scheduler,
            cell_writer,
        }
    }

    /// Remaining workload of an order, for display and verification.
    pub fn calculate_workload(&self, order_id: &str) -> ApiResult<WorkloadReport> {
        let Some(snapshot) = self.order_reader.load_snapshot(order_id)? else {
            return Ok(WorkloadReport::NotFound {
                order_id: order_id.to_string(),
            });
        };
        Ok(match workload::calculate(&snapshot) {
            WorkloadResult::Insufficient => WorkloadReport::InsufficientData {
                order_id: order_id.to_string(),
            },
            WorkloadResult::Computed(workload) => WorkloadReport::Computed {
                order_id: order_id.to_string(),
                workload,
            },
        })
    }

    /// Full (re)build of the order's slot calendar.
    pub fn auto_schedule(
        &self,
        order_id: &str,
        is_new: bool,
        now: NaiveDateTime,
    ) -> ApiResult<OperationReport> {
        let outcome = self.scheduler.auto_schedule(order_id, is_new, now)?;
        Ok(self.report(order_id, outcome))
    }

    /// Re-align future planning after the order was edited.
    pub fn reconcile_after_manual_edit(
        &self,
        order_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<OperationReport> {
        let outcome = self.scheduler.reconcile_after_manual_edit(order_id, now)?;
        Ok(self.report(order_id, outcome))
    }

    /// Re-align all planning after the worked quantity changed.
    pub fn reconcile_after_progress(
        &self,
        order_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<OperationReport> {
        let outcome = self.scheduler.reconcile_after_progress(order_id, now)?;
        Ok(self.report(order_id, outcome))
    }

    /// Manual edit of one planning cell.
    #[allow(clippy::too_many_arguments)]
    pub fn write_cell(
        &self,
        order_id: &str,
        workline_id: &str,
        plan_date: NaiveDate,
        hour: u32,
        minute: u32,
        workers: u32,
        granularity: Granularity,
    ) -> ApiResult<CellWriteResult> {
        let result = self.cell_writer.write_cell(
            order_id,
            workline_id,
            plan_date,
            hour,
            minute,
            workers,
            granularity,
        )?;
        Ok(result)
    }

    /// Manual edit of one summary cell.
    #[allow(clippy::too_many_arguments)]
    pub fn write_summary_cell(
        &self,
        summary_type: SummaryType,
        plan_date: NaiveDate,
        hour: u32,
        minute: u32,
        value: u32,
        reset: bool,
        granularity: Granularity,
    ) -> ApiResult<SummaryWriteResult> {
        let result = self.cell_writer.write_summary_cell(
            summary_type,
            plan_date,
            hour,
            minute,
            value,
            reset,
            granularity,
        )?;
        Ok(result)
    }

    fn report(&self, order_id: &str, outcome: ScheduleOutcome) -> OperationReport {
        let message = match &outcome {
            ScheduleOutcome::Scheduled(summary) => Some(format!(
                "planned {} quarters from {} in window {}",
                summary.quarters_created, summary.start, summary.window
            )),
            ScheduleOutcome::Aligned => Some("planning already matches the required quarters".to_string()),
            ScheduleOutcome::Extended { quarters } => {
                Some(format!("appended {quarters} quarters after the last planned slot"))
            }
            ScheduleOutcome::Trimmed { quarters } => {
                Some(format!("removed the {quarters} latest planned quarters"))
            }
            ScheduleOutcome::Completed { quarters_removed } => Some(format!(
                "order complete, {quarters_removed} planned quarters cleared"
            )),
            ScheduleOutcome::InsufficientData => {
                Some("missing rate or crew data, nothing scheduled".to_string())
            }
            ScheduleOutcome::NotFound { order_id } => Some(format!("order {order_id} not found")),
            ScheduleOutcome::MissingDeliveryDate => {
                Some("a requested delivery date is required for scheduling".to_string())
            }
            ScheduleOutcome::PastDelivery { requested } => Some(format!(
                "requested delivery date {requested} is already past"
            )),
        };
        info!(order_id, ?outcome, "operation finished");
        OperationReport {
            order_id: order_id.to_string(),
            outcome,
            message,
        }
    }
}
