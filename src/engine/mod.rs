// ==========================================
// Production Slot Scheduler - Engine Layer
// ==========================================
// Business rules: shift windows, workload computation, the
// scheduling walks, manual cell edits. Engines read and write
// only through the repository contracts.
// ==========================================

pub mod cell_writer;
pub mod locks;
pub mod scheduler;
pub mod shift_calendar;
pub mod workload;

// Re-export core engines and results
pub use cell_writer::{CellWriteResult, CellWriter, SummaryWriteResult};
pub use locks::KeyedLocks;
pub use scheduler::{
    PlannedSlot, ScheduleOutcome, ScheduleSummary, Scheduler, SlotCursor,
};
pub use workload::{Workload, WorkloadResult};
