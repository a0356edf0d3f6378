// ==========================================
// Production Slot Scheduler - Core Library
// ==========================================
// Converts a manufacturing order's remaining quantity into a
// calendar of 15-minute work slots, each tagged with a worker
// headcount, constrained by per-order shift windows and
// working-day rules, and keeps that calendar consistent as
// orders progress or are edited.
// ==========================================

// Domain layer - entities and value types
pub mod domain;

// Data access layer - storage contracts
pub mod repository;

// Engine layer - business rules
pub mod engine;

// API layer - operation surface
pub mod api;

// Configuration
pub mod config;

// Database infrastructure (connection init / PRAGMA / schema)
pub mod db;

// Logging
pub mod logging;

// ==========================================
// Re-export core types
// ==========================================

// Domain
pub use domain::{
    Article, Granularity, Offer, Order, OrderSnapshot, PlanningKey, PlanningRecord, ShiftMode,
    ShiftWindow, SlotKey, SlotMap, SlotState, SummaryRecord, SummaryType,
};

// Engines
pub use engine::{
    CellWriteResult, CellWriter, PlannedSlot, ScheduleOutcome, ScheduleSummary, Scheduler,
    SummaryWriteResult, Workload, WorkloadResult,
};

// API
pub use api::{OperationReport, SchedulingApi, WorkloadReport};

// Configuration
pub use config::SchedulerConfig;

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Production Slot Scheduler";
