// ==========================================
// Production Slot Scheduler - API Layer
// ==========================================
// Business interface consumed by controllers and UI.
// ==========================================

pub mod error;
pub mod scheduling_api;

pub use error::{ApiError, ApiResult};
pub use scheduling_api::{OperationReport, SchedulingApi, WorkloadReport};
