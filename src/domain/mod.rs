// ==========================================
// Production Slot Scheduler - Domain Layer
// ==========================================
// Entities and value types only: no data access,
// no engine logic.
// ==========================================

pub mod order;
pub mod planning;
pub mod types;

// Re-export core types
pub use order::{Article, Offer, Order, OrderSnapshot};
pub use planning::{PlanningKey, PlanningRecord, SlotMap, SlotState, SummaryRecord};
pub use types::{Granularity, ShiftMode, ShiftWindow, SlotKey, SummaryType};
