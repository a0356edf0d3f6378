// ==========================================
// Production Slot Scheduler - Data Access Layer
// ==========================================
// Responsibility: storage contracts and their SQLite
// implementations. No business logic lives here; all queries
// are parameterized.
// ==========================================

pub mod error;
pub mod order_reader;
pub mod slot_store;

// Re-export core contracts
pub use error::{RepositoryError, RepositoryResult};
pub use order_reader::{InMemoryOrderReader, OrderReader};
pub use slot_store::{PlanningWrite, SlotStore, SqliteSlotStore};
