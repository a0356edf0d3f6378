// ==========================================
// Production Slot Scheduler - Configuration
// ==========================================
// Tunable scheduling settings with serde support so an
// embedding application can persist them alongside its own
// configuration.
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// SchedulerConfig - engine tunables
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Days of buffer scheduled before the Monday of the delivery
    /// week. Default: 7 (scheduling aims to finish one week early).
    /// Unsigned: the buffer only ever moves the start earlier.
    pub delivery_buffer_days: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            delivery_buffer_days: 7,
        }
    }
}
