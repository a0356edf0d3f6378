// ==========================================
// Production Slot Scheduler - Order Entities
// ==========================================
// Read-only views of the manufacturing order and its
// article/offer attributes. Lifecycle is owned by the
// surrounding ERP; the scheduler never writes them.
// ==========================================

use crate::domain::types::ShiftMode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Order - manufacturing order (external entity)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,                          // order identifier
    pub quantity: f64,                             // ordered pieces
    pub worked_quantity: f64,                      // pieces already produced
    pub shift_mode: ShiftMode,                     // GIORNATA / TURNI
    pub shift_morning: bool,                       // TURNI: morning shift active
    pub shift_afternoon: bool,                     // TURNI: afternoon shift active
    pub work_saturday: bool,                       // Saturdays count as working days
    pub delivery_requested_date: Option<NaiveDate>, // requested delivery
    pub workline_id: String,                       // associated workline
}

// ==========================================
// Article - hourly-rate basis
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub base_rate: Option<f64>,    // pieces per hour per worker (rate basis)
    pub real_workers: Option<u32>, // observed crew size, overrides the offer
}

// ==========================================
// Offer - commercial attributes feeding the rate
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub piece: Option<f64>,            // piece multiplier on the base rate
    pub expected_workers: Option<u32>, // crew size agreed in the offer
}

// ==========================================
// OrderSnapshot - one consistent read for an engine pass
// ==========================================
// Bundles the order with its article/offer attributes and the
// externally aggregated processed quantity, so every operation
// computes from a single load.
#[derive(Debug, Clone)]
pub struct OrderSnapshot {
    pub order: Order,
    pub article: Article,
    pub offer: Offer,
    pub processed_quantity: f64,
}
