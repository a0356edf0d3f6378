// ==========================================
// Production Slot Scheduler - Workload Calculator
// ==========================================
// Single source of truth for "how much work remains":
// order + article/offer attributes + processed quantity
// -> remaining quantity, hourly rate, hours and quarters
// needed, or a data-insufficiency signal.
// ==========================================

use crate::domain::order::OrderSnapshot;
use serde::{Deserialize, Serialize};

// ==========================================
// Workload - computed figures
// ==========================================
// Invariants: hours_needed >= 0, quarters_needed = ceil(hours_needed * 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workload {
    pub remaining_quantity: f64,     // pieces still to produce
    pub hourly_rate_per_worker: f64, // pieces per hour per worker
    pub worker_count: u32,           // crew size per slot
    pub hours_needed: f64,           // remaining / (rate * workers)
    pub quarters_needed: u32,        // 15-minute slots to plan
}

// ==========================================
// WorkloadResult - computed or insufficient
// ==========================================
// Missing rate or crew data is an expected condition, reported
// to the caller rather than raised as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WorkloadResult {
    Insufficient,
    Computed(Workload),
}

impl WorkloadResult {
    pub fn as_computed(&self) -> Option<&Workload> {
        match self {
            WorkloadResult::Computed(w) => Some(w),
            WorkloadResult::Insufficient => None,
        }
    }
}

/// Compute the remaining workload for one order snapshot.
///
/// - rate = article base rate x offer piece multiplier (multiplier
///   defaults to 1, a missing base rate is insufficient data)
/// - crew = article real workers, falling back to the offer's
///   expected workers
/// - worked = processed quantity when positive, else the order's
///   own worked_quantity counter
pub fn calculate(snapshot: &OrderSnapshot) -> WorkloadResult {
    let order = &snapshot.order;

    let hourly_rate_per_worker = match snapshot.article.base_rate {
        Some(rate) => rate * snapshot.offer.piece.unwrap_or(1.0),
        None => return WorkloadResult::Insufficient,
    };

    let worker_count = match snapshot
        .article
        .real_workers
        .or(snapshot.offer.expected_workers)
    {
        Some(workers) => workers,
        None => return WorkloadResult::Insufficient,
    };

    if hourly_rate_per_worker <= 0.0 || worker_count == 0 {
        return WorkloadResult::Insufficient;
    }

    let worked_quantity = if snapshot.processed_quantity > 0.0 {
        snapshot.processed_quantity
    } else {
        order.worked_quantity
    };
    let remaining_quantity = (order.quantity - worked_quantity).max(0.0);

    let hours_needed =
        (remaining_quantity / (hourly_rate_per_worker * worker_count as f64)).max(0.0);
    let quarters_needed = (hours_needed * 4.0).ceil() as u32;

    WorkloadResult::Computed(Workload {
        remaining_quantity,
        hourly_rate_per_worker,
        worker_count,
        hours_needed,
        quarters_needed,
    })
}
