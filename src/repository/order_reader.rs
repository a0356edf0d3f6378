// ==========================================
// Production Slot Scheduler - Order Reader
// ==========================================
// Read contract supplied by the surrounding ERP: order rows,
// their article/offer attributes, and the aggregated processed
// quantity. The scheduler never writes through this interface.
// ==========================================

use crate::domain::order::{Article, Offer, Order, OrderSnapshot};
use crate::repository::error::RepositoryResult;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

// ==========================================
// OrderReader - external collaborator contract
// ==========================================
pub trait OrderReader: Send + Sync {
    /// One consistent snapshot of everything an engine pass needs.
    /// Returns None when the order does not exist.
    fn load_snapshot(&self, order_id: &str) -> RepositoryResult<Option<OrderSnapshot>>;
}

// ==========================================
// InMemoryOrderReader - map-backed implementation
// ==========================================
// Used by tests and by embedders that already hold order data
// in memory.
#[derive(Default)]
pub struct InMemoryOrderReader {
    entries: Mutex<HashMap<String, OrderEntry>>,
}

struct OrderEntry {
    order: Order,
    article: Article,
    offer: Offer,
    processed_quantity: f64,
}

impl InMemoryOrderReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an order with its attributes.
    pub fn put(&self, order: Order, article: Article, offer: Offer) {
        let mut entries = self.lock();
        entries.insert(
            order.order_id.clone(),
            OrderEntry {
                order,
                article,
                offer,
                processed_quantity: 0.0,
            },
        );
    }

    /// Update the externally aggregated processed quantity.
    pub fn set_processed_quantity(&self, order_id: &str, processed: f64) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(order_id) {
            entry.processed_quantity = processed;
        }
    }

    /// Mutate the stored order row (quantity edits, shift changes...).
    pub fn update_order<F: FnOnce(&mut Order)>(&self, order_id: &str, f: F) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(order_id) {
            f(&mut entry.order);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, OrderEntry>> {
        // a poisoned map only happens if a writer panicked; the data
        // itself is still usable
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl OrderReader for InMemoryOrderReader {
    fn load_snapshot(&self, order_id: &str) -> RepositoryResult<Option<OrderSnapshot>> {
        let entries = self.lock();
        Ok(entries.get(order_id).map(|entry| OrderSnapshot {
            order: entry.order.clone(),
            article: entry.article.clone(),
            offer: entry.offer.clone(),
            processed_quantity: entry.processed_quantity,
        }))
    }
}
