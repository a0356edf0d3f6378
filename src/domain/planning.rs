// ==========================================
// Production Slot Scheduler - Planning Entities
// ==========================================
// Slot mappings and the two persisted record kinds:
// per-(order, workline, date) planning rows and
// per-(date, summary-type) aggregate rows.
//
// Invariant: a slot mapping is never persisted empty.
// An empty mapping means the record does not exist.
// All write paths funnel through SlotState::settle.
// ==========================================

use crate::domain::types::{is_valid_slot_key, SlotKey, SummaryType};
use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// SlotMap - quarter-slot -> worker count
// ==========================================
// Ordered by slot key so day walks and serialization are
// deterministic. Worker counts are >= 1; writing 0 removes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMap {
    slots: BTreeMap<SlotKey, u32>,
}

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, key: SlotKey) -> Option<u32> {
        self.slots.get(&key).copied()
    }

    pub fn contains(&self, key: SlotKey) -> bool {
        self.slots.contains_key(&key)
    }

    /// Ascending (slot key, workers) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, u32)> + '_ {
        self.slots.iter().map(|(k, w)| (*k, *w))
    }

    pub fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.slots.keys().copied()
    }

    /// Assign workers to a quarter slot. A zero count removes the slot.
    pub fn set(&mut self, key: SlotKey, workers: u32) {
        debug_assert!(is_valid_slot_key(key), "invalid slot key {}", key);
        if workers == 0 {
            self.slots.remove(&key);
        } else {
            self.slots.insert(key, workers);
        }
    }

    pub fn remove(&mut self, key: SlotKey) -> Option<u32> {
        self.slots.remove(&key)
    }

    /// Merge another mapping in, overwriting colliding keys.
    pub fn merge(&mut self, other: &SlotMap) {
        for (k, w) in other.iter() {
            self.set(k, w);
        }
    }

    /// Retain only the slots strictly before the given key.
    pub fn truncate_from(&mut self, key: SlotKey) {
        self.slots.retain(|k, _| *k < key);
    }

    // ===== JSON codec =====
    // Keys persist as decimal strings ("630" = 06:30), values as
    // positive integers. The encoding must round-trip exactly.

    pub fn to_json(&self) -> String {
        let object: serde_json::Map<String, serde_json::Value> = self
            .slots
            .iter()
            .map(|(k, w)| (k.to_string(), serde_json::Value::from(*w)))
            .collect();
        serde_json::Value::Object(object).to_string()
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let decoded: BTreeMap<String, u32> =
            serde_json::from_str(raw).context("malformed slot map JSON")?;
        let mut map = SlotMap::new();
        for (key_str, workers) in decoded {
            let key: SlotKey = key_str
                .parse()
                .with_context(|| format!("non-numeric slot key '{}'", key_str))?;
            if !is_valid_slot_key(key) {
                bail!("slot key {} is not a quarter boundary", key);
            }
            if workers == 0 {
                bail!("slot key {} carries a zero worker count", key);
            }
            map.slots.insert(key, workers);
        }
        Ok(map)
    }
}

impl FromIterator<(SlotKey, u32)> for SlotMap {
    fn from_iter<I: IntoIterator<Item = (SlotKey, u32)>>(iter: I) -> Self {
        let mut map = SlotMap::new();
        for (k, w) in iter {
            map.set(k, w);
        }
        map
    }
}

// ==========================================
// SlotState - persistence state after mutation
// ==========================================
// The single place the empty-deletes-record rule lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Absent,
    Present(SlotMap),
}

impl SlotState {
    /// Classify a freshly mutated mapping: empty means the record
    /// must not exist, non-empty means it must be upserted.
    pub fn settle(map: SlotMap) -> Self {
        if map.is_empty() {
            SlotState::Absent
        } else {
            SlotState::Present(map)
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, SlotState::Absent)
    }
}

// ==========================================
// PlanningRecord - per-order per-day slots
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRecord {
    pub order_id: String,     // owning order
    pub workline_id: String,  // workline the order runs on
    pub plan_date: NaiveDate, // calendar day
    pub slots: SlotMap,       // quarter slots of that day
}

impl PlanningRecord {
    pub fn new(order_id: &str, workline_id: &str, plan_date: NaiveDate) -> Self {
        Self {
            order_id: order_id.to_string(),
            workline_id: workline_id.to_string(),
            plan_date,
            slots: SlotMap::new(),
        }
    }

    pub fn key(&self) -> PlanningKey {
        PlanningKey {
            order_id: self.order_id.clone(),
            workline_id: self.workline_id.clone(),
            plan_date: self.plan_date,
        }
    }
}

/// Composite identity of a planning record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningKey {
    pub order_id: String,
    pub workline_id: String,
    pub plan_date: NaiveDate,
}

// ==========================================
// SummaryRecord - per-day manual aggregates
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub plan_date: NaiveDate,      // calendar day
    pub summary_type: SummaryType, // which aggregate is overridden
    pub slots: SlotMap,            // hour/quarter values of that day
}

impl SummaryRecord {
    pub fn new(plan_date: NaiveDate, summary_type: SummaryType) -> Self {
        Self {
            plan_date,
            summary_type,
            slots: SlotMap::new(),
        }
    }
}
