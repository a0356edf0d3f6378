// ==========================================
// Production Slot Scheduler - Domain Types
// ==========================================
// Shared value types: shift configuration, working-hour
// windows, slot-key encoding, edit granularity.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ShiftMode - per-order shift configuration
// ==========================================
// Persisted as integer codes (legacy schema alignment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftMode {
    Giornata, // 0 - standard day shift
    Turni,    // 1 - rotating shifts (morning/afternoon flags apply)
}

impl ShiftMode {
    /// Decode from the integer stored on the order row.
    /// Unknown codes fall back to the day-shift default.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ShiftMode::Turni,
            _ => ShiftMode::Giornata,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ShiftMode::Giornata => 0,
            ShiftMode::Turni => 1,
        }
    }
}

impl fmt::Display for ShiftMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftMode::Giornata => write!(f, "GIORNATA"),
            ShiftMode::Turni => write!(f, "TURNI"),
        }
    }
}

// ==========================================
// ShiftWindow - derived working-hour window
// ==========================================
// Never persisted; recomputed from the order on every use.
// Invariant: start_hour < end_hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start_hour: u32,    // first workable hour (inclusive)
    pub end_hour: u32,      // first non-workable hour (exclusive)
    pub hours_per_day: u32, // end_hour - start_hour
}

impl ShiftWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Self {
        assert!(start_hour < end_hour, "shift window must be non-empty");
        Self {
            start_hour,
            end_hour,
            hours_per_day: end_hour - start_hour,
        }
    }

    /// Half-open containment: start_hour <= hour < end_hour.
    pub fn is_hour_enabled(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }

    /// Quarter slots available in one full working day.
    pub fn quarters_per_day(&self) -> u32 {
        self.hours_per_day * 4
    }
}

impl fmt::Display for ShiftWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.start_hour, self.end_hour)
    }
}

// ==========================================
// Slot keys - HHmm encoding of quarter boundaries
// ==========================================
// A slot key is hour*100 + minute with minute in {0,15,30,45}.
// Examples: 630 = 06:30, 1400 = 14:00.

pub type SlotKey = u32;

/// Minutes at which a quarter slot may start.
pub const QUARTER_MINUTES: [u32; 4] = [0, 15, 30, 45];

/// Length of one scheduling quarter.
pub const QUARTER_MINUTE_STEP: u32 = 15;

/// Encode an (hour, minute) quarter boundary as a slot key.
pub fn slot_key(hour: u32, minute: u32) -> SlotKey {
    debug_assert!(hour < 24 && minute % QUARTER_MINUTE_STEP == 0 && minute < 60);
    hour * 100 + minute
}

/// Hour component of a slot key.
pub fn slot_hour(key: SlotKey) -> u32 {
    key / 100
}

/// Minute component of a slot key.
pub fn slot_minute(key: SlotKey) -> u32 {
    key % 100
}

/// Whether a key encodes a valid quarter boundary.
pub fn is_valid_slot_key(key: SlotKey) -> bool {
    slot_hour(key) < 24 && QUARTER_MINUTES.contains(&slot_minute(key))
}

/// The four quarter keys of one hour, in ascending order.
pub fn hour_slot_keys(hour: u32) -> [SlotKey; 4] {
    [
        slot_key(hour, 0),
        slot_key(hour, 15),
        slot_key(hour, 30),
        slot_key(hour, 45),
    ]
}

// ==========================================
// SummaryType - manual aggregate rows
// ==========================================
// Summary records hold manually overridden per-day totals,
// independent of any single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryType {
    Workers,  // headcount override
    Capacity, // capacity override
}

impl SummaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryType::Workers => "WORKERS",
            SummaryType::Capacity => "CAPACITY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "WORKERS" => Some(SummaryType::Workers),
            "CAPACITY" => Some(SummaryType::Capacity),
            _ => None,
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Granularity - manual cell edit scope
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,    // touch all four quarters of the hour
    Quarter, // touch a single quarter
}
