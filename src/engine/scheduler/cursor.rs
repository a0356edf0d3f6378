// ==========================================
// Production Slot Scheduler - Slot Cursor
// ==========================================
// Working-day rules and the 15-minute stepping cursor every
// scheduling walk runs on. Crossing the window's end hour rolls
// to the next working day at the start hour.
// ==========================================

use crate::domain::types::{slot_key, ShiftWindow, SlotKey, QUARTER_MINUTE_STEP};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Sundays never work; Saturdays only when the order allows it.
pub fn is_working_day(date: NaiveDate, work_saturday: bool) -> bool {
    match date.weekday() {
        Weekday::Sun => false,
        Weekday::Sat => work_saturday,
        _ => true,
    }
}

/// Slot key of the quarter containing an instant (minute floored
/// to the lower 15-minute boundary).
pub fn current_slot_key(at: NaiveDateTime) -> SlotKey {
    slot_key(at.hour(), at.minute() / QUARTER_MINUTE_STEP * QUARTER_MINUTE_STEP)
}

/// Monday of the week containing the date.
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

// ==========================================
// SlotCursor - quarter-slot walker
// ==========================================
// Always positioned on a valid slot: a working day, inside the
// shift window, on a quarter boundary.
#[derive(Debug, Clone)]
pub struct SlotCursor {
    date: NaiveDate,
    hour: u32,
    minute: u32,
    window: ShiftWindow,
    work_saturday: bool,
}

impl SlotCursor {
    /// Cursor at the first valid slot of a day (or a later day if
    /// that day does not work).
    pub fn at_day_start(window: ShiftWindow, work_saturday: bool, date: NaiveDate) -> Self {
        let mut cursor = Self {
            date,
            hour: window.start_hour,
            minute: 0,
            window,
            work_saturday,
        };
        cursor.normalize();
        cursor
    }

    /// Cursor at an instant rounded up to the next 15-minute
    /// boundary, clamped forward into the next valid working slot.
    /// An instant already on a boundary stays on it.
    pub fn from_instant(window: ShiftWindow, work_saturday: bool, at: NaiveDateTime) -> Self {
        let mut date = at.date();
        let mut hour = at.hour();
        let mut minute = at.minute().div_ceil(QUARTER_MINUTE_STEP) * QUARTER_MINUTE_STEP;
        if minute == 60 {
            minute = 0;
            hour += 1;
        }
        if hour == 24 {
            hour = 0;
            date = date + Days::new(1);
        }
        let mut cursor = Self {
            date,
            hour,
            minute,
            window,
            work_saturday,
        };
        cursor.normalize();
        cursor
    }

    /// Cursor at the slot immediately after a planned slot.
    pub fn after_slot(
        window: ShiftWindow,
        work_saturday: bool,
        date: NaiveDate,
        key: SlotKey,
    ) -> Self {
        let mut cursor = Self {
            date,
            hour: crate::domain::types::slot_hour(key),
            minute: crate::domain::types::slot_minute(key),
            window,
            work_saturday,
        };
        cursor.step();
        cursor
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn slot_key(&self) -> SlotKey {
        slot_key(self.hour, self.minute)
    }

    /// Consume the current slot and move to the next valid one.
    pub fn advance(&mut self) {
        self.step();
    }

    fn step(&mut self) {
        self.minute += QUARTER_MINUTE_STEP;
        if self.minute == 60 {
            self.minute = 0;
            self.hour += 1;
        }
        self.normalize();
    }

    /// Clamp forward into the next valid working slot. Terminates
    /// because weekdays always work and the window is non-empty.
    fn normalize(&mut self) {
        assert!(
            self.window.start_hour < self.window.end_hour,
            "shift window must be non-empty"
        );
        loop {
            if !is_working_day(self.date, self.work_saturday) {
                self.next_day();
                continue;
            }
            if self.hour >= self.window.end_hour {
                self.next_day();
                continue;
            }
            if self.hour < self.window.start_hour {
                self.hour = self.window.start_hour;
                self.minute = 0;
            }
            break;
        }
    }

    fn next_day(&mut self) {
        self.date = self.date + Days::new(1);
        self.hour = self.window.start_hour;
        self.minute = 0;
    }
}
