// ==========================================
// Production Slot Scheduler - Shift Calendar
// ==========================================
// The only place shift-window logic lives: order shift
// configuration -> working-hour window. Pure, no failure modes.
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::{ShiftMode, ShiftWindow};

/// Day-shift default, also the fallback for a TURNI order with
/// neither shift flag set.
const DEFAULT_WINDOW: (u32, u32) = (8, 16);

/// Derive the working-hour window from a shift configuration.
///
/// GIORNATA ignores the morning/afternoon flags. TURNI combines
/// them: both -> 06-22, morning -> 06-14, afternoon -> 14-22,
/// neither -> the day-shift default.
pub fn window_for(mode: ShiftMode, morning: bool, afternoon: bool) -> ShiftWindow {
    let (start, end) = match mode {
        ShiftMode::Giornata => DEFAULT_WINDOW,
        ShiftMode::Turni => match (morning, afternoon) {
            (true, true) => (6, 22),
            (true, false) => (6, 14),
            (false, true) => (14, 22),
            (false, false) => DEFAULT_WINDOW,
        },
    };
    ShiftWindow::new(start, end)
}

/// Window for an order's shift fields.
pub fn window_for_order(order: &Order) -> ShiftWindow {
    window_for(order.shift_mode, order.shift_morning, order.shift_afternoon)
}
