// ==========================================
// Production Slot Scheduler - Demo Entry Point
// ==========================================
// Schedules a sample order into a local SQLite database and
// prints the resulting calendar. The real deployment embeds the
// library behind the ERP's controllers.
// ==========================================

use chrono::{Days, Local};
use slot_scheduler::repository::{InMemoryOrderReader, SlotStore, SqliteSlotStore};
use slot_scheduler::{
    logging, Article, Offer, Order, SchedulerConfig, SchedulingApi, ShiftMode,
};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    logging::init();

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "slot-scheduler.db".to_string());
    let conn = slot_scheduler::db::open_sqlite_connection(&db_path)?;
    slot_scheduler::db::init_slot_schema(&conn)?;
    let store = Arc::new(SqliteSlotStore::from_connection(Arc::new(
        std::sync::Mutex::new(conn),
    )));

    let now = Local::now().naive_local();
    let orders = Arc::new(InMemoryOrderReader::new());
    orders.put(
        Order {
            order_id: "DEMO-1".to_string(),
            quantity: 100.0,
            worked_quantity: 0.0,
            shift_mode: ShiftMode::Turni,
            shift_morning: true,
            shift_afternoon: false,
            work_saturday: false,
            delivery_requested_date: Some(now.date() + Days::new(21)),
            workline_id: "LINE-A".to_string(),
        },
        Article {
            base_rate: Some(1.0),
            real_workers: Some(2),
        },
        Offer {
            piece: None,
            expected_workers: None,
        },
    );

    let api = SchedulingApi::new(orders, store.clone(), SchedulerConfig::default());
    let report = api.auto_schedule("DEMO-1", true, now)?;
    println!(
        "{}",
        report.message.unwrap_or_else(|| "no message".to_string())
    );

    for record in store.find_planning_records("DEMO-1")? {
        println!("{} {} -> {}", record.plan_date, record.workline_id, record.slots.to_json());
    }
    Ok(())
}
