// ==========================================
// Production Slot Scheduler - SQLite Infrastructure
// ==========================================
// Goals:
// - one place for Connection::open PRAGMA behavior, so every
//   module sees the same foreign-key / busy-timeout settings
// - schema bootstrap for the two slot tables
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Apply the unified PRAGMA set to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings and
/// must be applied to every connection we open.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create the planning tables if they do not exist.
///
/// Slot mappings are stored as JSON text whose keys are decimal
/// strings of the HHmm slot key and whose values are worker counts.
/// Dates are stored as %Y-%m-%d text.
pub fn init_slot_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS planning_slot (
            order_id    TEXT NOT NULL,
            workline_id TEXT NOT NULL,
            plan_date   TEXT NOT NULL,
            slots_json  TEXT NOT NULL,
            updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (order_id, workline_id, plan_date)
        );

        CREATE INDEX IF NOT EXISTS idx_planning_slot_order_date
            ON planning_slot (order_id, plan_date);

        CREATE TABLE IF NOT EXISTS summary_slot (
            plan_date    TEXT NOT NULL,
            summary_type TEXT NOT NULL,
            slots_json   TEXT NOT NULL,
            updated_at   TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (plan_date, summary_type)
        );
        "#,
    )
}
