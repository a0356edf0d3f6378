// ==========================================
// Production Slot Scheduler - Slot Store
// ==========================================
// Narrow read/write contract over the two record kinds
// (planning rows, summary rows) plus a transactional batch
// entry point. Repository holds no business logic; the
// empty-map invariant is still rejected here as a last line.
// ==========================================

use crate::domain::planning::{PlanningKey, PlanningRecord, SlotMap, SummaryRecord};
use crate::domain::types::SummaryType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

const DATE_FMT: &str = "%Y-%m-%d";

// ==========================================
// PlanningWrite - one mutation in a batch
// ==========================================
// A scheduler operation assembles all of its mutations into a
// single batch so a mid-walk failure cannot leave a partially
// written schedule.
#[derive(Debug, Clone)]
pub enum PlanningWrite {
    UpsertPlanning(PlanningRecord),
    DeletePlanning(PlanningKey),
    /// Delete every planning row of an order; with a date it only
    /// deletes rows dated on/after it.
    DeletePlanningFrom {
        order_id: String,
        date_from: Option<NaiveDate>,
    },
    UpsertSummary(SummaryRecord),
    DeleteSummary {
        plan_date: NaiveDate,
        summary_type: SummaryType,
    },
}

// ==========================================
// SlotStore - storage contract
// ==========================================
pub trait SlotStore: Send + Sync {
    fn find_planning_records(&self, order_id: &str) -> RepositoryResult<Vec<PlanningRecord>>;

    fn find_planning_record(
        &self,
        order_id: &str,
        workline_id: &str,
        plan_date: NaiveDate,
    ) -> RepositoryResult<Option<PlanningRecord>>;

    /// Load the record for the key, or hand back a blank unsaved one.
    fn find_or_create_planning_record(
        &self,
        order_id: &str,
        workline_id: &str,
        plan_date: NaiveDate,
    ) -> RepositoryResult<PlanningRecord> {
        Ok(self
            .find_planning_record(order_id, workline_id, plan_date)?
            .unwrap_or_else(|| PlanningRecord::new(order_id, workline_id, plan_date)))
    }

    fn upsert_planning_record(&self, record: &PlanningRecord) -> RepositoryResult<()>;

    fn delete_planning_record(&self, key: &PlanningKey) -> RepositoryResult<()>;

    /// Delete planning rows of an order, optionally only from a date on.
    /// Returns the number of rows removed.
    fn delete_planning_records(
        &self,
        order_id: &str,
        date_from: Option<NaiveDate>,
    ) -> RepositoryResult<usize>;

    fn find_summary_record(
        &self,
        plan_date: NaiveDate,
        summary_type: SummaryType,
    ) -> RepositoryResult<Option<SummaryRecord>>;

    fn find_or_create_summary_record(
        &self,
        plan_date: NaiveDate,
        summary_type: SummaryType,
    ) -> RepositoryResult<SummaryRecord> {
        Ok(self
            .find_summary_record(plan_date, summary_type)?
            .unwrap_or_else(|| SummaryRecord::new(plan_date, summary_type)))
    }

    fn upsert_summary_record(&self, record: &SummaryRecord) -> RepositoryResult<()>;

    fn delete_summary_record(
        &self,
        plan_date: NaiveDate,
        summary_type: SummaryType,
    ) -> RepositoryResult<()>;

    /// Execute a write batch inside one transaction.
    fn apply(&self, batch: &[PlanningWrite]) -> RepositoryResult<()>;
}

// ==========================================
// SqliteSlotStore - rusqlite implementation
// ==========================================
pub struct SqliteSlotStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSlotStore {
    /// Open a store on a database file (schema must exist,
    /// see `db::init_slot_schema`).
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn parse_date(raw: &str) -> RepositoryResult<NaiveDate> {
        NaiveDate::parse_from_str(raw, DATE_FMT)
            .map_err(|e| RepositoryError::DataIntegrityError(format!("bad plan_date '{raw}': {e}")))
    }

    fn parse_slots(raw: &str) -> RepositoryResult<SlotMap> {
        SlotMap::from_json(raw)
            .map_err(|e| RepositoryError::DataIntegrityError(format!("bad slots_json: {e:#}")))
    }

    fn planning_from_row(
        order_id: String,
        workline_id: String,
        date_str: String,
        slots_json: String,
    ) -> RepositoryResult<PlanningRecord> {
        Ok(PlanningRecord {
            order_id,
            workline_id,
            plan_date: Self::parse_date(&date_str)?,
            slots: Self::parse_slots(&slots_json)?,
        })
    }

    // ===== write helpers sharing a borrowed connection =====
    // Used both by the single-record trait methods and by the
    // transactional batch path.

    fn upsert_planning_tx(conn: &Connection, record: &PlanningRecord) -> RepositoryResult<()> {
        if record.slots.is_empty() {
            return Err(RepositoryError::DataIntegrityError(format!(
                "refusing to persist empty slot map for order={} date={}",
                record.order_id, record.plan_date
            )));
        }
        conn.execute(
            r#"
            INSERT INTO planning_slot (order_id, workline_id, plan_date, slots_json, updated_at)
            VALUES (?1, ?2, ?3, ?4, datetime('now'))
            ON CONFLICT (order_id, workline_id, plan_date)
            DO UPDATE SET slots_json = excluded.slots_json, updated_at = excluded.updated_at
            "#,
            params![
                record.order_id,
                record.workline_id,
                record.plan_date.format(DATE_FMT).to_string(),
                record.slots.to_json(),
            ],
        )?;
        Ok(())
    }

    fn delete_planning_tx(conn: &Connection, key: &PlanningKey) -> RepositoryResult<()> {
        conn.execute(
            "DELETE FROM planning_slot WHERE order_id = ?1 AND workline_id = ?2 AND plan_date = ?3",
            params![
                key.order_id,
                key.workline_id,
                key.plan_date.format(DATE_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    fn delete_planning_from_tx(
        conn: &Connection,
        order_id: &str,
        date_from: Option<NaiveDate>,
    ) -> RepositoryResult<usize> {
        let affected = match date_from {
            Some(from) => conn.execute(
                "DELETE FROM planning_slot WHERE order_id = ?1 AND plan_date >= ?2",
                params![order_id, from.format(DATE_FMT).to_string()],
            )?,
            None => conn.execute(
                "DELETE FROM planning_slot WHERE order_id = ?1",
                params![order_id],
            )?,
        };
        Ok(affected)
    }

    fn upsert_summary_tx(conn: &Connection, record: &SummaryRecord) -> RepositoryResult<()> {
        if record.slots.is_empty() {
            return Err(RepositoryError::DataIntegrityError(format!(
                "refusing to persist empty slot map for summary={} date={}",
                record.summary_type, record.plan_date
            )));
        }
        conn.execute(
            r#"
            INSERT INTO summary_slot (plan_date, summary_type, slots_json, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT (plan_date, summary_type)
            DO UPDATE SET slots_json = excluded.slots_json, updated_at = excluded.updated_at
            "#,
            params![
                record.plan_date.format(DATE_FMT).to_string(),
                record.summary_type.as_str(),
                record.slots.to_json(),
            ],
        )?;
        Ok(())
    }

    fn delete_summary_tx(
        conn: &Connection,
        plan_date: NaiveDate,
        summary_type: SummaryType,
    ) -> RepositoryResult<()> {
        conn.execute(
            "DELETE FROM summary_slot WHERE plan_date = ?1 AND summary_type = ?2",
            params![plan_date.format(DATE_FMT).to_string(), summary_type.as_str()],
        )?;
        Ok(())
    }

    fn apply_one(conn: &Connection, write: &PlanningWrite) -> RepositoryResult<()> {
        match write {
            PlanningWrite::UpsertPlanning(record) => Self::upsert_planning_tx(conn, record),
            PlanningWrite::DeletePlanning(key) => Self::delete_planning_tx(conn, key),
            PlanningWrite::DeletePlanningFrom {
                order_id,
                date_from,
            } => Self::delete_planning_from_tx(conn, order_id, *date_from).map(|_| ()),
            PlanningWrite::UpsertSummary(record) => Self::upsert_summary_tx(conn, record),
            PlanningWrite::DeleteSummary {
                plan_date,
                summary_type,
            } => Self::delete_summary_tx(conn, *plan_date, *summary_type),
        }
    }
}

impl SlotStore for SqliteSlotStore {
    fn find_planning_records(&self, order_id: &str) -> RepositoryResult<Vec<PlanningRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT order_id, workline_id, plan_date, slots_json
            FROM planning_slot
            WHERE order_id = ?1
            ORDER BY plan_date, workline_id
            "#,
        )?;

        let rows = stmt
            .query_map(params![order_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(o, w, d, s)| Self::planning_from_row(o, w, d, s))
            .collect()
    }

    fn find_planning_record(
        &self,
        order_id: &str,
        workline_id: &str,
        plan_date: NaiveDate,
    ) -> RepositoryResult<Option<PlanningRecord>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT order_id, workline_id, plan_date, slots_json
                FROM planning_slot
                WHERE order_id = ?1 AND workline_id = ?2 AND plan_date = ?3
                "#,
                params![order_id, workline_id, plan_date.format(DATE_FMT).to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(o, w, d, s)| Self::planning_from_row(o, w, d, s))
            .transpose()
    }

    fn upsert_planning_record(&self, record: &PlanningRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::upsert_planning_tx(&conn, record)
    }

    fn delete_planning_record(&self, key: &PlanningKey) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::delete_planning_tx(&conn, key)
    }

    fn delete_planning_records(
        &self,
        order_id: &str,
        date_from: Option<NaiveDate>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        Self::delete_planning_from_tx(&conn, order_id, date_from)
    }

    fn find_summary_record(
        &self,
        plan_date: NaiveDate,
        summary_type: SummaryType,
    ) -> RepositoryResult<Option<SummaryRecord>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT plan_date, slots_json
                FROM summary_slot
                WHERE plan_date = ?1 AND summary_type = ?2
                "#,
                params![plan_date.format(DATE_FMT).to_string(), summary_type.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        row.map(|(d, s)| {
            Ok(SummaryRecord {
                plan_date: Self::parse_date(&d)?,
                summary_type,
                slots: Self::parse_slots(&s)?,
            })
        })
        .transpose()
    }

    fn upsert_summary_record(&self, record: &SummaryRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::upsert_summary_tx(&conn, record)
    }

    fn delete_summary_record(
        &self,
        plan_date: NaiveDate,
        summary_type: SummaryType,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::delete_summary_tx(&conn, plan_date, summary_type)
    }

    fn apply(&self, batch: &[PlanningWrite]) -> RepositoryResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let conn = self.get_conn()?;
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        for write in batch {
            if let Err(err) = Self::apply_one(&conn, write) {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(err);
            }
        }

        conn.execute_batch("COMMIT")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }
}
