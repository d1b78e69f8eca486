// ==========================================
// 招生录取分配系统 - 分配运行记录仓储
// ==========================================
// 职责: 每次分配运行留痕（汇总统计 + 配置快照）
// 存储: 分阶段统计与专业统计以 JSON 文本落库
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::allocation::AllocationResult;
use crate::domain::types::AllocationPhase;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 单专业统计（运行记录内）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramRunStat {
    pub program_name: String,
    pub capacity: i32,
    pub occupied: i32,
    pub occupancy_percentage: f64,
}

/// 分配运行记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRunRecord {
    pub run_id: String,
    pub executed_at: NaiveDateTime,
    pub exam_name: String,
    pub threshold: f64,
    pub total_candidates: usize,
    pub total_admitted: usize,
    pub total_rejected: usize,
    pub total_capacity: i64,
    pub total_occupied: i64,
    pub admitted_by_phase: BTreeMap<AllocationPhase, usize>,
    pub program_stats: Vec<ProgramRunStat>,
    pub config_snapshot_json: Option<String>,
}

impl AllocationRunRecord {
    /// 由分配结果生成运行记录
    pub fn from_result(
        run_id: impl Into<String>,
        executed_at: NaiveDateTime,
        exam_name: impl Into<String>,
        threshold: f64,
        result: &AllocationResult,
        config_snapshot_json: Option<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            executed_at,
            exam_name: exam_name.into(),
            threshold,
            total_candidates: result.stats.total_candidates,
            total_admitted: result.stats.total_admitted,
            total_rejected: result.stats.total_rejected,
            total_capacity: result.stats.total_capacity,
            total_occupied: result.stats.total_occupied,
            admitted_by_phase: result.admitted_by_phase.clone(),
            program_stats: result
                .rosters
                .iter()
                .map(|r| ProgramRunStat {
                    program_name: r.program_name.clone(),
                    capacity: r.capacity,
                    occupied: r.occupied,
                    occupancy_percentage: r.occupancy_percentage,
                })
                .collect(),
            config_snapshot_json,
        }
    }
}

// ==========================================
// AllocationRunRepository - 运行记录仓储
// ==========================================
pub struct AllocationRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AllocationRunRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入运行记录
    pub fn insert(&self, record: &AllocationRunRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        Self::insert_tx(&tx, record)?;
        tx.commit()?;
        Ok(())
    }

    /// 在调用方事务中写入运行记录
    pub fn insert_tx(tx: &Transaction, record: &AllocationRunRecord) -> RepositoryResult<()> {
        let admitted_by_phase_json = serde_json::to_string(&record.admitted_by_phase)?;
        let program_stats_json = serde_json::to_string(&record.program_stats)?;

        tx.execute(
            r#"
            INSERT INTO allocation_run (
                run_id, executed_at, exam_name, threshold,
                total_candidates, total_admitted, total_rejected,
                total_capacity, total_occupied,
                admitted_by_phase_json, program_stats_json, config_snapshot_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.run_id,
                record.executed_at.format(DATETIME_FORMAT).to_string(),
                record.exam_name,
                record.threshold,
                record.total_candidates as i64,
                record.total_admitted as i64,
                record.total_rejected as i64,
                record.total_capacity,
                record.total_occupied,
                admitted_by_phase_json,
                program_stats_json,
                record.config_snapshot_json,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, run_id: &str) -> RepositoryResult<Option<AllocationRunRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE run_id = ?1", SELECT_COLUMNS))?;
        let row = stmt.query_row(params![run_id], map_row).optional()?;
        row.map(RawRunRow::into_record).transpose()
    }

    /// 最近的运行记录（最新在前）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<AllocationRunRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY executed_at DESC, rowid DESC LIMIT ?1",
            SELECT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![limit as i64], map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRunRow::into_record).collect()
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT run_id, executed_at, exam_name, threshold,
           total_candidates, total_admitted, total_rejected,
           total_capacity, total_occupied,
           admitted_by_phase_json, program_stats_json, config_snapshot_json
    FROM allocation_run
"#;

// 行数据先按原样读出,再解析 JSON 与时间
struct RawRunRow {
    run_id: String,
    executed_at: String,
    exam_name: String,
    threshold: f64,
    total_candidates: i64,
    total_admitted: i64,
    total_rejected: i64,
    total_capacity: i64,
    total_occupied: i64,
    admitted_by_phase_json: String,
    program_stats_json: String,
    config_snapshot_json: Option<String>,
}

impl RawRunRow {
    fn into_record(self) -> RepositoryResult<AllocationRunRecord> {
        let executed_at = NaiveDateTime::parse_from_str(&self.executed_at, DATETIME_FORMAT).map_err(|e| {
            RepositoryError::FieldValueError {
                field: "executed_at".to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(AllocationRunRecord {
            run_id: self.run_id,
            executed_at,
            exam_name: self.exam_name,
            threshold: self.threshold,
            total_candidates: self.total_candidates as usize,
            total_admitted: self.total_admitted as usize,
            total_rejected: self.total_rejected as usize,
            total_capacity: self.total_capacity,
            total_occupied: self.total_occupied,
            admitted_by_phase: serde_json::from_str(&self.admitted_by_phase_json)?,
            program_stats: serde_json::from_str(&self.program_stats_json)?,
            config_snapshot_json: self.config_snapshot_json,
        })
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<RawRunRow> {
    Ok(RawRunRow {
        run_id: row.get(0)?,
        executed_at: row.get(1)?,
        exam_name: row.get(2)?,
        threshold: row.get(3)?,
        total_candidates: row.get(4)?,
        total_admitted: row.get(5)?,
        total_rejected: row.get(6)?,
        total_capacity: row.get(7)?,
        total_occupied: row.get(8)?,
        admitted_by_phase_json: row.get(9)?,
        program_stats_json: row.get(10)?,
        config_snapshot_json: row.get(11)?,
    })
}
