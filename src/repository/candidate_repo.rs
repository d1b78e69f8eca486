// ==========================================
// 招生录取分配系统 - 考生数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 重新导入会清空该考生的分配状态,并按剩余录取人数重算专业占用
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::candidate::Candidate;
use crate::domain::types::AcademicTrack;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SELECT_COLUMNS: &str = r#"
    SELECT code, national_id, full_name, modality, sex,
           aptitude_score, knowledge_score, first_choice, second_choice, track,
           birth_date, registered_at, graduation_date,
           admitted_program, curve_applied
    FROM candidate
"#;

// ==========================================
// CandidateRepository - 考生仓储
// ==========================================
pub struct CandidateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CandidateRepository {
    /// 创建新的考生仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量写入考生（按编号 upsert）
    ///
    /// # 参数
    /// - candidates: 通过 DQ 校验的考生
    /// - batch_id: 导入批次 ID
    ///
    /// # 返回
    /// 写入的记录数
    pub fn batch_upsert(&self, candidates: &[Candidate], batch_id: Option<&str>) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for c in candidates {
            tx.execute(
                r#"
                INSERT INTO candidate (
                    code, national_id, full_name, modality, sex,
                    aptitude_score, knowledge_score, first_choice, second_choice, track,
                    birth_date, registered_at, graduation_date,
                    admitted, admitted_program, curve_applied, total_score, import_batch_id
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                    0, NULL, 0, ?14, ?15
                )
                ON CONFLICT(code) DO UPDATE SET
                    national_id = excluded.national_id,
                    full_name = excluded.full_name,
                    modality = excluded.modality,
                    sex = excluded.sex,
                    aptitude_score = excluded.aptitude_score,
                    knowledge_score = excluded.knowledge_score,
                    first_choice = excluded.first_choice,
                    second_choice = excluded.second_choice,
                    track = excluded.track,
                    birth_date = excluded.birth_date,
                    registered_at = excluded.registered_at,
                    graduation_date = excluded.graduation_date,
                    admitted = 0,
                    admitted_program = NULL,
                    curve_applied = 0,
                    total_score = excluded.total_score,
                    import_batch_id = excluded.import_batch_id,
                    updated_at = datetime('now')
                "#,
                params![
                    c.code,
                    c.national_id,
                    c.full_name,
                    c.modality,
                    c.sex,
                    c.aptitude_score,
                    c.knowledge_score,
                    c.first_choice,
                    c.second_choice,
                    c.track.as_str(),
                    c.birth_date.map(|d| d.format(DATE_FORMAT).to_string()),
                    c.registered_at.map(|dt| dt.format(DATETIME_FORMAT).to_string()),
                    c.graduation_date.map(|d| d.format(DATE_FORMAT).to_string()),
                    c.base_score(),
                    batch_id,
                ],
            )?;
            count += 1;
        }

        // 重新导入会清空录取状态,专业占用按库中剩余录取人数重算
        tx.execute(
            r#"
            UPDATE program SET
                occupied = MIN(capacity, (
                    SELECT COUNT(*) FROM candidate c
                    WHERE c.admitted = 1 AND c.admitted_program = program.name
                )),
                updated_at = datetime('now')
            "#,
            [],
        )?;

        tx.commit()?;
        Ok(count)
    }

    /// 查询全部考生（按编号排序）
    pub fn find_all(&self) -> RepositoryResult<Vec<Candidate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY code", SELECT_COLUMNS))?;
        let candidates = stmt
            .query_map([], map_candidate)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(candidates)
    }

    /// 按编号查询
    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Candidate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE code = ?1", SELECT_COLUMNS))?;
        let candidate = stmt.query_row(params![code], map_candidate).optional()?;
        Ok(candidate)
    }

    /// 查询某专业已录取考生
    pub fn find_admitted_to(&self, program_name: &str) -> RepositoryResult<Vec<Candidate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE admitted_program = ?1 ORDER BY total_score DESC, code",
            SELECT_COLUMNS
        ))?;
        let candidates = stmt
            .query_map(params![program_name], map_candidate)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(candidates)
    }

    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM candidate", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// 回写分配状态（录取标记 / 录取专业 / 曲线分 / 最终分）
    pub fn update_allocation_state(&self, candidates: &[Candidate]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let count = Self::update_allocation_state_tx(&tx, candidates)?;
        tx.commit()?;
        Ok(count)
    }

    /// 在调用方事务中回写分配状态
    pub fn update_allocation_state_tx(tx: &Transaction, candidates: &[Candidate]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            UPDATE candidate SET
                admitted = ?1,
                admitted_program = ?2,
                curve_applied = ?3,
                total_score = ?4,
                updated_at = datetime('now')
            WHERE code = ?5
            "#,
        )?;

        let mut count = 0;
        for c in candidates {
            count += stmt.execute(params![
                c.is_admitted(),
                c.admitted_program(),
                c.curve_applied(),
                c.total_score(),
                c.code,
            ])?;
        }
        Ok(count)
    }
}

fn map_candidate(row: &Row<'_>) -> rusqlite::Result<Candidate> {
    let track: String = row.get(9)?;
    let track = AcademicTrack::parse(&track).unwrap_or(AcademicTrack::Free);

    let mut candidate = Candidate::new(
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get(5)?,
        row.get(6)?,
        row.get::<_, String>(7)?,
        track,
    );
    candidate.full_name = row.get(2)?;
    candidate.modality = row.get(3)?;
    candidate.sex = row.get(4)?;
    candidate.second_choice = row.get(8)?;
    candidate.birth_date = parse_date(row.get(10)?);
    candidate.registered_at = parse_datetime(row.get(11)?);
    candidate.graduation_date = parse_date(row.get(12)?);
    candidate.restore_allocation(row.get(13)?, row.get(14)?);
    Ok(candidate)
}

fn parse_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).ok())
}

fn parse_datetime(value: Option<String>) -> Option<NaiveDateTime> {
    value.and_then(|s| NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT).ok())
}
