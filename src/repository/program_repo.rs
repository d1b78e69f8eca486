// ==========================================
// 招生录取分配系统 - 专业数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: sort_order 决定专业目录顺序（首次写入时分配,之后不变）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::program::Program;
use crate::domain::types::ExamCategory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT name, code, faculty, capacity, occupied, minimum_score,
           exam_category, curve_bonus, active
    FROM program
"#;

// ==========================================
// ProgramRepository - 专业仓储
// ==========================================
pub struct ProgramRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProgramRepository {
    /// 创建新的专业仓储实例
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

    /// 批量写入专业（按名称 upsert）
    ///
    /// # 说明
    /// - 新专业追加到目录末尾
    /// - 已有专业更新参数,保留 sort_order;occupied 截断到新名额内
    /// - 使用事务确保原子性
    pub fn batch_upsert(&self, programs: &[Program]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for program in programs {
            tx.execute(
                r#"
                INSERT INTO program (
                    name, code, faculty, capacity, occupied, minimum_score,
                    exam_category, curve_bonus, active, sort_order
                ) VALUES (
                    ?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8,
                    (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM program)
                )
                ON CONFLICT(name) DO UPDATE SET
                    code = excluded.code,
                    faculty = excluded.faculty,
                    capacity = excluded.capacity,
                    occupied = MIN(program.occupied, excluded.capacity),
                    minimum_score = excluded.minimum_score,
                    exam_category = excluded.exam_category,
                    curve_bonus = excluded.curve_bonus,
                    active = excluded.active,
                    updated_at = datetime('now')
                "#,
                params![
                    program.name,
                    program.code,
                    program.faculty,
                    program.capacity,
                    program.minimum_score,
                    program.exam_category.as_str(),
                    program.curve_bonus,
                    program.active,
                ],
            )?;
            count += 1;
        }

        tx.commit()?;
        Ok(count)
    }

    /// 查询启用的专业（目录顺序）
    pub fn find_active(&self) -> RepositoryResult<Vec<Program>> {
        self.query_programs(&format!("{} WHERE active = 1 ORDER BY sort_order", SELECT_COLUMNS))
    }

    /// 查询全部专业（目录顺序）
    pub fn find_all(&self) -> RepositoryResult<Vec<Program>> {
        self.query_programs(&format!("{} ORDER BY sort_order", SELECT_COLUMNS))
    }

    /// 按名称查询
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Program>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE name = ?1", SELECT_COLUMNS))?;
        let program = stmt.query_row(params![name], map_program).optional()?;
        Ok(program)
    }

    /// 回写占用数（一次分配结束后调用）
    pub fn update_occupancy(&self, programs: &[Program]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let count = Self::update_occupancy_tx(&tx, programs)?;
        tx.commit()?;
        Ok(count)
    }

    /// 在调用方事务中回写占用数
    pub fn update_occupancy_tx(tx: &Transaction, programs: &[Program]) -> RepositoryResult<usize> {
        let mut stmt =
            tx.prepare("UPDATE program SET occupied = ?1, updated_at = datetime('now') WHERE name = ?2")?;

        let mut count = 0;
        for program in programs {
            count += stmt.execute(params![program.occupied(), program.name])?;
        }
        Ok(count)
    }

    /// 停用专业（软删除）
    pub fn deactivate(&self, name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE program SET active = 0, updated_at = datetime('now') WHERE name = ?1",
            params![name],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Program".to_string(),
                id: name.to_string(),
            });
        }
        Ok(())
    }

    fn query_programs(&self, sql: &str) -> RepositoryResult<Vec<Program>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let programs = stmt
            .query_map([], map_program)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(programs)
    }
}

fn map_program(row: &Row<'_>) -> rusqlite::Result<Program> {
    let name: String = row.get(0)?;
    let category: String = row.get(6)?;
    let exam_category =
        ExamCategory::parse(&category).unwrap_or_else(|| ExamCategory::from_program_name(&name));

    let mut program = Program::new(row.get::<_, String>(1)?, name, row.get::<_, String>(2)?, row.get(3)?)
        .with_minimum_score(row.get(5)?)
        .with_category(exam_category)
        .with_curve(row.get(7)?);
    program.active = row.get(8)?;
    program.restore_occupancy(row.get(4)?);
    Ok(program)
}
