// ==========================================
// 招生录取分配系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表（幂等）
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;
use tracing::{info, warn};

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（全部 IF NOT EXISTS，可重复执行）
///
/// 已有库的版本高于当前代码时只告警，不做迁移。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    match read_schema_version(conn)? {
        Some(v) if v > CURRENT_SCHEMA_VERSION => {
            warn!(db_version = v, expected = CURRENT_SCHEMA_VERSION, "数据库版本高于程序版本");
        }
        v => info!(schema_version = ?v, "数据库结构已就绪"),
    }
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS program (
    name            TEXT PRIMARY KEY,
    code            TEXT NOT NULL UNIQUE,
    faculty         TEXT NOT NULL,
    capacity        INTEGER NOT NULL CHECK (capacity >= 0),
    occupied        INTEGER NOT NULL DEFAULT 0 CHECK (occupied >= 0 AND occupied <= capacity),
    minimum_score   REAL NOT NULL,
    exam_category   TEXT NOT NULL,
    curve_bonus     REAL NOT NULL DEFAULT 0 CHECK (curve_bonus >= 0),
    active          INTEGER NOT NULL DEFAULT 1,
    sort_order      INTEGER NOT NULL,
    updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS candidate (
    code             TEXT PRIMARY KEY,
    national_id      TEXT NOT NULL,
    full_name        TEXT NOT NULL,
    modality         TEXT NOT NULL,
    sex              TEXT,
    aptitude_score   REAL NOT NULL,
    knowledge_score  REAL NOT NULL,
    first_choice     TEXT NOT NULL,
    second_choice    TEXT,
    track            TEXT NOT NULL,
    birth_date       TEXT,
    registered_at    TEXT,
    graduation_date  TEXT,
    admitted         INTEGER NOT NULL DEFAULT 0,
    admitted_program TEXT,
    curve_applied    REAL NOT NULL DEFAULT 0,
    total_score      REAL NOT NULL,
    import_batch_id  TEXT,
    updated_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_candidate_admitted_program ON candidate (admitted_program);
CREATE INDEX IF NOT EXISTS idx_candidate_national_id ON candidate (national_id);

CREATE TABLE IF NOT EXISTS allocation_run (
    run_id                  TEXT PRIMARY KEY,
    executed_at             TEXT NOT NULL,
    exam_name               TEXT NOT NULL,
    threshold               REAL NOT NULL,
    total_candidates        INTEGER NOT NULL,
    total_admitted          INTEGER NOT NULL,
    total_rejected          INTEGER NOT NULL,
    total_capacity          INTEGER NOT NULL,
    total_occupied          INTEGER NOT NULL,
    admitted_by_phase_json  TEXT NOT NULL,
    program_stats_json      TEXT NOT NULL,
    config_snapshot_json    TEXT
);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }
}
