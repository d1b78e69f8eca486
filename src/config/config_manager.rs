// ==========================================
// 招生录取分配系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::admission_config::{
    default_curve, AdmissionConfig, DEFAULT_EXAM_NAME, DEFAULT_FREE_TRACK_WINDOW_YEARS,
};
use crate::db::open_sqlite_connection;
use crate::domain::program::DEFAULT_MINIMUM_SCORE;
use crate::domain::types::ExamCategory;
use crate::engine::eligibility::DEFAULT_PASSING_THRESHOLD;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 读取浮点配置;格式错误时告警并回退默认值
    fn get_f64_or_default(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => {
                warn!(config_key = key, raw_value = %raw, "配置值格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 在分配运行时记录配置快照
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的 global 配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    // ===== 招生参数 =====

    pub fn get_exam_name(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(config_keys::EXAM_NAME, DEFAULT_EXAM_NAME)
    }

    /// 获取绝对及格线（默认 11.0）
    pub fn get_passing_threshold(&self) -> Result<f64, Box<dyn Error>> {
        self.get_f64_or_default(config_keys::PASSING_THRESHOLD, DEFAULT_PASSING_THRESHOLD)
    }

    pub fn set_passing_threshold(&self, threshold: f64) -> Result<(), Box<dyn Error>> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(format!("及格线无效: {}", threshold).into());
        }
        self.set_global_config_value(config_keys::PASSING_THRESHOLD, &threshold.to_string())
    }

    /// 获取专业默认最低分（默认 11.0）
    pub fn get_default_minimum_score(&self) -> Result<f64, Box<dyn Error>> {
        self.get_f64_or_default(config_keys::DEFAULT_MINIMUM_SCORE, DEFAULT_MINIMUM_SCORE)
    }

    /// 获取考试类别曲线
    ///
    /// # 说明
    /// 配置键为 curve/{CATEGORY}，如 curve/FCA
    pub fn get_category_curve(&self, category: ExamCategory) -> Result<f64, Box<dyn Error>> {
        let key = config_keys::curve_key(category);
        let value = self.get_f64_or_default(&key, default_curve(category))?;
        if value < 0.0 {
            warn!(config_key = %key, value, "曲线加分为负数，使用默认值");
            return Ok(default_curve(category));
        }
        Ok(value)
    }

    pub fn set_category_curve(&self, category: ExamCategory, curve: f64) -> Result<(), Box<dyn Error>> {
        if !curve.is_finite() || curve < 0.0 {
            return Err(format!("曲线加分无效: {}", curve).into());
        }
        self.set_global_config_value(&config_keys::curve_key(category), &curve.to_string())
    }

    /// 获取自由通道判定窗口（年）
    pub fn get_free_track_window_years(&self) -> Result<u32, Box<dyn Error>> {
        let value = self.get_config_or_default(
            config_keys::FREE_TRACK_WINDOW_YEARS,
            &DEFAULT_FREE_TRACK_WINDOW_YEARS.to_string(),
        )?;
        Ok(value.trim().parse::<u32>().unwrap_or(DEFAULT_FREE_TRACK_WINDOW_YEARS))
    }

    /// 组装完整招生参数
    pub fn load_admission_config(&self) -> Result<AdmissionConfig, Box<dyn Error>> {
        let mut category_curves = BTreeMap::new();
        for category in ExamCategory::ALL {
            category_curves.insert(category, self.get_category_curve(category)?);
        }

        Ok(AdmissionConfig {
            exam_name: self.get_exam_name()?,
            passing_threshold: self.get_passing_threshold()?,
            default_minimum_score: self.get_default_minimum_score()?,
            category_curves,
            free_track_window_years: self.get_free_track_window_years()?,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    use crate::domain::types::ExamCategory;

    pub const EXAM_NAME: &str = "exam_name";
    pub const PASSING_THRESHOLD: &str = "passing_threshold";
    pub const DEFAULT_MINIMUM_SCORE: &str = "default_minimum_score";
    pub const FREE_TRACK_WINDOW_YEARS: &str = "free_track_window_years";

    // 考试类别曲线: curve/INGENIERIA, curve/FCA ...
    pub const CURVE_PREFIX: &str = "curve/";

    pub fn curve_key(category: ExamCategory) -> String {
        format!("{}{}", CURVE_PREFIX, category.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_table_empty() {
        let config = manager().load_admission_config().unwrap();
        assert_eq!(config, AdmissionConfig::default());
    }

    #[test]
    fn test_overrides_are_read_back() {
        let mgr = manager();
        mgr.set_passing_threshold(12.5).unwrap();
        mgr.set_category_curve(ExamCategory::Medicina, 0.5).unwrap();

        let config = mgr.load_admission_config().unwrap();
        assert_eq!(config.passing_threshold, 12.5);
        assert_eq!(config.curve_for(ExamCategory::Medicina), 0.5);
        assert_eq!(config.curve_for(ExamCategory::Fca), 1.5);
    }

    #[test]
    fn test_malformed_value_falls_back() {
        let mgr = manager();
        mgr.set_global_config_value(config_keys::PASSING_THRESHOLD, "once")
            .unwrap();
        assert_eq!(mgr.get_passing_threshold().unwrap(), DEFAULT_PASSING_THRESHOLD);
        assert!(mgr.set_passing_threshold(f64::NAN).is_err());
    }

    #[test]
    fn test_snapshot_restore() {
        let source = manager();
        source.set_passing_threshold(13.0).unwrap();
        let snapshot = source.get_config_snapshot().unwrap();

        let target = manager();
        let restored = target.restore_config_from_snapshot(&snapshot).unwrap();
        assert_eq!(restored, 1);
        assert_eq!(target.get_passing_threshold().unwrap(), 13.0);
    }
}
