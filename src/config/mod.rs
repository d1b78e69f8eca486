// ==========================================
// 招生录取分配系统 - 配置层
// ==========================================
// 职责: 招生参数管理,默认专业目录
// 存储: config_kv 表
// ==========================================

pub mod admission_config;
pub mod config_manager;

// 重导出核心配置管理器
pub use admission_config::{default_curve, AdmissionConfig};
pub use config_manager::{config_keys, ConfigManager};
