// ==========================================
// 招生录取分配系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行入口调用
// ==========================================

pub mod admission_api;
pub mod error;

// 重导出核心类型
pub use admission_api::{get_default_db_path, AdmissionApi, AllocationRunResponse, ImportApiResponse};
pub use error::{ApiError, ApiResult};
