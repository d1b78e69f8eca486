// ==========================================
// 招生录取分配系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 按分数与志愿把考生分配到有限名额的专业
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 四阶段分配
pub mod engine;

// 导入导出层 - 外部数据
pub mod importer;

// 配置层 - 招生参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AcademicTrack, AllocationPhase, DqLevel, ExamCategory, RejectionReason};

// 领域实体
pub use domain::{
    AllocationResult, Candidate, ImportReport, OccupancyStats, Program, ProgramRegistry,
    ProgramRoster, RejectedCandidate,
};

// 引擎
pub use engine::{
    AdmissionOrchestrator, AdmissionOutcome, AllocationEngine, CandidatePreparer, CohortSplitter,
    EligibilityFilter, EngineError, ResultAggregator, TieBreakComparator,
};

// API
pub use api::{AdmissionApi, ApiError, ApiResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "招生录取分配系统";
