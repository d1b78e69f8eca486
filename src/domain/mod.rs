// ==========================================
// 招生录取分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、结果对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod allocation;
pub mod candidate;
pub mod import;
pub mod program;
pub mod types;

// 重导出核心类型
pub use allocation::{
    AdmissionEntry, AllocationResult, OccupancyStats, ProgramRoster, RejectedCandidate,
    UnmatchedReference,
};
pub use candidate::Candidate;
pub use import::{DqSummary, DqViolation, ImportReport, RawCandidateRecord};
pub use program::{percentage, Program, ProgramRegistry, RegistryError, DEFAULT_MINIMUM_SCORE};
pub use types::{AcademicTrack, AllocationPhase, DqLevel, ExamCategory, RejectionReason};
