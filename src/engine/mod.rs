// ==========================================
// 招生录取分配系统 - 引擎层
// ==========================================
// 职责: 实现录取分配规则,不拼 SQL
// 红线: Engine 不访问数据库;未录取考生必须带原因
// ==========================================

pub mod aggregator;
pub mod allocation;
pub mod cohort;
pub mod eligibility;
pub mod error;
pub mod orchestrator;
pub mod preparation;
pub mod tie_break;

// 重导出核心引擎
pub use aggregator::ResultAggregator;
pub use allocation::{AdmissionRecord, AllocationEngine, AllocationState, PhaseContext};
pub use cohort::{CohortSplitter, Cohorts};
pub use eligibility::{
    meets_threshold, EligibilityFilter, EligibilityPartition, DEFAULT_PASSING_THRESHOLD,
};
pub use error::{EngineError, EngineResult};
pub use orchestrator::{AdmissionOrchestrator, AdmissionOutcome};
pub use preparation::CandidatePreparer;
pub use tie_break::TieBreakComparator;
