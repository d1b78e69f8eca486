// ==========================================
// 招生录取分配系统 - 引擎错误类型
// ==========================================
// 只用于调用方违反契约的情况,领域内可预期的状态（志愿无法匹配、
// 名额用尽、日期缺失）不会产生错误
// ==========================================

use crate::domain::program::RegistryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("及格线无效: {0}")]
    InvalidThreshold(f64),

    #[error("专业名额为负数: program={program}, capacity={capacity}")]
    NegativeCapacity { program: String, capacity: i32 },

    #[error("曲线加分无效: program={program}, curve_bonus={value}")]
    InvalidCurveBonus { program: String, value: f64 },

    #[error("专业最低分无效: program={program}, minimum_score={value}")]
    InvalidMinimumScore { program: String, value: f64 },

    #[error("考生编号为空 (位置 {position})")]
    EmptyCandidateCode { position: usize },

    #[error("考生分数无效: candidate={candidate}, field={field}, value={value}")]
    InvalidScore {
        candidate: String,
        field: &'static str,
        value: f64,
    },

    #[error("考生下标越界: set={set}, index={index}, candidates={len}")]
    IndexOutOfRange {
        set: &'static str,
        index: usize,
        len: usize,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
