// ==========================================
// 招生录取分配系统 - 及格线过滤
// ==========================================
// 职责: 按绝对及格线（默认 11.0）筛出合格考生
// 红线: 与专业最低分无关;不修改被淘汰考生
// ==========================================

use crate::domain::candidate::Candidate;
use crate::engine::error::{EngineError, EngineResult};
use tracing::info;

/// 默认绝对及格线
pub const DEFAULT_PASSING_THRESHOLD: f64 = 11.0;

/// 分数比较容差（抵消 0.1 + 0.2 一类的浮点误差）
pub const SCORE_EPSILON: f64 = 1e-9;

/// score >= threshold（带容差）
pub fn meets_threshold(score: f64, threshold: f64) -> bool {
    score + SCORE_EPSILON >= threshold
}

/// 过滤结果（下标指向传入的考生切片,保持原顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityPartition {
    pub eligible: Vec<usize>,
    pub below_threshold: Vec<usize>,
}

pub struct EligibilityFilter {
    threshold: f64,
}

impl EligibilityFilter {
    pub fn new(threshold: f64) -> EngineResult<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(EngineError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_eligible(&self, candidate: &Candidate) -> bool {
        meets_threshold(candidate.total_score(), self.threshold)
    }

    /// 返回合格考生（克隆,保持原顺序）
    pub fn filter(&self, candidates: &[Candidate]) -> Vec<Candidate> {
        candidates
            .iter()
            .filter(|c| self.is_eligible(c))
            .cloned()
            .collect()
    }

    /// 按及格线划分下标
    pub fn partition(&self, candidates: &[Candidate]) -> EligibilityPartition {
        let (eligible, below_threshold): (Vec<usize>, Vec<usize>) =
            (0..candidates.len()).partition(|&idx| self.is_eligible(&candidates[idx]));

        info!(
            threshold = self.threshold,
            eligible = eligible.len(),
            below_threshold = below_threshold.len(),
            "及格线过滤完成"
        );

        EligibilityPartition {
            eligible,
            below_threshold,
        }
    }
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PASSING_THRESHOLD,
        }
    }
}
