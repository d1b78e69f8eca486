// ==========================================
// 招生录取分配系统 - 考生准备
// ==========================================
// 职责: 契约校验 + 分配状态清零 (考生与专业)
// 输入: 原始考生列表 / 专业目录
// 输出: 顺序不变、状态清空的考生列表;占用数归零的专业目录
// 红线: 不丢弃、不重排考生;幂等
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::program::ProgramRegistry;
use crate::engine::error::{EngineError, EngineResult};
use tracing::{debug, instrument};

pub struct CandidatePreparer {
    // 无状态引擎,不需要注入依赖
}

impl CandidatePreparer {
    pub fn new() -> Self {
        Self {}
    }

    /// 准备考生
    ///
    /// total_score 由两项分数重新派生（撤销上次运行消耗的曲线分）,
    /// admitted / admitted_program 清空。
    ///
    /// # 错误
    /// - 考生编号为空
    /// - 分数为 NaN / 无穷 / 负数
    #[instrument(skip(self, candidates), fields(candidates_count = candidates.len()))]
    pub fn prepare(&self, mut candidates: Vec<Candidate>) -> EngineResult<Vec<Candidate>> {
        for (position, candidate) in candidates.iter_mut().enumerate() {
            Self::validate_candidate(position, candidate)?;
            candidate.reset_allocation();
        }

        debug!(prepared = candidates.len(), "考生准备完成");
        Ok(candidates)
    }

    /// 准备专业目录: 校验参数并将占用数归零
    ///
    /// # 错误
    /// - 名额为负数
    /// - 曲线加分为负数或非有限值
    /// - 最低分为非有限值
    #[instrument(skip(self, registry), fields(programs_count = registry.len()))]
    pub fn prepare_registry(&self, mut registry: ProgramRegistry) -> EngineResult<ProgramRegistry> {
        for program in registry.iter() {
            if program.capacity < 0 {
                return Err(EngineError::NegativeCapacity {
                    program: program.name.clone(),
                    capacity: program.capacity,
                });
            }
            if !program.curve_bonus.is_finite() || program.curve_bonus < 0.0 {
                return Err(EngineError::InvalidCurveBonus {
                    program: program.name.clone(),
                    value: program.curve_bonus,
                });
            }
            if !program.minimum_score.is_finite() {
                return Err(EngineError::InvalidMinimumScore {
                    program: program.name.clone(),
                    value: program.minimum_score,
                });
            }
        }

        registry.reset_occupancy();
        Ok(registry)
    }

    fn validate_candidate(position: usize, candidate: &Candidate) -> EngineResult<()> {
        if candidate.code.trim().is_empty() {
            return Err(EngineError::EmptyCandidateCode { position });
        }

        for (field, value) in [
            ("aptitude_score", candidate.aptitude_score),
            ("knowledge_score", candidate.knowledge_score),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidScore {
                    candidate: candidate.code.clone(),
                    field,
                    value,
                });
            }
        }

        Ok(())
    }
}

impl Default for CandidatePreparer {
    fn default() -> Self {
        Self::new()
    }
}
