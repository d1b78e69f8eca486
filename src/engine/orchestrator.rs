// ==========================================
// 招生录取分配系统 - 引擎编排器
// ==========================================
// 用途: 协调准备 → 及格线过滤 → 通道拆分 → 四阶段分配 → 汇总
// 红线: 对相同输入重复运行必须得到完全相同的结果
// ==========================================

use crate::domain::allocation::AllocationResult;
use crate::domain::candidate::Candidate;
use crate::domain::program::ProgramRegistry;
use crate::domain::types::AcademicTrack;
use crate::engine::aggregator::ResultAggregator;
use crate::engine::allocation::{AllocationEngine, AllocationState};
use crate::engine::cohort::CohortSplitter;
use crate::engine::eligibility::EligibilityFilter;
use crate::engine::error::EngineResult;
use crate::engine::preparation::CandidatePreparer;
use tracing::{info, instrument};

// ==========================================
// AdmissionOutcome - 一次运行的完整输出
// ==========================================
#[derive(Debug, Clone)]
pub struct AdmissionOutcome {
    pub result: AllocationResult,
    pub candidates: Vec<Candidate>, // 输入顺序,带最终分配状态
    pub registry: ProgramRegistry,  // 带最终占用数
}

// ==========================================
// AdmissionOrchestrator - 引擎编排器
// ==========================================
pub struct AdmissionOrchestrator {
    preparer: CandidatePreparer,
    eligibility: EligibilityFilter,
    allocator: AllocationEngine,
    aggregator: ResultAggregator,
}

impl AdmissionOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - threshold: 绝对及格线（NaN / 无穷 / 负数返回错误）
    pub fn new(threshold: f64) -> EngineResult<Self> {
        Ok(Self {
            preparer: CandidatePreparer::new(),
            eligibility: EligibilityFilter::new(threshold)?,
            allocator: AllocationEngine::new(threshold),
            aggregator: ResultAggregator::new(threshold),
        })
    }

    pub fn threshold(&self) -> f64 {
        self.eligibility.threshold()
    }

    /// 执行一次完整分配
    ///
    /// 输入的考生与专业会先被清空分配状态,因此对上一次运行的输出再次调用
    /// 与对原始输入调用结果一致。
    #[instrument(skip(self, candidates, registry), fields(
        candidates = candidates.len(),
        programs = registry.len(),
        threshold = self.threshold()
    ))]
    pub fn run(
        &self,
        candidates: Vec<Candidate>,
        registry: ProgramRegistry,
    ) -> EngineResult<AdmissionOutcome> {
        let registry = self.preparer.prepare_registry(registry)?;
        let candidates = self.preparer.prepare(candidates)?;

        let partition = self.eligibility.partition(&candidates);
        let cohorts = CohortSplitter::split(&candidates, &partition.eligible);
        let curve_pool: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.track == AcademicTrack::Direct)
            .map(|(idx, _)| idx)
            .collect();

        info!(
            direct = cohorts.direct.len(),
            free = cohorts.free.len(),
            below_threshold = partition.below_threshold.len(),
            "开始四阶段分配"
        );

        let state = AllocationState::new(candidates, registry, cohorts, curve_pool)?;
        let state = self.allocator.run(state);
        let result = self.aggregator.aggregate(&state);

        Ok(AdmissionOutcome {
            result,
            candidates: state.candidates,
            registry: state.registry,
        })
    }
}

impl Default for AdmissionOrchestrator {
    fn default() -> Self {
        Self {
            preparer: CandidatePreparer::new(),
            eligibility: EligibilityFilter::default(),
            allocator: AllocationEngine::default(),
            aggregator: ResultAggregator::new(crate::engine::eligibility::DEFAULT_PASSING_THRESHOLD),
        }
    }
}
