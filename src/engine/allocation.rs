// ==========================================
// 招生录取分配系统 - 四阶段分配引擎
// ==========================================
// 职责: 在专业目录上依次执行四个分配阶段
// 阶段: 第一志愿 → 第二志愿 → 曲线补录 → 自由通道
// 红线: 阶段严格按顺序执行,每个阶段从上一阶段的完整快照开始
// 红线: 任何专业的 occupied 不超过 capacity;每位考生至多录取一次
// ==========================================

mod phases;


use crate::domain::allocation::UnmatchedReference;
use crate::domain::candidate::Candidate;
use crate::domain::program::ProgramRegistry;
use crate::domain::types::AllocationPhase;
use crate::engine::cohort::Cohorts;
use crate::engine::eligibility::DEFAULT_PASSING_THRESHOLD;
use crate::engine::error::{EngineError, EngineResult};
use tracing::{info, instrument};

// ==========================================
// AdmissionRecord - 单条录取记录
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionRecord {
    pub candidate: usize, // 考生下标
    pub program_name: String,
    pub phase: AllocationPhase,
}

// ==========================================
// AllocationState - 阶段间传递的快照
// ==========================================
// 红线: cohorts 与 curve_pool 中的下标都指向 candidates
#[derive(Debug, Clone)]
pub struct AllocationState {
    pub(crate) candidates: Vec<Candidate>,
    pub(crate) registry: ProgramRegistry,
    pub(crate) cohorts: Cohorts,       // 合格考生按通道拆分
    pub(crate) curve_pool: Vec<usize>, // 全部 DIRECT 考生（含未达及格线者）
    pub(crate) admissions: Vec<AdmissionRecord>,
    pub(crate) unmatched: Vec<UnmatchedReference>,
    pub(crate) completed: Vec<AllocationPhase>,
}

impl AllocationState {
    /// 构造初始快照,下标越界时返回 IndexOutOfRange
    pub fn new(
        candidates: Vec<Candidate>,
        registry: ProgramRegistry,
        cohorts: Cohorts,
        curve_pool: Vec<usize>,
    ) -> EngineResult<Self> {
        let len = candidates.len();
        let index_sets: [(&'static str, &[usize]); 3] = [
            ("direct", &cohorts.direct),
            ("free", &cohorts.free),
            ("curve_pool", &curve_pool),
        ];
        for (set, indices) in index_sets {
            if let Some(&index) = indices.iter().find(|&&i| i >= len) {
                return Err(EngineError::IndexOutOfRange { set, index, len });
            }
        }

        Ok(Self {
            candidates,
            registry,
            cohorts,
            curve_pool,
            admissions: Vec::new(),
            unmatched: Vec::new(),
            completed: Vec::new(),
        })
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn registry(&self) -> &ProgramRegistry {
        &self.registry
    }

    pub fn admissions(&self) -> &[AdmissionRecord] {
        &self.admissions
    }

    pub fn unmatched(&self) -> &[UnmatchedReference] {
        &self.unmatched
    }

    /// 已完成的阶段（按执行顺序）
    pub fn completed(&self) -> &[AllocationPhase] {
        &self.completed
    }

    pub fn admitted_in(&self, phase: AllocationPhase) -> usize {
        self.admissions.iter().filter(|a| a.phase == phase).count()
    }
}

/// 阶段间共享的只读参数
#[derive(Debug, Clone, Copy)]
pub struct PhaseContext {
    pub threshold: f64,
}

type PhaseStep = fn(AllocationState, &PhaseContext) -> AllocationState;

const PHASE_PIPELINE: [(AllocationPhase, PhaseStep); 4] = [
    (AllocationPhase::FirstChoice, phases::first_choice),
    (AllocationPhase::SecondChoice, phases::second_choice),
    (AllocationPhase::Curve, phases::curve),
    (AllocationPhase::FreeTrack, phases::free_track),
];

// ==========================================
// AllocationEngine - 分配引擎
// ==========================================
pub struct AllocationEngine {
    context: PhaseContext,
}

impl AllocationEngine {
    pub fn new(threshold: f64) -> Self {
        Self {
            context: PhaseContext { threshold },
        }
    }

    /// 执行四个阶段
    ///
    /// # 参数
    /// - state: 已准备好的初始快照（考生状态清空、占用数归零）
    ///
    /// # 返回
    /// 四个阶段全部完成后的快照
    #[instrument(skip(self, state), fields(
        candidates = state.candidates.len(),
        programs = state.registry.len(),
        threshold = self.context.threshold
    ))]
    pub fn run(&self, state: AllocationState) -> AllocationState {
        PHASE_PIPELINE
            .iter()
            .fold(state, |state, &(phase, step)| {
                let before = state.admissions.len();
                let mut next = step(state, &self.context);
                next.completed.push(phase);

                info!(
                    phase = %phase,
                    admitted = next.admissions.len() - before,
                    occupied = next.registry.total_occupied(),
                    capacity = next.registry.total_capacity(),
                    "分配阶段完成"
                );
                next
            })
    }
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PASSING_THRESHOLD)
    }
}
