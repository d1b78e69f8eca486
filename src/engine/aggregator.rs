// ==========================================
// 招生录取分配系统 - 结果汇总
// ==========================================
// 职责: 将分配快照整理为各专业录取名单、未录取名单与统计
// 红线: 只读快照,不修改任何考生或专业
// ==========================================

use crate::domain::allocation::{
    AdmissionEntry, AllocationResult, OccupancyStats, ProgramRoster, RejectedCandidate,
};
use crate::domain::candidate::Candidate;
use crate::domain::program::{percentage, ProgramRegistry};
use crate::domain::types::{AllocationPhase, RejectionReason};
use crate::engine::allocation::AllocationState;
use crate::engine::eligibility::meets_threshold;
use crate::engine::tie_break::TieBreakComparator;
use std::collections::BTreeMap;
use tracing::{info, instrument};

pub struct ResultAggregator {
    threshold: f64,
}

impl ResultAggregator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// 汇总分配结果
    #[instrument(skip(self, state), fields(admissions = state.admissions.len()))]
    pub fn aggregate(&self, state: &AllocationState) -> AllocationResult {
        let rosters = Self::build_rosters(state);
        let rejected = self.build_rejected(&state.candidates, &state.registry);

        let mut admitted_by_phase: BTreeMap<AllocationPhase, usize> =
            AllocationPhase::ORDERED.iter().map(|&p| (p, 0)).collect();
        for record in &state.admissions {
            *admitted_by_phase.entry(record.phase).or_insert(0) += 1;
        }

        let total_capacity = state.registry.total_capacity();
        let total_occupied = state.registry.total_occupied();
        let stats = OccupancyStats {
            total_candidates: state.candidates.len(),
            total_admitted: state.admissions.len(),
            total_rejected: rejected.len(),
            total_capacity,
            total_occupied,
            occupancy_percentage: percentage(total_occupied, total_capacity),
        };

        info!(
            admitted = stats.total_admitted,
            rejected = stats.total_rejected,
            unmatched = state.unmatched.len(),
            occupancy = stats.occupancy_percentage,
            "分配结果汇总完成"
        );

        AllocationResult {
            rosters,
            rejected,
            unmatched: state.unmatched.clone(),
            admitted_by_phase,
            stats,
        }
    }

    /// 专业目录顺序;名单内按排序规则（最终分数）排列
    fn build_rosters(state: &AllocationState) -> Vec<ProgramRoster> {
        state
            .registry
            .iter()
            .map(|program| {
                let mut members: Vec<(usize, AllocationPhase)> = state
                    .admissions
                    .iter()
                    .filter(|r| r.program_name == program.name)
                    .map(|r| (r.candidate, r.phase))
                    .collect();
                members.sort_by(|a, b| {
                    TieBreakComparator::compare(&state.candidates[a.0], &state.candidates[b.0])
                });

                let admitted = members
                    .into_iter()
                    .map(|(idx, phase)| {
                        let candidate = &state.candidates[idx];
                        AdmissionEntry {
                            candidate_code: candidate.code.clone(),
                            full_name: candidate.full_name.clone(),
                            track: candidate.track,
                            phase,
                            total_score: candidate.total_score(),
                            curve_applied: candidate.curve_applied(),
                        }
                    })
                    .collect();

                ProgramRoster {
                    program_name: program.name.clone(),
                    program_code: program.code.clone(),
                    capacity: program.capacity,
                    occupied: program.occupied(),
                    occupancy_percentage: program.occupancy_percentage(),
                    admitted,
                }
            })
            .collect()
    }

    /// 未录取考生,保持输入顺序
    fn build_rejected(
        &self,
        candidates: &[Candidate],
        registry: &ProgramRegistry,
    ) -> Vec<RejectedCandidate> {
        candidates
            .iter()
            .filter(|c| !c.is_admitted())
            .map(|c| RejectedCandidate {
                candidate_code: c.code.clone(),
                full_name: c.full_name.clone(),
                track: c.track,
                total_score: c.total_score(),
                reason: self.rejection_reason(c, registry),
            })
            .collect()
    }

    fn rejection_reason(&self, candidate: &Candidate, registry: &ProgramRegistry) -> RejectionReason {
        if !meets_threshold(candidate.total_score(), self.threshold) {
            return RejectionReason::BelowThreshold;
        }

        let first_known = registry.contains(&candidate.first_choice);
        let second_known = candidate
            .second_choice
            .as_deref()
            .is_some_and(|name| registry.contains(name));

        if first_known || second_known {
            RejectionReason::NoVacancy
        } else {
            RejectionReason::UnmatchedProgram
        }
    }
}
