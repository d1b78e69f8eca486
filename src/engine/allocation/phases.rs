// ==========================================
// 四个分配阶段的实现
// ==========================================
// 每个阶段接收上一阶段的快照,返回新快照
// ==========================================

use super::{AdmissionRecord, AllocationState, PhaseContext};
use crate::domain::allocation::UnmatchedReference;
use crate::domain::candidate::Candidate;
use crate::domain::types::AllocationPhase;
use crate::engine::eligibility::meets_threshold;
use crate::engine::tie_break::TieBreakComparator;
use std::collections::HashMap;
use tracing::{debug, info, warn};

// ==========================================
// 阶段 1: 第一志愿
// ==========================================

/// 合格 DIRECT 考生按第一志愿分组,组内排序后按名额录取
pub(super) fn first_choice(mut state: AllocationState, _ctx: &PhaseContext) -> AllocationState {
    let groups = group_by_choice(&state.candidates, &state.cohorts.direct, |c| {
        Some(c.first_choice.as_str())
    });

    for (program_name, mut members) in groups {
        if !state.registry.contains(&program_name) {
            record_unmatched(&mut state, &members, &program_name, AllocationPhase::FirstChoice);
            continue;
        }

        TieBreakComparator::sort_indices(&state.candidates, &mut members);
        let admitted = admit_ranked(
            &mut state,
            &program_name,
            &members,
            AllocationPhase::FirstChoice,
            None,
        );
        info!(program = %program_name, applicants = members.len(), admitted, "第一志愿录取");
    }

    state
}

// ==========================================
// 阶段 2: 第二志愿
// ==========================================

/// 未录取的合格 DIRECT 考生按第二志愿分组;已满专业跳过
pub(super) fn second_choice(mut state: AllocationState, _ctx: &PhaseContext) -> AllocationState {
    let pending: Vec<usize> = unadmitted(&state.candidates, &state.cohorts.direct);
    let groups = group_by_choice(&state.candidates, &pending, |c| c.second_choice.as_deref());

    for (program_name, mut members) in groups {
        if !state.registry.contains(&program_name) {
            record_unmatched(&mut state, &members, &program_name, AllocationPhase::SecondChoice);
            continue;
        }

        if state.registry.get(&program_name).is_some_and(|p| p.is_full()) {
            debug!(program = %program_name, applicants = members.len(), "专业已满,跳过第二志愿");
            continue;
        }

        TieBreakComparator::sort_indices(&state.candidates, &mut members);
        let admitted = admit_ranked(
            &mut state,
            &program_name,
            &members,
            AllocationPhase::SecondChoice,
            None,
        );
        info!(program = %program_name, applicants = members.len(), admitted, "第二志愿录取");
    }

    state
}

// ==========================================
// 阶段 3: 曲线补录
// ==========================================

/// 有余额且曲线加分为正的专业,从未录取 DIRECT 考生中补录
///
/// 入池条件: 第一或第二志愿为该专业,且 total_score + curve_bonus >= 及格线。
/// 录取时曲线分计入考生最终分数。
pub(super) fn curve(mut state: AllocationState, ctx: &PhaseContext) -> AllocationState {
    let targets: Vec<(String, f64)> = state
        .registry
        .iter()
        .filter(|p| p.has_vacancy() && p.curve_bonus > 0.0)
        .map(|p| (p.name.clone(), p.curve_bonus))
        .collect();

    for (program_name, bonus) in targets {
        let mut pool: Vec<usize> = state
            .curve_pool
            .iter()
            .copied()
            .filter(|&idx| {
                let candidate = &state.candidates[idx];
                !candidate.is_admitted()
                    && candidate.chooses(&program_name)
                    && meets_threshold(candidate.total_score() + bonus, ctx.threshold)
            })
            .collect();

        if pool.is_empty() {
            continue;
        }

        TieBreakComparator::sort_indices(&state.candidates, &mut pool);
        let admitted = admit_ranked(
            &mut state,
            &program_name,
            &pool,
            AllocationPhase::Curve,
            Some(bonus),
        );
        info!(program = %program_name, curve_bonus = bonus, pool = pool.len(), admitted, "曲线补录");
    }

    state
}

// ==========================================
// 阶段 4: 自由通道
// ==========================================

/// 仅当任一专业仍有余额时执行,不加曲线分
pub(super) fn free_track(mut state: AllocationState, _ctx: &PhaseContext) -> AllocationState {
    // 自由通道考生的无效志愿同样需要上报
    let free = state.cohorts.free.clone();
    for idx in free {
        let unknown: Vec<String> = std::iter::once(state.candidates[idx].first_choice.as_str())
            .chain(state.candidates[idx].second_choice.as_deref())
            .filter(|name| !name.trim().is_empty() && !state.registry.contains(name))
            .map(str::to_string)
            .collect();
        for name in unknown {
            record_unmatched(&mut state, &[idx], &name, AllocationPhase::FreeTrack);
        }
    }

    if !state.registry.any_vacancy() {
        info!("所有专业已满,跳过自由通道");
        return state;
    }

    let targets: Vec<String> = state
        .registry
        .iter()
        .filter(|p| p.has_vacancy())
        .map(|p| p.name.clone())
        .collect();

    for program_name in targets {
        let mut pool: Vec<usize> = state
            .cohorts
            .free
            .iter()
            .copied()
            .filter(|&idx| {
                let candidate = &state.candidates[idx];
                !candidate.is_admitted() && candidate.chooses(&program_name)
            })
            .collect();

        if pool.is_empty() {
            continue;
        }

        TieBreakComparator::sort_indices(&state.candidates, &mut pool);
        let admitted = admit_ranked(
            &mut state,
            &program_name,
            &pool,
            AllocationPhase::FreeTrack,
            None,
        );
        info!(program = %program_name, pool = pool.len(), admitted, "自由通道录取");
    }

    state
}

// ==========================================
// 辅助函数
// ==========================================

/// 按志愿专业分组;组间按首次出现排列,组内保持输入顺序
fn group_by_choice<'a, F>(
    candidates: &'a [Candidate],
    pool: &[usize],
    choice: F,
) -> Vec<(String, Vec<usize>)>
where
    F: Fn(&'a Candidate) -> Option<&'a str>,
{
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for &idx in pool {
        let Some(name) = choice(&candidates[idx]) else {
            continue;
        };
        if name.trim().is_empty() {
            continue;
        }

        match positions.get(name) {
            Some(&pos) => groups[pos].1.push(idx),
            None => {
                positions.insert(name, groups.len());
                groups.push((name.to_string(), vec![idx]));
            }
        }
    }

    groups
}

fn unadmitted(candidates: &[Candidate], pool: &[usize]) -> Vec<usize> {
    pool.iter()
        .copied()
        .filter(|&idx| !candidates[idx].is_admitted())
        .collect()
}

/// 按排序结果依次录取,名额用尽即停止
fn admit_ranked(
    state: &mut AllocationState,
    program_name: &str,
    ranked: &[usize],
    phase: AllocationPhase,
    curve_bonus: Option<f64>,
) -> usize {
    let mut admitted = 0;

    for &idx in ranked {
        if state.candidates[idx].is_admitted() {
            continue;
        }

        let Some(program) = state.registry.get_mut(program_name) else {
            break;
        };
        if !program.occupy_slot() {
            break;
        }

        let candidate = &mut state.candidates[idx];
        match curve_bonus {
            Some(bonus) => candidate.admit_with_curve(program_name, bonus),
            None => candidate.admit(program_name),
        }
        debug!(
            candidate = %candidate.code,
            program = %program_name,
            phase = %phase,
            total_score = candidate.total_score(),
            "录取"
        );

        state.admissions.push(AdmissionRecord {
            candidate: idx,
            program_name: program_name.to_string(),
            phase,
        });
        admitted += 1;
    }

    admitted
}

fn record_unmatched(
    state: &mut AllocationState,
    members: &[usize],
    program_name: &str,
    phase: AllocationPhase,
) {
    for &idx in members {
        warn!(
            candidate = %state.candidates[idx].code,
            program = %program_name,
            phase = %phase,
            "志愿专业不存在"
        );
        state.unmatched.push(UnmatchedReference {
            candidate_code: state.candidates[idx].code.clone(),
            program_name: program_name.to_string(),
            phase,
        });
    }
}
