// ==========================================
// 招生录取分配系统 - 分配结果模型
// ==========================================
// 用途: 引擎输出,报表/持久化只读
// ==========================================

use crate::domain::types::{AcademicTrack, AllocationPhase, RejectionReason};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 名单中的一条录取记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionEntry {
    pub candidate_code: String,
    pub full_name: String,
    pub track: AcademicTrack,
    pub phase: AllocationPhase, // 录取所在阶段
    pub total_score: f64,       // 最终分数（含已消耗曲线）
    pub curve_applied: f64,
}

/// 单个专业的录取名单与占用情况
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramRoster {
    pub program_name: String,
    pub program_code: String,
    pub capacity: i32,
    pub occupied: i32,
    pub occupancy_percentage: f64,
    pub admitted: Vec<AdmissionEntry>, // 按排序规则,最优在前
}

impl ProgramRoster {
    pub fn admitted_codes(&self) -> Vec<&str> {
        self.admitted.iter().map(|e| e.candidate_code.as_str()).collect()
    }
}

/// 未录取考生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub candidate_code: String,
    pub full_name: String,
    pub track: AcademicTrack,
    pub total_score: f64,
    pub reason: RejectionReason,
}

/// 无法在专业目录中找到的志愿
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedReference {
    pub candidate_code: String,
    pub program_name: String,
    pub phase: AllocationPhase,
}

/// 汇总统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OccupancyStats {
    pub total_candidates: usize,
    pub total_admitted: usize,
    pub total_rejected: usize,
    pub total_capacity: i64,
    pub total_occupied: i64,
    pub occupancy_percentage: f64,
}

// ==========================================
// AllocationResult - 分配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    pub rosters: Vec<ProgramRoster>, // 专业目录顺序
    pub rejected: Vec<RejectedCandidate>,
    pub unmatched: Vec<UnmatchedReference>,
    pub admitted_by_phase: BTreeMap<AllocationPhase, usize>,
    pub stats: OccupancyStats,
}

impl AllocationResult {
    pub fn roster(&self, program_name: &str) -> Option<&ProgramRoster> {
        self.rosters.iter().find(|r| r.program_name == program_name)
    }

    pub fn rejected_codes(&self) -> Vec<&str> {
        self.rejected.iter().map(|r| r.candidate_code.as_str()).collect()
    }

    pub fn admitted_in_phase(&self, phase: AllocationPhase) -> usize {
        self.admitted_by_phase.get(&phase).copied().unwrap_or(0)
    }
}
