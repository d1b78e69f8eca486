// ==========================================
// 招生录取分配系统 - 导入领域模型
// ==========================================
// 用途: 字段映射后的原始记录 + 数据质量报告
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::types::DqLevel;
use serde::{Deserialize, Serialize};

// ==========================================
// RawCandidateRecord - 映射后未清洗的行
// ==========================================
// 所有字段均为可选,缺失由 DQ 校验判定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCandidateRecord {
    pub row_number: usize, // 文件中的行号（表头为第 1 行）
    pub code: Option<String>,
    pub full_name: Option<String>,
    pub first_choice: Option<String>,
    pub second_choice: Option<String>,
    pub modality: Option<String>,
    pub national_id: Option<String>,
    pub sex: Option<String>,
    pub track: Option<String>,
    pub aptitude_score: Option<String>,
    pub knowledge_score: Option<String>,
    pub registered_at: Option<String>,
    pub birth_date: Option<String>,
    pub graduation_date: Option<String>,
}

// ==========================================
// DQ 违规与汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,
    pub candidate_code: Option<String>,
    pub level: DqLevel,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize,
    pub imported: usize,
    pub blocked: usize,
    pub warning: usize,
    pub conflict: usize,
}

/// 导入结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub summary: DqSummary,
    pub violations: Vec<DqViolation>,
    pub candidates: Vec<Candidate>,
    pub elapsed_ms: u128,
}
