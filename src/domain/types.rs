// ==========================================
// 招生录取分配系统 - 领域类型定义
// ==========================================
// 职责: 学术通道 / 考试类别 / 分配阶段 / 未录取原因
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 学术通道 (Academic Track)
// ==========================================
// DIRECT: 应届直招考生; FREE: 自由生通道（优先级更低）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcademicTrack {
    Direct,
    Free,
}

impl AcademicTrack {
    /// 从外部字符串解析（兼容源数据中的 POSTULANTE / ALUMNO_LIBRE）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "DIRECT" | "POSTULANTE" => Some(AcademicTrack::Direct),
            "FREE" | "ALUMNO_LIBRE" | "ALUMNO LIBRE" => Some(AcademicTrack::Free),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AcademicTrack::Direct => "DIRECT",
            AcademicTrack::Free => "FREE",
        }
    }
}

impl fmt::Display for AcademicTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 考试类别 (Exam Category)
// ==========================================
// 决定专业默认使用哪条加分曲线
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamCategory {
    Ingenieria,
    Fca,
    Medicina,
    General,
}

impl ExamCategory {
    pub const ALL: [ExamCategory; 4] = [
        ExamCategory::Ingenieria,
        ExamCategory::Fca,
        ExamCategory::Medicina,
        ExamCategory::General,
    ];

    /// 根据专业名称推断考试类别
    ///
    /// 规则（忽略大小写与重音）:
    /// - INGENIERIA / SISTEMAS → INGENIERIA
    /// - ADMINISTRACION / CONTABILIDAD / ECONOMIA → FCA
    /// - MEDICINA / ENFERMERIA / ODONTOLOGIA → MEDICINA
    /// - 其他 → GENERAL
    pub fn from_program_name(name: &str) -> Self {
        let normalized = fold_accents(&name.to_uppercase());

        if normalized.contains("INGENIERIA") || normalized.contains("SISTEMAS") {
            ExamCategory::Ingenieria
        } else if normalized.contains("ADMINISTRACION")
            || normalized.contains("CONTABILIDAD")
            || normalized.contains("ECONOMIA")
        {
            ExamCategory::Fca
        } else if normalized.contains("MEDICINA")
            || normalized.contains("ENFERMERIA")
            || normalized.contains("ODONTOLOGIA")
        {
            ExamCategory::Medicina
        } else {
            ExamCategory::General
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "INGENIERIA" => Some(ExamCategory::Ingenieria),
            "FCA" => Some(ExamCategory::Fca),
            "MEDICINA" => Some(ExamCategory::Medicina),
            "GENERAL" => Some(ExamCategory::General),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExamCategory::Ingenieria => "INGENIERIA",
            ExamCategory::Fca => "FCA",
            ExamCategory::Medicina => "MEDICINA",
            ExamCategory::General => "GENERAL",
        }
    }
}

impl fmt::Display for ExamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 去除西语重音（仅处理大写元音与 Ñ 以外的常见字符）
pub fn fold_accents(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            'Á' | 'À' | 'Ä' => 'A',
            'É' | 'È' | 'Ë' => 'E',
            'Í' | 'Ì' | 'Ï' => 'I',
            'Ó' | 'Ò' | 'Ö' => 'O',
            'Ú' | 'Ù' | 'Ü' => 'U',
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            other => other,
        })
        .collect()
}

// ==========================================
// 分配阶段 (Allocation Phase)
// ==========================================
// 顺序即契约: FIRST_CHOICE → SECOND_CHOICE → CURVE → FREE_TRACK
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationPhase {
    FirstChoice,
    SecondChoice,
    Curve,
    FreeTrack,
}

impl AllocationPhase {
    pub const ORDERED: [AllocationPhase; 4] = [
        AllocationPhase::FirstChoice,
        AllocationPhase::SecondChoice,
        AllocationPhase::Curve,
        AllocationPhase::FreeTrack,
    ];
}

impl fmt::Display for AllocationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationPhase::FirstChoice => write!(f, "FIRST_CHOICE"),
            AllocationPhase::SecondChoice => write!(f, "SECOND_CHOICE"),
            AllocationPhase::Curve => write!(f, "CURVE"),
            AllocationPhase::FreeTrack => write!(f, "FREE_TRACK"),
        }
    }
}

// ==========================================
// 未录取原因 (Rejection Reason)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    BelowThreshold,   // 总分低于及格线（且未通过曲线录取）
    UnmatchedProgram, // 志愿专业均不在目录中
    NoVacancy,        // 合格但志愿专业名额已满
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::BelowThreshold => write!(f, "BELOW_THRESHOLD"),
            RejectionReason::UnmatchedProgram => write!(f, "UNMATCHED_PROGRAM"),
            RejectionReason::NoVacancy => write!(f, "NO_VACANCY"),
        }
    }
}

// ==========================================
// 数据质量等级 (DQ Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,    // 阻断
    Conflict, // 批内重复，阻断
    Warning,  // 保留但提示
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Error => write!(f, "ERROR"),
            DqLevel::Conflict => write!(f, "CONFLICT"),
            DqLevel::Warning => write!(f, "WARNING"),
        }
    }
}
