// ==========================================
// 招生录取分配系统 - 招生参数
// ==========================================
// 职责: 一次招生考试的全部可调参数 + 默认专业目录
// 存储: 由 ConfigManager 从 config_kv 表组装
// ==========================================

use crate::domain::program::{Program, DEFAULT_MINIMUM_SCORE};
use crate::domain::types::ExamCategory;
use crate::engine::eligibility::DEFAULT_PASSING_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 默认考试名称
pub const DEFAULT_EXAM_NAME: &str = "ADMISION UNAS";

/// 自由通道判定窗口（毕业不足 N 年视为 ALUMNO_LIBRE）
pub const DEFAULT_FREE_TRACK_WINDOW_YEARS: u32 = 1;

// ==========================================
// AdmissionConfig - 招生参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionConfig {
    pub exam_name: String,
    pub passing_threshold: f64,
    pub default_minimum_score: f64,
    pub category_curves: BTreeMap<ExamCategory, f64>,
    pub free_track_window_years: u32,
}

impl AdmissionConfig {
    /// 考试类别对应的曲线加分
    pub fn curve_for(&self, category: ExamCategory) -> f64 {
        self.category_curves
            .get(&category)
            .copied()
            .unwrap_or_else(|| default_curve(category))
    }

    /// 按本配置创建专业（曲线未指定时取考试类别的曲线）
    pub fn build_program(
        &self,
        code: &str,
        name: &str,
        faculty: &str,
        capacity: i32,
        curve_bonus: Option<f64>,
    ) -> Program {
        let program = Program::new(code, name, faculty, capacity)
            .with_minimum_score(self.default_minimum_score);
        let curve = curve_bonus.unwrap_or_else(|| self.curve_for(program.exam_category));
        program.with_curve(curve)
    }

    /// 默认专业目录（8 个专业,顺序即分配时的专业遍历顺序）
    pub fn default_programs(&self) -> Vec<Program> {
        DEFAULT_CATALOG
            .iter()
            .map(|&(name, code, faculty, capacity, curve)| {
                self.build_program(code, name, faculty, capacity, Some(curve))
            })
            .collect()
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            exam_name: DEFAULT_EXAM_NAME.to_string(),
            passing_threshold: DEFAULT_PASSING_THRESHOLD,
            default_minimum_score: DEFAULT_MINIMUM_SCORE,
            category_curves: ExamCategory::ALL
                .iter()
                .map(|&c| (c, default_curve(c)))
                .collect(),
            free_track_window_years: DEFAULT_FREE_TRACK_WINDOW_YEARS,
        }
    }
}

/// 考试类别默认曲线
pub fn default_curve(category: ExamCategory) -> f64 {
    match category {
        ExamCategory::Ingenieria => 2.0,
        ExamCategory::Fca => 1.5,
        ExamCategory::Medicina => 1.0,
        ExamCategory::General => 2.0,
    }
}

// (名称, 代码, 学院, 名额, 曲线)
const DEFAULT_CATALOG: [(&str, &str, &str, i32, f64); 8] = [
    ("INGENIERÍA DE SISTEMAS E INFORMÁTICA", "ISI", "INGENIERÍA", 25, 2.0),
    ("INGENIERÍA CIVIL", "CIV", "INGENIERÍA", 20, 2.0),
    ("MEDICINA HUMANA", "MED", "MEDICINA", 30, 1.0),
    ("ENFERMERÍA", "ENF", "MEDICINA", 25, 1.0),
    ("ADMINISTRACIÓN", "ADM", "CIENCIAS EMPRESARIALES", 35, 1.5),
    ("CONTABILIDAD", "CON", "CIENCIAS EMPRESARIALES", 30, 1.5),
    ("DERECHO Y CIENCIAS POLÍTICAS", "DER", "DERECHO", 30, 1.0),
    ("PSICOLOGÍA", "PSI", "PSICOLOGÍA", 25, 1.0),
];
