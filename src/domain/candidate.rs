// ==========================================
// 招生录取分配系统 - 考生领域模型
// ==========================================
// 红线: total_score 永远由两项分数（加已消耗的曲线分）派生,不可独立设置
// 红线: admitted_program 当且仅当 admitted 为 true 时存在
// 用途: 导入层写入,引擎层只改分配状态
// ==========================================

use crate::domain::types::AcademicTrack;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Candidate - 考生
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    // ===== 身份 =====
    pub code: String,        // 考生编号（唯一）
    pub national_id: String, // 身份证号 (DNI)
    pub full_name: String,   // 姓名
    pub modality: String,    // 报考方式 (ORDINARIO / EXONERADO / BECA 18 ...)
    pub sex: Option<String>, // M / F

    // ===== 分数 =====
    pub aptitude_score: f64,  // 能力分 (AC)
    pub knowledge_score: f64, // 知识分 (CO)

    // ===== 志愿 =====
    pub first_choice: String,          // 第一志愿专业名称
    pub second_choice: Option<String>, // 第二志愿专业名称

    // ===== 通道与时间 =====
    pub track: AcademicTrack,
    pub birth_date: Option<NaiveDate>,
    pub registered_at: Option<NaiveDateTime>,
    pub graduation_date: Option<NaiveDate>,

    // ===== 分配状态（仅引擎修改）=====
    #[serde(default)]
    curve_applied: f64,
    #[serde(default)]
    admitted_program: Option<String>,
}

impl Candidate {
    /// 创建考生（分配状态为空）
    pub fn new(
        code: impl Into<String>,
        national_id: impl Into<String>,
        aptitude_score: f64,
        knowledge_score: f64,
        first_choice: impl Into<String>,
        track: AcademicTrack,
    ) -> Self {
        Self {
            code: code.into(),
            national_id: national_id.into(),
            full_name: String::new(),
            modality: "ORDINARIO".to_string(),
            sex: None,
            aptitude_score,
            knowledge_score,
            first_choice: first_choice.into(),
            second_choice: None,
            track,
            birth_date: None,
            registered_at: None,
            graduation_date: None,
            curve_applied: 0.0,
            admitted_program: None,
        }
    }

    pub fn with_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    pub fn with_second_choice(mut self, program: impl Into<String>) -> Self {
        self.second_choice = Some(program.into());
        self
    }

    pub fn with_birth_date(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    pub fn with_registered_at(mut self, at: NaiveDateTime) -> Self {
        self.registered_at = Some(at);
        self
    }

    // ==========================================
    // 派生值与状态读取
    // ==========================================

    /// 未加曲线的原始总分
    pub fn base_score(&self) -> f64 {
        self.aptitude_score + self.knowledge_score
    }

    /// 当前总分 = 能力分 + 知识分 + 已消耗的曲线分
    pub fn total_score(&self) -> f64 {
        self.base_score() + self.curve_applied
    }

    /// 录取时消耗的曲线分（未通过曲线录取为 0）
    pub fn curve_applied(&self) -> f64 {
        self.curve_applied
    }

    pub fn is_admitted(&self) -> bool {
        self.admitted_program.is_some()
    }

    pub fn admitted_program(&self) -> Option<&str> {
        self.admitted_program.as_deref()
    }

    /// 第一或第二志愿是否为该专业
    pub fn chooses(&self, program_name: &str) -> bool {
        self.first_choice == program_name || self.second_choice.as_deref() == Some(program_name)
    }

    // ==========================================
    // 状态变更（引擎内部使用）
    // ==========================================

    /// 清空分配状态并撤销已消耗的曲线分
    pub(crate) fn reset_allocation(&mut self) {
        self.curve_applied = 0.0;
        self.admitted_program = None;
    }

    pub(crate) fn admit(&mut self, program_name: &str) {
        self.admitted_program = Some(program_name.to_string());
    }

    /// 曲线录取: 分数永久抬升
    pub(crate) fn admit_with_curve(&mut self, program_name: &str, curve_bonus: f64) {
        self.curve_applied = curve_bonus;
        self.admit(program_name);
    }

    /// 从持久化记录恢复分配状态（仅供仓储层回填）
    pub fn restore_allocation(&mut self, admitted_program: Option<String>, curve_applied: f64) {
        self.curve_applied = if admitted_program.is_some() { curve_applied } else { 0.0 };
        self.admitted_program = admitted_program;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Candidate {
        Candidate::new("2025001", "10000001", 7.5, 6.0, "MEDICINA HUMANA", AcademicTrack::Direct)
            .with_second_choice("ENFERMERÍA")
    }

    #[test]
    fn test_total_score_is_derived() {
        let mut c = sample();
        assert_eq!(c.total_score(), 13.5);

        c.aptitude_score = 8.0;
        assert_eq!(c.total_score(), 14.0);
    }

    #[test]
    fn test_admit_sets_program_and_flag_together() {
        let mut c = sample();
        assert!(!c.is_admitted());
        assert_eq!(c.admitted_program(), None);

        c.admit("MEDICINA HUMANA");
        assert!(c.is_admitted());
        assert_eq!(c.admitted_program(), Some("MEDICINA HUMANA"));
    }

    #[test]
    fn test_curve_is_consumed_and_reset() {
        let mut c = sample();
        c.admit_with_curve("ENFERMERÍA", 1.0);
        assert_eq!(c.total_score(), 14.5);
        assert_eq!(c.curve_applied(), 1.0);

        c.reset_allocation();
        assert_eq!(c.total_score(), 13.5);
        assert!(!c.is_admitted());
    }

    #[test]
    fn test_chooses_checks_both_preferences() {
        let c = sample();
        assert!(c.chooses("MEDICINA HUMANA"));
        assert!(c.chooses("ENFERMERÍA"));
        assert!(!c.chooses("DERECHO Y CIENCIAS POLÍTICAS"));
    }

    #[test]
    fn test_restore_ignores_curve_without_program() {
        let mut c = sample();
        c.restore_allocation(None, 2.0);
        assert_eq!(c.curve_applied(), 0.0);

        c.restore_allocation(Some("ENFERMERÍA".to_string()), 1.0);
        assert_eq!(c.total_score(), 14.5);
    }
}
