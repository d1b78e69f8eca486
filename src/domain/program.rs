// ==========================================
// 招生录取分配系统 - 专业与专业目录
// ==========================================
// 红线: 0 <= occupied <= capacity
// 红线: 单次分配期间 capacity 固定
// ==========================================

use crate::domain::types::ExamCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// 默认专业最低分
pub const DEFAULT_MINIMUM_SCORE: f64 = 11.0;

// ==========================================
// Program - 专业
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub code: String,
    pub name: String, // 专业名称（唯一，考生志愿按名称匹配）
    pub faculty: String,
    pub capacity: i32, // 招生名额
    #[serde(default)]
    occupied: i32, // 已占用名额
    pub minimum_score: f64,
    pub exam_category: ExamCategory,
    pub curve_bonus: f64, // 曲线加分（>= 0）
    pub active: bool,
}

impl Program {
    /// 创建专业（考试类别由名称推断，无曲线）
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        faculty: impl Into<String>,
        capacity: i32,
    ) -> Self {
        let name = name.into();
        Self {
            code: code.into(),
            exam_category: ExamCategory::from_program_name(&name),
            name,
            faculty: faculty.into(),
            capacity,
            occupied: 0,
            minimum_score: DEFAULT_MINIMUM_SCORE,
            curve_bonus: 0.0,
            active: true,
        }
    }

    pub fn with_curve(mut self, curve_bonus: f64) -> Self {
        self.curve_bonus = curve_bonus;
        self
    }

    pub fn with_minimum_score(mut self, minimum_score: f64) -> Self {
        self.minimum_score = minimum_score;
        self
    }

    pub fn with_category(mut self, category: ExamCategory) -> Self {
        self.exam_category = category;
        self
    }

    pub fn occupied(&self) -> i32 {
        self.occupied
    }

    /// 剩余名额
    pub fn remaining(&self) -> i32 {
        (self.capacity - self.occupied).max(0)
    }

    pub fn has_vacancy(&self) -> bool {
        self.remaining() > 0
    }

    pub fn is_full(&self) -> bool {
        self.occupied >= self.capacity
    }

    /// 占用率（%），capacity 为 0 时返回 0
    pub fn occupancy_percentage(&self) -> f64 {
        percentage(self.occupied as i64, self.capacity as i64)
    }

    /// 占用一个名额，已满时返回 false
    pub(crate) fn occupy_slot(&mut self) -> bool {
        if self.has_vacancy() {
            self.occupied += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn reset_occupancy(&mut self) {
        self.occupied = 0;
    }

    /// 从持久化记录恢复占用数（截断到 [0, capacity]）
    pub fn restore_occupancy(&mut self, occupied: i32) {
        self.occupied = occupied.clamp(0, self.capacity.max(0));
    }
}

/// occupied / capacity * 100，分母为 0 时为 0
pub fn percentage(occupied: i64, capacity: i64) -> f64 {
    if capacity <= 0 {
        return 0.0;
    }
    occupied as f64 / capacity as f64 * 100.0
}

// ==========================================
// ProgramRegistry - 专业目录
// ==========================================
// 保留插入顺序（即阶段 3/4 的遍历顺序）,名称索引 O(1)

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("专业名称重复: {0}")]
    DuplicateProgram(String),
}

#[derive(Debug, Clone, Default)]
pub struct ProgramRegistry {
    programs: Vec<Program>,
    index: HashMap<String, usize>,
}

impl ProgramRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_programs(programs: Vec<Program>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for program in programs {
            registry.insert(program)?;
        }
        Ok(registry)
    }

    pub fn insert(&mut self, program: Program) -> Result<(), RegistryError> {
        if self.index.contains_key(&program.name) {
            return Err(RegistryError::DuplicateProgram(program.name));
        }
        self.index.insert(program.name.clone(), self.programs.len());
        self.programs.push(program);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Program> {
        self.index.get(name).map(|&idx| &self.programs[idx])
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Program> {
        match self.index.get(name) {
            Some(&idx) => self.programs.get_mut(idx),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Program> {
        self.programs.iter()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// 是否还有任何专业有剩余名额
    pub fn any_vacancy(&self) -> bool {
        self.programs.iter().any(Program::has_vacancy)
    }

    pub fn total_capacity(&self) -> i64 {
        self.programs.iter().map(|p| p.capacity as i64).sum()
    }

    pub fn total_occupied(&self) -> i64 {
        self.programs.iter().map(|p| p.occupied as i64).sum()
    }

    pub(crate) fn reset_occupancy(&mut self) {
        for program in &mut self.programs {
            program.reset_occupancy();
        }
    }

    pub fn into_programs(self) -> Vec<Program> {
        self.programs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupy_slot_respects_capacity() {
        let mut p = Program::new("PSI", "PSICOLOGÍA", "PSICOLOGÍA", 2);
        assert!(p.occupy_slot());
        assert!(p.occupy_slot());
        assert!(!p.occupy_slot());
        assert_eq!(p.occupied(), 2);
        assert!(p.is_full());
        assert_eq!(p.occupancy_percentage(), 100.0);
    }

    #[test]
    fn test_zero_capacity_percentage_is_zero() {
        let p = Program::new("X", "X", "X", 0);
        assert_eq!(p.occupancy_percentage(), 0.0);
        assert!(!p.has_vacancy());
    }

    #[test]
    fn test_registry_rejects_duplicate_names() {
        let result = ProgramRegistry::from_programs(vec![
            Program::new("A1", "ADMINISTRACIÓN", "FCE", 10),
            Program::new("A2", "ADMINISTRACIÓN", "FCE", 5),
        ]);
        assert_eq!(
            result.unwrap_err(),
            RegistryError::DuplicateProgram("ADMINISTRACIÓN".to_string())
        );
    }

    #[test]
    fn test_registry_keeps_insertion_order() {
        let registry = ProgramRegistry::from_programs(vec![
            Program::new("MED", "MEDICINA HUMANA", "MEDICINA", 30),
            Program::new("ADM", "ADMINISTRACIÓN", "FCE", 35),
        ])
        .unwrap();

        let names: Vec<&str> = registry.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["MEDICINA HUMANA", "ADMINISTRACIÓN"]);
        assert_eq!(registry.total_capacity(), 65);
        assert_eq!(
            registry.get("ADMINISTRACIÓN").unwrap().exam_category,
            ExamCategory::Fca
        );
    }

    #[test]
    fn test_restore_occupancy_is_clamped() {
        let mut p = Program::new("CIV", "INGENIERÍA CIVIL", "INGENIERÍA", 20);
        p.restore_occupancy(25);
        assert_eq!(p.occupied(), 20);
        p.restore_occupancy(-3);
        assert_eq!(p.occupied(), 0);
    }
}
