// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use unas_admission::domain::candidate::Candidate;
use unas_admission::domain::program::{Program, ProgramRegistry};
use unas_admission::domain::types::AcademicTrack;

// ==========================================
// Candidate 构建器
// ==========================================

pub struct CandidateBuilder {
    code: String,
    national_id: String,
    full_name: String,
    aptitude: f64,
    knowledge: f64,
    first_choice: String,
    second_choice: Option<String>,
    track: AcademicTrack,
    birth_date: Option<NaiveDate>,
    registered_at: Option<NaiveDateTime>,
}

impl CandidateBuilder {
    /// 默认: DIRECT 通道,分数平分为两项
    pub fn new(code: &str, total: f64, first_choice: &str) -> Self {
        Self {
            code: code.to_string(),
            national_id: dni_for(code),
            full_name: format!("POSTULANTE {}", code),
            aptitude: total / 2.0,
            knowledge: total / 2.0,
            first_choice: first_choice.to_string(),
            second_choice: None,
            track: AcademicTrack::Direct,
            birth_date: None,
            registered_at: None,
        }
    }

    pub fn scores(mut self, aptitude: f64, knowledge: f64) -> Self {
        self.aptitude = aptitude;
        self.knowledge = knowledge;
        self
    }

    pub fn second(mut self, program: &str) -> Self {
        self.second_choice = Some(program.to_string());
        self
    }

    pub fn free(mut self) -> Self {
        self.track = AcademicTrack::Free;
        self
    }

    pub fn born(mut self, date: NaiveDate) -> Self {
        self.birth_date = Some(date);
        self
    }

    pub fn registered(mut self, at: NaiveDateTime) -> Self {
        self.registered_at = Some(at);
        self
    }

    pub fn build(self) -> Candidate {
        let mut candidate = Candidate::new(
            self.code,
            self.national_id,
            self.aptitude,
            self.knowledge,
            self.first_choice,
            self.track,
        )
        .with_name(self.full_name);
        candidate.second_choice = self.second_choice;
        candidate.birth_date = self.birth_date;
        candidate.registered_at = self.registered_at;
        candidate
    }
}

/// 由编号生成 8 位 DNI
fn dni_for(code: &str) -> String {
    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
    let seed: u64 = code.bytes().map(u64::from).sum::<u64>() * 7919 + digits.parse::<u64>().unwrap_or(0);
    format!("{:08}", seed % 100_000_000)
}

// ==========================================
// Program / Registry 辅助
// ==========================================

pub fn program(name: &str, capacity: i32) -> Program {
    Program::new(name, name, "FACULTAD", capacity)
}

pub fn curved_program(name: &str, capacity: i32, curve: f64) -> Program {
    program(name, capacity).with_curve(curve)
}

pub fn registry(programs: Vec<Program>) -> ProgramRegistry {
    ProgramRegistry::from_programs(programs).expect("专业名称重复")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap()
}
