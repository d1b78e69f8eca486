// ==========================================
// 招生录取分配系统 - 数据质量校验器实现
// ==========================================
// 职责: 行级转换 + DQ 校验 + 批内唯一性
// 等级: ERROR（阻断） / CONFLICT（批内重复,阻断） / WARNING（保留）
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::import::{DqSummary, DqViolation, RawCandidateRecord};
use crate::domain::types::{AcademicTrack, DqLevel};
use crate::importer::data_cleaner::DataCleaner;
use std::collections::HashSet;

/// 单项分数上限（超过只告警）
pub const DEFAULT_MAX_SCORE: f64 = 20.0;

pub struct DqValidator {
    max_score: f64,
}

impl DqValidator {
    pub fn new(max_score: f64) -> Self {
        Self { max_score }
    }

    /// 校验并转换一行
    ///
    /// # 返回
    /// - (Some(candidate), violations): 无 ERROR,可导入（violations 中可能有 WARNING）
    /// - (None, violations): 至少一个 ERROR
    pub fn validate_record(
        &self,
        raw: &RawCandidateRecord,
        cleaner: &DataCleaner,
    ) -> (Option<Candidate>, Vec<DqViolation>) {
        let mut violations = Vec::new();
        let code = cleaner.clean_upper(raw.code.as_deref());
        let mut report = |level: DqLevel, field: &str, message: String| {
            violations.push(DqViolation {
                row_number: raw.row_number,
                candidate_code: code.clone(),
                level,
                field: field.to_string(),
                message,
            });
        };

        // ===== 必填字段 =====
        if code.is_none() {
            report(DqLevel::Error, "code", "考生编号缺失".to_string());
        }

        let full_name = cleaner.clean_upper(raw.full_name.as_deref());
        if full_name.is_none() {
            report(DqLevel::Error, "full_name", "姓名缺失".to_string());
        }

        let national_id = cleaner.normalize_null(raw.national_id.clone());
        match national_id.as_deref() {
            None => report(DqLevel::Error, "national_id", "DNI 缺失".to_string()),
            Some(dni) if !is_valid_dni(dni) => {
                report(DqLevel::Error, "national_id", format!("DNI 必须为 8 位数字: {}", dni))
            }
            Some(_) => {}
        }

        let first_choice = cleaner.clean_upper(raw.first_choice.as_deref());
        if first_choice.is_none() {
            report(DqLevel::Error, "first_choice", "第一志愿缺失".to_string());
        }

        // ===== 分数 =====
        let mut score = |field: &str, label: &str, value: Option<&str>| -> Option<f64> {
            let Some(text) = value else {
                report(DqLevel::Error, field, format!("{}缺失", label));
                return None;
            };
            match cleaner.parse_score(text) {
                None => {
                    report(DqLevel::Error, field, format!("{}无法解析: {}", label, text));
                    None
                }
                Some(v) if v < 0.0 => {
                    report(DqLevel::Error, field, format!("{}为负数: {}", label, v));
                    None
                }
                Some(v) => {
                    if v > self.max_score {
                        report(
                            DqLevel::Warning,
                            field,
                            format!("{}超过 {}: {}", label, self.max_score, v),
                        );
                    }
                    Some(v)
                }
            }
        };
        let aptitude = score("aptitude_score", "能力分", raw.aptitude_score.as_deref());
        let knowledge = score("knowledge_score", "知识分", raw.knowledge_score.as_deref());

        // ===== 可选日期（无法解析 → 告警并丢弃） =====
        let mut optional_date = |field: &str, value: Option<&str>| {
            let text = value?;
            let parsed = cleaner.parse_date(text);
            if parsed.is_none() {
                report(DqLevel::Warning, field, format!("日期无法解析,已忽略: {}", text));
            }
            parsed
        };
        let birth_date = optional_date("birth_date", raw.birth_date.as_deref());
        let graduation_date = optional_date("graduation_date", raw.graduation_date.as_deref());

        let registered_at = raw.registered_at.as_deref().and_then(|text| {
            let parsed = cleaner.parse_datetime(text);
            if parsed.is_none() {
                report(
                    DqLevel::Warning,
                    "registered_at",
                    format!("报名时间无法解析,已忽略: {}", text),
                );
            }
            parsed
        });

        // ===== 通道 =====
        let track = match cleaner.clean_upper(raw.track.as_deref()) {
            None => Some(cleaner.derive_track(graduation_date)),
            Some(value) => {
                let parsed = AcademicTrack::parse(&value);
                if parsed.is_none() {
                    report(DqLevel::Error, "track", format!("学术通道无法识别: {}", value));
                }
                parsed
            }
        };

        // ===== 第二志愿 =====
        let mut second_choice = cleaner.clean_upper(raw.second_choice.as_deref());
        if second_choice.is_some() && second_choice == first_choice {
            report(
                DqLevel::Warning,
                "second_choice",
                "第二志愿与第一志愿相同,已忽略".to_string(),
            );
            second_choice = None;
        }

        let blocked = violations.iter().any(|v| v.level == DqLevel::Error);
        let (
            false,
            Some(code),
            Some(full_name),
            Some(national_id),
            Some(first_choice),
            Some(aptitude),
            Some(knowledge),
            Some(track),
        ) = (
            blocked,
            code,
            full_name,
            national_id,
            first_choice,
            aptitude,
            knowledge,
            track,
        )
        else {
            return (None, violations);
        };

        let mut candidate =
            Candidate::new(code, national_id, aptitude, knowledge, first_choice, track)
                .with_name(full_name);
        if let Some(second) = second_choice {
            candidate = candidate.with_second_choice(second);
        }
        if let Some(modality) = cleaner.clean_upper(raw.modality.as_deref()) {
            candidate.modality = modality;
        }
        candidate.sex = cleaner.normalize_sex(raw.sex.as_deref());
        candidate.birth_date = birth_date;
        candidate.registered_at = registered_at;
        candidate.graduation_date = graduation_date;

        (Some(candidate), violations)
    }

    /// 批内唯一性: 编号或 DNI 重复的后出现者阻断
    pub fn validate_uniqueness(
        &self,
        rows: Vec<(usize, Candidate)>,
    ) -> (Vec<Candidate>, Vec<DqViolation>) {
        let mut seen_codes = HashSet::new();
        let mut seen_ids = HashSet::new();
        let mut kept = Vec::with_capacity(rows.len());
        let mut violations = Vec::new();

        for (row_number, candidate) in rows {
            let conflict = if seen_codes.contains(&candidate.code) {
                Some(("code", format!("重复考生编号（同批次内）: {}", candidate.code)))
            } else if seen_ids.contains(&candidate.national_id) {
                Some(("national_id", format!("重复 DNI（同批次内）: {}", candidate.national_id)))
            } else {
                None
            };

            match conflict {
                Some((field, message)) => violations.push(DqViolation {
                    row_number,
                    candidate_code: Some(candidate.code.clone()),
                    level: DqLevel::Conflict,
                    field: field.to_string(),
                    message,
                }),
                None => {
                    seen_codes.insert(candidate.code.clone());
                    seen_ids.insert(candidate.national_id.clone());
                    kept.push(candidate);
                }
            }
        }

        (kept, violations)
    }

    /// 汇总: 每行按最严重等级计一次
    pub fn summarize(&self, total_rows: usize, imported: usize, violations: &[DqViolation]) -> DqSummary {
        let rows_with = |level: DqLevel| {
            violations
                .iter()
                .filter(|v| v.level == level)
                .map(|v| v.row_number)
                .collect::<HashSet<_>>()
                .len()
        };

        DqSummary {
            total_rows,
            imported,
            blocked: total_rows.saturating_sub(imported),
            warning: rows_with(DqLevel::Warning),
            conflict: rows_with(DqLevel::Conflict),
        }
    }
}

impl Default for DqValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SCORE)
    }
}

fn is_valid_dni(value: &str) -> bool {
    value.len() == 8 && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn cleaner() -> DataCleaner {
        DataCleaner::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), 1)
    }

    fn raw(row: usize, code: &str, dni: &str) -> RawCandidateRecord {
        RawCandidateRecord {
            row_number: row,
            code: Some(code.to_string()),
            full_name: Some("Quispe Mamani Juan".to_string()),
            first_choice: Some("Medicina Humana".to_string()),
            national_id: Some(dni.to_string()),
            track: Some("POSTULANTE".to_string()),
            aptitude_score: Some("7.5".to_string()),
            knowledge_score: Some("6,0".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_record_is_converted() {
        let (candidate, violations) = DqValidator::default().validate_record(&raw(2, "a1", "12345678"), &cleaner());
        let candidate = candidate.unwrap();

        assert!(violations.is_empty());
        assert_eq!(candidate.code, "A1");
        assert_eq!(candidate.full_name, "QUISPE MAMANI JUAN");
        assert_eq!(candidate.first_choice, "MEDICINA HUMANA");
        assert_eq!(candidate.modality, "ORDINARIO");
        assert_eq!(candidate.track, AcademicTrack::Direct);
        assert_eq!(candidate.total_score(), 13.5);
    }

    #[test]
    fn test_errors_block_row() {
        let mut r = raw(3, "A1", "1234");
        r.aptitude_score = Some("-1".to_string());
        r.first_choice = None;

        let (candidate, violations) = DqValidator::default().validate_record(&r, &cleaner());
        assert!(candidate.is_none());
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert!(fields.contains(&"national_id"));
        assert!(fields.contains(&"first_choice"));
        assert!(fields.contains(&"aptitude_score"));
        assert!(violations.iter().all(|v| v.level == DqLevel::Error));
    }

    #[test]
    fn test_unknown_track_is_error() {
        let mut r = raw(2, "A1", "12345678");
        r.track = Some("EGRESADO".to_string());
        let (candidate, violations) = DqValidator::default().validate_record(&r, &cleaner());
        assert!(candidate.is_none());
        assert_eq!(violations[0].field, "track");
    }

    #[test]
    fn test_warnings_keep_row() {
        let mut r = raw(2, "A1", "12345678");
        r.aptitude_score = Some("21".to_string());
        r.second_choice = Some("MEDICINA HUMANA".to_string());
        r.birth_date = Some("31/02/2006".to_string());

        let (candidate, violations) = DqValidator::default().validate_record(&r, &cleaner());
        let candidate = candidate.unwrap();
        assert_eq!(candidate.second_choice, None);
        assert_eq!(candidate.birth_date, None);
        assert_eq!(violations.len(), 3);
        assert!(violations.iter().all(|v| v.level == DqLevel::Warning));
    }

    #[test]
    fn test_missing_track_is_derived_from_graduation() {
        let mut r = raw(2, "A1", "12345678");
        r.track = None;
        r.graduation_date = Some("15/12/2020".to_string());
        let (candidate, _) = DqValidator::default().validate_record(&r, &cleaner());
        assert_eq!(candidate.unwrap().track, AcademicTrack::Direct);

        let mut r = raw(2, "A1", "12345678");
        r.track = None;
        let (candidate, _) = DqValidator::default().validate_record(&r, &cleaner());
        assert_eq!(candidate.unwrap().track, AcademicTrack::Free);
    }

    #[test]
    fn test_duplicates_are_conflicts() {
        let validator = DqValidator::default();
        let c = cleaner();
        let rows = vec![
            (2, validator.validate_record(&raw(2, "A1", "11111111"), &c).0.unwrap()),
            (3, validator.validate_record(&raw(3, "A1", "22222222"), &c).0.unwrap()),
            (4, validator.validate_record(&raw(4, "A2", "11111111"), &c).0.unwrap()),
            (5, validator.validate_record(&raw(5, "A3", "33333333"), &c).0.unwrap()),
        ];

        let (kept, violations) = validator.validate_uniqueness(rows);
        let codes: Vec<&str> = kept.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["A1", "A3"]);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].row_number, 3);
        assert_eq!(violations[1].field, "national_id");
        assert!(violations.iter().all(|v| v.level == DqLevel::Conflict));
    }

    #[test]
    fn test_summarize_counts_rows() {
        let v = |row, level| DqViolation {
            row_number: row,
            candidate_code: None,
            level,
            field: "x".to_string(),
            message: String::new(),
        };
        let violations = vec![
            v(2, DqLevel::Warning),
            v(2, DqLevel::Warning),
            v(3, DqLevel::Conflict),
            v(4, DqLevel::Error),
        ];
        let summary = DqValidator::default().summarize(5, 3, &violations);
        assert_eq!(summary.blocked, 2);
        assert_eq!(summary.warning, 1);
        assert_eq!(summary.conflict, 1);
    }
}
