// ==========================================
// 招生录取分配系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / UPPER / NULL 标准化 / 日期与分数解析 / 通道派生
// ==========================================

use crate::domain::types::AcademicTrack;
use chrono::{Months, NaiveDate, NaiveDateTime};

/// 可接受的日期格式
const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// 可接受的日期时间格式（报名时间）
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

pub struct DataCleaner {
    reference_date: NaiveDate,     // 通道派生的基准日期
    free_track_window_years: u32, // 毕业不足 N 年 → FREE
}

impl DataCleaner {
    pub fn new(reference_date: NaiveDate, free_track_window_years: u32) -> Self {
        Self {
            reference_date,
            free_track_window_years,
        }
    }

    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim().trim_matches('"').trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    pub fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// TRIM + UPPER + NULL 标准化
    pub fn clean_upper(&self, value: Option<&str>) -> Option<String> {
        self.normalize_null(value.map(|v| self.clean_text(v, true)))
    }

    /// 解析分数（兼容小数逗号 "7,5"）
    pub fn parse_score(&self, value: &str) -> Option<f64> {
        let cleaned = self.clean_text(value, false).replace(',', ".");
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// 解析日期: dd/MM/yyyy、dd-MM-yyyy、yyyy-MM-dd（允许附带时间部分）
    pub fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let cleaned = self.clean_text(value, false);
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
            .or_else(|| self.parse_datetime(&cleaned).map(|dt| dt.date()))
    }

    /// 解析日期时间;只有日期时取当天 00:00:00
    pub fn parse_datetime(&self, value: &str) -> Option<NaiveDateTime> {
        let cleaned = self.clean_text(value, false);
        DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&cleaned, fmt).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    /// 性别标准化为 M / F;无法识别时保留原值（大写）
    pub fn normalize_sex(&self, value: Option<&str>) -> Option<String> {
        let upper = self.clean_upper(value)?;
        let normalized = match upper.as_str() {
            "M" | "MASCULINO" | "HOMBRE" | "VARON" | "VARÓN" => "M".to_string(),
            "F" | "FEMENINO" | "MUJER" => "F".to_string(),
            _ => upper,
        };
        Some(normalized)
    }

    /// 未提供通道时按毕业日期派生
    ///
    /// 毕业早于基准日期前 N 年 → DIRECT;近期毕业或日期缺失 → FREE
    pub fn derive_track(&self, graduation_date: Option<NaiveDate>) -> AcademicTrack {
        let cutoff = self
            .reference_date
            .checked_sub_months(Months::new(self.free_track_window_years * 12))
            .unwrap_or(self.reference_date);

        match graduation_date {
            Some(date) if date < cutoff => AcademicTrack::Direct,
            _ => AcademicTrack::Free,
        }
    }
}
