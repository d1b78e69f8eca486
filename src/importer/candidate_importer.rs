// ==========================================
// 招生录取分配系统 - 考生导入器
// ==========================================
// 导入流程:
// 1. 文件读取与解析（CSV / Excel）
// 2. 表头校验（必需列）
// 3. 字段映射
// 4. 清洗 + 行级 DQ 校验 + 通道派生
// 5. 批内唯一性校验
// 6. 生成 DQ 报告
// 说明: 只产出考生与报告,落库由调用方负责
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::import::{DqViolation, ImportReport};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{RawRow, UniversalFileParser};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct CandidateImporter {
    parser: UniversalFileParser,
    mapper: FieldMapper,
    validator: DqValidator,
    free_track_window_years: u32,
}

impl CandidateImporter {
    pub fn new(free_track_window_years: u32) -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: FieldMapper,
            validator: DqValidator::default(),
            free_track_window_years,
        }
    }

    /// 从文件导入
    ///
    /// # 参数
    /// - file_path: .csv / .xlsx / .xls
    /// - reference_date: 通道派生的基准日期（通常为考试日期）
    ///
    /// # 返回
    /// - Ok(ImportReport): 含通过校验的考生与全部违规
    /// - Err: 文件无法读取、格式不支持、缺少必需列
    #[instrument(skip(self, file_path), fields(file = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        reference_date: NaiveDate,
    ) -> ImportResult<ImportReport> {
        let rows = self.parser.parse(file_path.as_ref())?;
        self.import_rows(rows, reference_date)
    }

    /// 从已解析的行导入
    pub fn import_rows(&self, rows: Vec<RawRow>, reference_date: NaiveDate) -> ImportResult<ImportReport> {
        let started = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        let total_rows = rows.len();

        if !rows.is_empty() {
            let headers: BTreeSet<&String> = rows.iter().flat_map(|(_, row)| row.keys()).collect();
            self.mapper.check_headers(headers)?;
        }

        let cleaner = DataCleaner::new(reference_date, self.free_track_window_years);
        let mut violations: Vec<DqViolation> = Vec::new();
        let mut accepted: Vec<(usize, Candidate)> = Vec::with_capacity(total_rows);

        for (row_number, row) in &rows {
            let raw = self.mapper.map_to_raw_candidate(row, *row_number);
            let (candidate, row_violations) = self.validator.validate_record(&raw, &cleaner);
            violations.extend(row_violations);
            if let Some(candidate) = candidate {
                accepted.push((*row_number, candidate));
            }
        }

        let (candidates, conflicts) = self.validator.validate_uniqueness(accepted);
        violations.extend(conflicts);
        violations.sort_by_key(|v| v.row_number);

        let summary = self.validator.summarize(total_rows, candidates.len(), &violations);
        if summary.blocked > 0 {
            warn!(batch_id = %batch_id, blocked = summary.blocked, "部分行未通过数据质量校验");
        }
        info!(
            batch_id = %batch_id,
            total_rows = summary.total_rows,
            imported = summary.imported,
            warning = summary.warning,
            conflict = summary.conflict,
            "考生导入完成"
        );

        Ok(ImportReport {
            batch_id,
            summary,
            violations,
            candidates,
            elapsed_ms: started.elapsed().as_millis(),
        })
    }
}

impl Default for CandidateImporter {
    fn default() -> Self {
        Self::new(crate::config::admission_config::DEFAULT_FREE_TRACK_WINDOW_YEARS)
    }
}
