// ==========================================
// 招生录取分配系统 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls) / CSV (.csv, 分隔符自动识别 , ; TAB)
// 输出: 每行一个 表头 → 值 的映射,完全空白的行跳过
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::Timelike;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 原始行（row_number 从 2 开始,表头为第 1 行）
pub type RawRow = (usize, HashMap<String, String>);

// ==========================================
// FileParser Trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 按表头行识别分隔符: 出现次数最多者优先,平局时 `,` 优先
    pub fn detect_delimiter(header_line: &str) -> u8 {
        let count = |ch: char| header_line.chars().filter(|&c| c == ch).count();
        let (commas, semicolons, tabs) = (count(','), count(';'), count('\t'));

        if tabs > commas && tabs > semicolons {
            b'\t'
        } else if semicolons > commas {
            b';'
        } else {
            b','
        }
    }
}

impl FileParser for CsvParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名（无扩展名按 CSV 处理）
        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") && !ext.eq_ignore_ascii_case("txt") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let content = fs::read_to_string(path)?;
        // 去掉 UTF-8 BOM（Excel 另存为 CSV 时常见）
        parse_delimited(content.trim_start_matches('\u{feff}'))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>> {
        let path = file_path;

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        Self::parse_range(&range)
    }
}

impl ExcelParser {
    /// 工作表区域 → 原始行（第一行为表头）
    pub fn parse_range(range: &Range<Data>) -> ImportResult<Vec<RawRow>> {
        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row.iter().map(cell_text).collect();

        let mut records = Vec::new();
        for (row_idx, data_row) in rows.enumerate() {
            let mut row_map = HashMap::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), cell_text(cell));
                }
            }

            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push((row_idx + 2, row_map));
        }

        Ok(records)
    }
}

/// 单元格文本
///
/// 日期单元格在 Excel 中存为序列号,转换为 `%Y-%m-%d`（零点时）
/// 或 `%Y-%m-%d %H:%M:%S`,与 CSV 中的日期文本走同一套清洗规则
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(value) => match value.as_datetime() {
            Some(dt) if dt.num_seconds_from_midnight() == 0 => dt.format("%Y-%m-%d").to_string(),
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => value.to_string(),
        },
        Data::DateTimeIso(text) => text.trim().replacen('T', " ", 1),
        other => other.to_string().trim().to_string(),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" | "txt" | "" => CsvParser.parse_to_raw_records(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_records(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

/// 解析分隔文本内容
pub fn parse_delimited(content: &str) -> ImportResult<Vec<RawRow>> {
    let header_line = content.lines().next().unwrap_or("");
    let delimiter = CsvParser::detect_delimiter(header_line);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let row_map: HashMap<String, String> = record
            .iter()
            .enumerate()
            .filter_map(|(col_idx, value)| {
                headers
                    .get(col_idx)
                    .map(|h| (h.clone(), value.trim().to_string()))
            })
            .collect();

        // 跳过完全空白的行
        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }
        records.push((row_idx + 2, row_map));
    }

    Ok(records)
}
