// ==========================================
// 招生录取分配系统 - 导入导出层
// ==========================================
// 职责: 外部考生名单导入（CSV / Excel）,结果导出（CSV）
// ==========================================

pub mod candidate_importer;
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod result_exporter;

// 重导出核心类型
pub use candidate_importer::CandidateImporter;
pub use data_cleaner::DataCleaner;
pub use dq_validator::DqValidator;
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{parse_delimited, CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use result_exporter::ResultExporter;
