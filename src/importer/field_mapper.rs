// ==========================================
// 招生录取分配系统 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段（别名、大小写、重音均不敏感）
// 说明: 只做映射,不做类型转换;转换与校验在 DQ 阶段
// ==========================================

use crate::domain::import::RawCandidateRecord;
use crate::domain::types::fold_accents;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashMap;

// 标准字段 → 可接受的列名
const CODE: &[&str] = &["CODIGO", "CODE", "COD_POSTULANTE"];
const FULL_NAME: &[&str] = &["APELLIDOS_NOMBRES", "APELLIDOS Y NOMBRES", "NOMBRE", "NOMBRES", "FULL_NAME"];
const FIRST_CHOICE: &[&str] = &["OPCION1", "OPCION_1", "FIRST_CHOICE"];
const SECOND_CHOICE: &[&str] = &["OPCION2", "OPCION_2", "SECOND_CHOICE"];
const MODALITY: &[&str] = &["MODALIDAD", "MODALITY"];
const NATIONAL_ID: &[&str] = &["DNI", "NATIONAL_ID"];
const SEX: &[&str] = &["SEXO", "SEX"];
const TRACK: &[&str] = &["ESTADO_ACADEMICO", "ESTADO ACADEMICO", "TRACK"];
const APTITUDE: &[&str] = &["NOTA_AC", "AC", "APTITUDE"];
const KNOWLEDGE: &[&str] = &["NOTA_CO", "CO", "KNOWLEDGE"];
const REGISTERED_AT: &[&str] = &["FECHA_INSCRIPCION", "INSCRIPCION", "REGISTERED_AT"];
const BIRTH_DATE: &[&str] = &["FEC_NAC", "FECHA_NACIMIENTO", "BIRTH_DATE"];
const GRADUATION_DATE: &[&str] = &["FECHA_EGRESO_COLEGIO", "FECHA_EGRESO", "GRADUATION_DATE"];

/// 必需列（表头中缺失则整批拒绝）
const REQUIRED: [(&str, &[&str]); 5] = [
    ("code", CODE),
    ("full_name", FULL_NAME),
    ("first_choice", FIRST_CHOICE),
    ("aptitude_score", APTITUDE),
    ("knowledge_score", KNOWLEDGE),
];

pub struct FieldMapper;

impl FieldMapper {
    /// 校验表头包含全部必需列
    pub fn check_headers<'a, I>(&self, headers: I) -> ImportResult<()>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let normalized: Vec<String> = headers.into_iter().map(|h| normalize_header(h)).collect();

        for (field, aliases) in REQUIRED {
            if !aliases.iter().any(|a| normalized.iter().any(|h| h == a)) {
                return Err(ImportError::MissingColumn(format!(
                    "{} ({})",
                    field,
                    aliases.join(" / ")
                )));
            }
        }
        Ok(())
    }

    /// 映射一行
    pub fn map_to_raw_candidate(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> RawCandidateRecord {
        let normalized: HashMap<String, &str> = row
            .iter()
            .map(|(k, v)| (normalize_header(k), v.as_str()))
            .collect();

        let get = |aliases: &[&str]| -> Option<String> {
            aliases.iter().find_map(|alias| {
                normalized
                    .get(*alias)
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
        };

        RawCandidateRecord {
            row_number,
            code: get(CODE),
            full_name: get(FULL_NAME),
            first_choice: get(FIRST_CHOICE),
            second_choice: get(SECOND_CHOICE),
            modality: get(MODALITY),
            national_id: get(NATIONAL_ID),
            sex: get(SEX),
            track: get(TRACK),
            aptitude_score: get(APTITUDE),
            knowledge_score: get(KNOWLEDGE),
            registered_at: get(REGISTERED_AT),
            birth_date: get(BIRTH_DATE),
            graduation_date: get(GRADUATION_DATE),
        }
    }
}

/// 表头标准化: 去引号、去空白、大写、去重音
fn normalize_header(header: &str) -> String {
    fold_accents(&header.trim().trim_matches('"').to_uppercase())
}
