// ==========================================
// 招生录取分配系统 - 结果导出
// ==========================================
// 输出: 考生结果 CSV / 专业占用 CSV
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::program::Program;
use crate::domain::types::AcademicTrack;
use crate::importer::error::{ImportError, ImportResult};
use csv::Writer;
use std::io::Write;
use std::path::Path;
use tracing::info;

const RESULT_HEADERS: [&str; 14] = [
    "CODIGO",
    "APELLIDOS_NOMBRES",
    "OPCION1",
    "OPCION2",
    "MODALIDAD",
    "DNI",
    "SEXO",
    "ESTADO_ACADEMICO",
    "NOTA_AC",
    "NOTA_CO",
    "PUNTAJE_FINAL",
    "ESTADO_INGRESO",
    "CARRERA_INGRESO",
    "FECHA_INSCRIPCION",
];

const OCCUPANCY_HEADERS: [&str; 6] = [
    "CARRERA",
    "CODIGO",
    "VACANTES",
    "OCUPADAS",
    "DISPONIBLES",
    "OCUPACION_PCT",
];

pub struct ResultExporter;

impl ResultExporter {
    /// 导出考生结果到文件
    ///
    /// # 返回
    /// 写入的数据行数
    pub fn export_candidates<P: AsRef<Path>>(&self, path: P, candidates: &[Candidate]) -> ImportResult<usize> {
        let writer = Writer::from_path(path.as_ref()).map_err(write_error)?;
        let rows = self.write_candidates(writer, candidates)?;
        info!(path = %path.as_ref().display(), rows, "考生结果导出完成");
        Ok(rows)
    }

    /// 导出专业占用到文件
    pub fn export_occupancy<P: AsRef<Path>>(&self, path: P, programs: &[Program]) -> ImportResult<usize> {
        let writer = Writer::from_path(path.as_ref()).map_err(write_error)?;
        let rows = self.write_occupancy(writer, programs)?;
        info!(path = %path.as_ref().display(), rows, "专业占用导出完成");
        Ok(rows)
    }

    pub fn write_candidates<W: Write>(&self, mut writer: Writer<W>, candidates: &[Candidate]) -> ImportResult<usize> {
        writer.write_record(RESULT_HEADERS).map_err(write_error)?;

        for c in candidates {
            let status = if c.is_admitted() { "INGRESO" } else { "NO INGRESO" };
            let track = match c.track {
                AcademicTrack::Direct => "POSTULANTE",
                AcademicTrack::Free => "ALUMNO_LIBRE",
            };
            let registered = c
                .registered_at
                .map(|dt| dt.format("%d/%m/%Y").to_string())
                .unwrap_or_default();
            let aptitude = format!("{:.2}", c.aptitude_score);
            let knowledge = format!("{:.2}", c.knowledge_score);
            let total = format!("{:.2}", c.total_score());

            writer
                .write_record([
                    c.code.as_str(),
                    c.full_name.as_str(),
                    c.first_choice.as_str(),
                    c.second_choice.as_deref().unwrap_or(""),
                    c.modality.as_str(),
                    c.national_id.as_str(),
                    c.sex.as_deref().unwrap_or(""),
                    track,
                    aptitude.as_str(),
                    knowledge.as_str(),
                    total.as_str(),
                    status,
                    c.admitted_program().unwrap_or(""),
                    registered.as_str(),
                ])
                .map_err(write_error)?;
        }

        writer.flush()?;
        Ok(candidates.len())
    }

    pub fn write_occupancy<W: Write>(&self, mut writer: Writer<W>, programs: &[Program]) -> ImportResult<usize> {
        writer.write_record(OCCUPANCY_HEADERS).map_err(write_error)?;

        for p in programs {
            writer
                .write_record([
                    p.name.clone(),
                    p.code.clone(),
                    p.capacity.to_string(),
                    p.occupied().to_string(),
                    p.remaining().to_string(),
                    format!("{:.2}", p.occupancy_percentage()),
                ])
                .map_err(write_error)?;
        }

        writer.flush()?;
        Ok(programs.len())
    }
}

fn write_error(err: csv::Error) -> ImportError {
    ImportError::FileWriteError(err.to_string())
}
