// ==========================================
// 考生导入 / 结果导出集成测试
// ==========================================
// 测试范围:
// 1. CSV 分隔符识别、表头别名、BOM
// 2. DQ 校验: 阻断 / 告警 / 冲突
// 3. 学术通道派生
// 4. Excel 日期单元格、非法文件、缺少必需列
// 5. 结果导出
// ==========================================


use calamine::{Data, ExcelDateTime, ExcelDateTimeType, Range};
use chrono::NaiveDate;
use tempfile::TempDir;
use test_helpers::write_file;
use unas_admission::domain::types::{AcademicTrack, DqLevel};
use unas_admission::importer::{CandidateImporter, ExcelParser, ImportError, ResultExporter};

fn exam_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

#[test]
fn test_import_semicolon_csv_with_aliases() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "postulantes.csv",
        "\u{feff}Código;Apellidos_Nombres;Opción1;Opción2;DNI;Nota_AC;Nota_CO;Estado_Academico;Sexo\n\
         2025001;quispe mamani juan;medicina humana;enfermería;12345678;7,5;6;POSTULANTE;masculino\n\
         2025002;flores rojas ana;psicología;;23456789;5;4,25;ALUMNO_LIBRE;F\n",
    );

    let report = CandidateImporter::default().import_file(&path, exam_date()).unwrap();

    assert_eq!(report.summary.total_rows, 2);
    assert_eq!(report.summary.imported, 2);
    assert!(report.violations.is_empty());

    let first = &report.candidates[0];
    assert_eq!(first.code, "2025001");
    assert_eq!(first.full_name, "QUISPE MAMANI JUAN");
    assert_eq!(first.first_choice, "MEDICINA HUMANA");
    assert_eq!(first.second_choice.as_deref(), Some("ENFERMERÍA"));
    assert_eq!(first.aptitude_score, 7.5);
    assert_eq!(first.track, AcademicTrack::Direct);
    assert_eq!(first.sex.as_deref(), Some("M"));
    assert_eq!(first.modality, "ORDINARIO");

    let second = &report.candidates[1];
    assert_eq!(second.knowledge_score, 4.25);
    assert_eq!(second.second_choice, None);
    assert_eq!(second.track, AcademicTrack::Free);
}

#[test]
fn test_track_derived_from_graduation_date() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "egreso.csv",
        "CODIGO,NOMBRE,OPCION1,DNI,NOTA_AC,NOTA_CO,FECHA_EGRESO_COLEGIO\n\
         A1,ANA,PSICOLOGÍA,11111111,6,6,20/12/2022\n\
         A2,LUIS,PSICOLOGÍA,22222222,6,6,2024-12-20\n\
         A3,RUTH,PSICOLOGÍA,33333333,6,6,\n",
    );

    let report = CandidateImporter::new(1).import_file(&path, exam_date()).unwrap();
    let tracks: Vec<AcademicTrack> = report.candidates.iter().map(|c| c.track).collect();
    assert_eq!(
        tracks,
        vec![AcademicTrack::Direct, AcademicTrack::Free, AcademicTrack::Free]
    );
}

#[test]
fn test_dq_rules_block_warn_and_conflict() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "dq.csv",
        "CODIGO,NOMBRE,OPCION1,OPCION2,DNI,NOTA_AC,NOTA_CO\n\
         B1,ANA,DERECHO,DERECHO,11111111,12,9.5\n\
         B2,LUIS,DERECHO,,1234,6,6\n\
         B3,RUTH,,,33333333,6,6\n\
         B1,OTRA,DERECHO,,44444444,6,6\n\
         B5,JOSE,DERECHO,,11111111,6,6\n\
         B6,MARIA,DERECHO,,66666666,abc,6\n",
    );

    let report = CandidateImporter::default().import_file(&path, exam_date()).unwrap();

    assert_eq!(report.summary.total_rows, 6);
    assert_eq!(report.summary.imported, 1);
    assert_eq!(report.candidates[0].code, "B1");
    assert_eq!(report.candidates[0].second_choice, None);

    let at_row = |row: usize| -> Vec<(DqLevel, &str)> {
        report
            .violations
            .iter()
            .filter(|v| v.row_number == row)
            .map(|v| (v.level, v.field.as_str()))
            .collect()
    };

    // 行号从 2 开始（第 1 行为表头）
    assert_eq!(at_row(2), vec![(DqLevel::Warning, "second_choice")]);
    assert_eq!(at_row(3), vec![(DqLevel::Error, "national_id")]);
    assert_eq!(at_row(4), vec![(DqLevel::Error, "first_choice")]);
    assert_eq!(at_row(5), vec![(DqLevel::Conflict, "code")]);
    assert_eq!(at_row(6), vec![(DqLevel::Conflict, "national_id")]);
    assert_eq!(at_row(7), vec![(DqLevel::Error, "aptitude_score")]);

    assert_eq!(report.summary.warning, 1);
    assert_eq!(report.summary.conflict, 2);
    assert_eq!(report.summary.blocked, 5);
    assert!(!report.batch_id.is_empty());
}

#[test]
fn test_missing_required_column_rejects_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "sin_notas.csv",
        "CODIGO,NOMBRE,OPCION1,DNI,NOTA_AC\nC1,ANA,DERECHO,11111111,6\n",
    );

    let err = CandidateImporter::default().import_file(&path, exam_date()).unwrap_err();
    match err {
        ImportError::MissingColumn(msg) => assert!(msg.contains("knowledge_score")),
        other => panic!("Expected MissingColumn, got {:?}", other),
    }
}

#[test]
fn test_unsupported_and_missing_files() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "datos.json", "{}");

    let err = CandidateImporter::default().import_file(&path, exam_date()).unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));

    let err = CandidateImporter::default()
        .import_file(dir.path().join("no_existe.csv"), exam_date())
        .unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}

fn excel_date(serial: f64) -> Data {
    Data::DateTime(ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, false))
}

#[test]
fn test_excel_sheet_with_date_cells() {
    let header = ["CODIGO", "NOMBRE", "OPCION1", "DNI", "NOTA_AC", "NOTA_CO", "FEC_NAC", "FECHA_INSCRIPCION", "FECHA_EGRESO_COLEGIO"];
    let rows: Vec<Vec<Data>> = vec![
        vec![
            Data::String("X1".to_string()),
            Data::String("ANA".to_string()),
            Data::String("PSICOLOGÍA".to_string()),
            Data::Float(12345678.0),
            Data::Float(7.5),
            Data::Int(6),
            excel_date(38841.0),     // 2006-05-04
            excel_date(45667.34375), // 2025-01-10 08:15
            excel_date(44915.0),     // 2022-12-20
        ],
        vec![
            Data::String("X2".to_string()),
            Data::String("LUIS".to_string()),
            Data::String("PSICOLOGÍA".to_string()),
            Data::Float(23456789.0),
            Data::Float(6.0),
            Data::Float(6.0),
            Data::DateTimeIso("2006-05-04".to_string()),
            Data::Empty,
            excel_date(45646.0), // 2024-12-20
        ],
    ];

    let mut range = Range::new((0, 0), (rows.len() as u32, header.len() as u32 - 1));
    for (col, name) in header.iter().enumerate() {
        range.set_value((0, col as u32), Data::String(name.to_string()));
    }
    for (row, cells) in rows.into_iter().enumerate() {
        for (col, cell) in cells.into_iter().enumerate() {
            range.set_value((row as u32 + 1, col as u32), cell);
        }
    }

    let parsed = ExcelParser::parse_range(&range).unwrap();
    let report = CandidateImporter::new(1).import_rows(parsed, exam_date()).unwrap();

    assert!(report.violations.is_empty(), "{:?}", report.violations);
    assert_eq!(report.summary.imported, 2);

    let first = &report.candidates[0];
    assert_eq!(first.national_id, "12345678");
    assert_eq!(first.base_score(), 13.5);
    assert_eq!(first.birth_date, NaiveDate::from_ymd_opt(2006, 5, 4));
    assert_eq!(
        first.registered_at,
        NaiveDate::from_ymd_opt(2025, 1, 10).and_then(|d| d.and_hms_opt(8, 15, 0))
    );
    assert_eq!(first.graduation_date, NaiveDate::from_ymd_opt(2022, 12, 20));
    assert_eq!(first.track, AcademicTrack::Direct);

    let second = &report.candidates[1];
    assert_eq!(second.birth_date, NaiveDate::from_ymd_opt(2006, 5, 4));
    assert_eq!(second.registered_at, None);
    assert_eq!(second.track, AcademicTrack::Free);
}

#[test]
fn test_corrupt_excel_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "roto.xlsx", "no es un libro de excel");

    let err = CandidateImporter::default().import_file(&path, exam_date()).unwrap_err();
    assert!(matches!(err, ImportError::ExcelParseError(_)));
}

#[test]
fn test_export_results_and_occupancy() {
    let dir = TempDir::new().unwrap();
    let source = write_file(
        &dir,
        "in.csv",
        "CODIGO\tNOMBRE\tOPCION1\tDNI\tNOTA_AC\tNOTA_CO\tESTADO_ACADEMICO\n\
         E1\tANA\tDERECHO\t11111111\t7\t6\tPOSTULANTE\n",
    );
    let report = CandidateImporter::default().import_file(&source, exam_date()).unwrap();
    assert_eq!(report.candidates.len(), 1);

    let out = dir.path().join("resultados.csv");
    let rows = ResultExporter.export_candidates(&out, &report.candidates).unwrap();
    assert_eq!(rows, 1);

    let text = std::fs::read_to_string(&out).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("CODIGO,APELLIDOS_NOMBRES,OPCION1"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("E1,ANA,DERECHO,,ORDINARIO,11111111"));
    assert!(row.contains("13.00,NO INGRESO,"));

    let programs = vec![unas_admission::Program::new("DER", "DERECHO", "DERECHO", 30)];
    let out = dir.path().join("ocupacion.csv");
    ResultExporter.export_occupancy(&out, &programs).unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text.lines().nth(1), Some("DERECHO,DER,30,0,30,0.00"));
}
