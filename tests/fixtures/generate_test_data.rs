// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成 6 个考生名单测试数据集 CSV 文件
// 输出: tests/fixtures/datasets/*.csv
// ==========================================

use chrono::{Duration, NaiveDate};
use csv::Writer;
use std::error::Error;
use std::fs::{self, File};

const OUTPUT_DIR: &str = "tests/fixtures/datasets";

// CSV 表头（与导入器别名一致）
const CSV_HEADER: &[&str] = &[
    "CODIGO",
    "APELLIDOS_NOMBRES",
    "DNI",
    "MODALIDAD",
    "SEXO",
    "NOTA_AC",
    "NOTA_CO",
    "OPCION1",
    "OPCION2",
    "ESTADO_ACADEMICO",
    "FEC_NAC",
    "FECHA_INSCRIPCION",
];

// 默认专业目录中的专业名称
const PROGRAMS: &[&str] = &[
    "INGENIERÍA DE SISTEMAS E INFORMÁTICA",
    "INGENIERÍA CIVIL",
    "MEDICINA HUMANA",
    "ENFERMERÍA",
    "ADMINISTRACIÓN",
    "CONTABILIDAD",
    "DERECHO Y CIENCIAS POLÍTICAS",
    "PSICOLOGÍA",
];

const SURNAMES: &[&str] = &["QUISPE", "MAMANI", "FLORES", "ROJAS", "HUAMAN", "TORRES", "CHAVEZ"];
const NAMES: &[&str] = &["JUAN", "ANA", "LUIS", "ROSA", "CARLOS", "MARIA", "JOSE", "RUTH"];

// 考生记录结构
#[derive(Clone)]
struct CandidateRecord {
    code: String,
    full_name: String,
    national_id: String,
    modality: String,
    sex: String,
    aptitude: String,
    knowledge: String,
    first_choice: String,
    second_choice: String,
    track: String,
    birth_date: String,
    registered_at: String,
}

impl CandidateRecord {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.full_name.clone(),
            self.national_id.clone(),
            self.modality.clone(),
            self.sex.clone(),
            self.aptitude.clone(),
            self.knowledge.clone(),
            self.first_choice.clone(),
            self.second_choice.clone(),
            self.track.clone(),
            self.birth_date.clone(),
            self.registered_at.clone(),
        ]
    }
}

// 生成正常考生记录（分数由下标确定，可重复生成）
fn generate_normal_record(index: usize) -> CandidateRecord {
    let birth_base = NaiveDate::from_ymd_opt(2005, 1, 1).unwrap_or_default();
    let registration_base = NaiveDate::from_ymd_opt(2025, 1, 6)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap_or_default();

    let aptitude = (index * 37 % 100) as f64 / 10.0;
    let knowledge = (index * 53 % 100) as f64 / 10.0;
    let first = index % PROGRAMS.len();
    let second = (index * 3 + 1) % PROGRAMS.len();

    CandidateRecord {
        code: format!("2025{:05}", index + 1),
        full_name: format!(
            "{} {} {}",
            SURNAMES[index % SURNAMES.len()],
            SURNAMES[(index / 3) % SURNAMES.len()],
            NAMES[index % NAMES.len()]
        ),
        national_id: format!("{:08}", 40_000_000 + index * 17),
        modality: ["ORDINARIO", "ORDINARIO", "EXONERADO", "BECA 18"][index % 4].to_string(),
        sex: ["M", "F"][index % 2].to_string(),
        aptitude: format!("{:.1}", aptitude),
        knowledge: format!("{:.1}", knowledge),
        first_choice: PROGRAMS[first].to_string(),
        second_choice: if index % 3 == 0 || second == first {
            String::new()
        } else {
            PROGRAMS[second].to_string()
        },
        track: ["POSTULANTE", "POSTULANTE", "POSTULANTE", "ALUMNO_LIBRE"][index % 4].to_string(),
        birth_date: (birth_base + Duration::days((index * 11 % 1500) as i64)).to_string(),
        registered_at: (registration_base + Duration::minutes((index * 7) as i64))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("开始生成测试数据集...");
    fs::create_dir_all(OUTPUT_DIR)?;

    // 1. 正常数据 (300条)
    generate_normal_data()?;

    // 2. 大数据集 (3000条)
    generate_large_dataset()?;

    // 3. 批次内重复编号/DNI
    generate_duplicates()?;

    // 4. 非法取值
    generate_invalid_values()?;

    // 5. 志愿专业不在目录中
    generate_unmatched_programs()?;

    // 6. 同分考生（测试排序规则）
    generate_ties()?;

    println!("✓ 所有测试数据集生成完成！");
    Ok(())
}

fn write_dataset(file_name: &str, records: &[CandidateRecord]) -> Result<(), Box<dyn Error>> {
    let path = format!("{}/{}", OUTPUT_DIR, file_name);
    let file = File::create(path)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(&record.to_row())?;
    }

    wtr.flush()?;
    Ok(())
}

fn generate_normal_data() -> Result<(), Box<dyn Error>> {
    let records: Vec<CandidateRecord> = (0..300).map(generate_normal_record).collect();
    write_dataset("01_normal_data.csv", &records)?;
    println!("✓ 生成 01_normal_data.csv (300条)");
    Ok(())
}

fn generate_large_dataset() -> Result<(), Box<dyn Error>> {
    let records: Vec<CandidateRecord> = (0..3000).map(|i| generate_normal_record(i + 10000)).collect();
    write_dataset("02_large_dataset.csv", &records)?;
    println!("✓ 生成 02_large_dataset.csv (3000条)");
    Ok(())
}

fn generate_duplicates() -> Result<(), Box<dyn Error>> {
    let mut records: Vec<CandidateRecord> = (0..15).map(|i| generate_normal_record(i + 20000)).collect();

    // 编号重复
    for i in [0, 4, 8] {
        let mut record = generate_normal_record(i + 20000);
        record.national_id = format!("{:08}", 70_000_000 + i);
        records.push(record);
    }

    // DNI 重复
    for i in [2, 6] {
        let mut record = generate_normal_record(i + 21000);
        record.national_id = records[i].national_id.clone();
        records.push(record);
    }

    write_dataset("03_duplicates.csv", &records)?;
    println!("✓ 生成 03_duplicates.csv (20条，3条编号重复，2条DNI重复)");
    Ok(())
}

fn generate_invalid_values() -> Result<(), Box<dyn Error>> {
    let mut records = Vec::new();

    // 缺少编号
    let mut record = generate_normal_record(30000);
    record.code = String::new();
    records.push(record);

    // DNI 位数错误
    let mut record = generate_normal_record(30001);
    record.national_id = "1234567".to_string();
    records.push(record);

    // 分数不是数字
    let mut record = generate_normal_record(30002);
    record.aptitude = "N/A".to_string();
    records.push(record);

    // 分数超出范围
    let mut record = generate_normal_record(30003);
    record.knowledge = "-3".to_string();
    records.push(record);

    // 缺少第一志愿
    let mut record = generate_normal_record(30004);
    record.first_choice = String::new();
    records.push(record);

    // 两个志愿相同（告警）
    let mut record = generate_normal_record(30005);
    record.second_choice = record.first_choice.clone();
    records.push(record);

    // 日期格式错误（告警）
    let mut record = generate_normal_record(30006);
    record.birth_date = "31-31-2005".to_string();
    records.push(record);

    // 小数逗号（合法）
    let mut record = generate_normal_record(30007);
    record.aptitude = "7,5".to_string();
    records.push(record);

    write_dataset("04_invalid_values.csv", &records)?;
    println!("✓ 生成 04_invalid_values.csv (8条，5条阻断，2条告警)");
    Ok(())
}

fn generate_unmatched_programs() -> Result<(), Box<dyn Error>> {
    let records: Vec<CandidateRecord> = (0..10)
        .map(|i| {
            let mut record = generate_normal_record(i + 40000);
            if i % 2 == 0 {
                record.first_choice = "ARQUITECTURA".to_string();
            } else {
                record.second_choice = "ODONTOLOGÍA".to_string();
            }
            record
        })
        .collect();

    write_dataset("05_unmatched_programs.csv", &records)?;
    println!("✓ 生成 05_unmatched_programs.csv (10条，志愿不在目录中)");
    Ok(())
}

fn generate_ties() -> Result<(), Box<dyn Error>> {
    // 同一专业、同一总分，仅出生日期与报名时间不同
    let records: Vec<CandidateRecord> = (0..12)
        .map(|i| {
            let mut record = generate_normal_record(i + 50000);
            record.aptitude = "7.0".to_string();
            record.knowledge = "6.0".to_string();
            record.first_choice = PROGRAMS[2].to_string();
            record.track = "POSTULANTE".to_string();
            if i % 2 == 0 {
                record.birth_date = "2006-05-04".to_string();
            }
            record
        })
        .collect();

    write_dataset("06_ties.csv", &records)?;
    println!("✓ 生成 06_ties.csv (12条，总分相同)");
    Ok(())
}
