// ==========================================
// 招生录取分配系统 - 招生业务 API
// ==========================================
// 职责: 串起 配置 → 导入 → 分配 → 持久化 → 导出
// 说明: 所有仓储共享同一个 SQLite 连接;一次分配的写入在同一事务中提交
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::allocation::AllocationResult;
use crate::domain::candidate::Candidate;
use crate::domain::import::{DqSummary, DqViolation};
use crate::domain::program::{Program, ProgramRegistry};
use crate::engine::error::EngineError;
use crate::engine::AdmissionOrchestrator;
use crate::importer::{CandidateImporter, ResultExporter};
use crate::repository::{
    AllocationRunRecord, AllocationRunRepository, CandidateRepository, ProgramRepository,
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "UNAS_ADMISSION_DB_PATH";

/// 考生导入响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 导入批次ID
    pub batch_id: String,
    /// 实际落库的考生数量
    pub imported: usize,
    /// DQ 汇总统计
    pub dq_summary: DqSummary,
    /// DQ 违规明细
    pub dq_violations: Vec<DqViolation>,
    /// 导入耗时（毫秒）
    pub elapsed_ms: u128,
}

/// 分配运行响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRunResponse {
    pub run_id: String,
    pub executed_at: NaiveDateTime,
    pub threshold: f64,
    pub result: AllocationResult,
}

/// 招生业务API
pub struct AdmissionApi {
    db_path: String,
    conn: Arc<Mutex<Connection>>,
    config_manager: ConfigManager,
    program_repo: ProgramRepository,
    candidate_repo: CandidateRepository,
    run_repo: AllocationRunRepository,
}

impl AdmissionApi {
    /// 打开（必要时创建）数据库并初始化表结构
    pub fn new(db_path: &str) -> ApiResult<Self> {
        info!("初始化AdmissionApi，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        let conn = Arc::new(Mutex::new(conn));

        Ok(Self {
            db_path: db_path.to_string(),
            config_manager: ConfigManager::from_connection(conn.clone())?,
            program_repo: ProgramRepository::from_connection(conn.clone()),
            candidate_repo: CandidateRepository::from_connection(conn.clone()),
            run_repo: AllocationRunRepository::from_connection(conn.clone()),
            conn,
        })
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config_manager
    }

    // ==========================================
    // 专业目录
    // ==========================================

    /// 写入默认专业目录（已存在的专业按名称更新）
    pub fn seed_default_programs(&self) -> ApiResult<usize> {
        let config = self.config_manager.load_admission_config()?;
        let programs = config.default_programs();
        let count = self.program_repo.batch_upsert(&programs)?;
        info!(count, "默认专业目录已写入");
        Ok(count)
    }

    /// 登记单个专业
    ///
    /// # 参数
    /// - curve_bonus: None 时按专业名称推断考试类别,取该类别的配置曲线
    pub fn register_program(
        &self,
        code: &str,
        name: &str,
        faculty: &str,
        capacity: i32,
        curve_bonus: Option<f64>,
    ) -> ApiResult<Program> {
        if name.trim().is_empty() {
            return Err(ApiError::InvalidInput("专业名称不能为空".to_string()));
        }
        if capacity < 0 {
            return Err(ApiError::InvalidInput(format!("专业名额不能为负数: {}", capacity)));
        }
        if let Some(curve) = curve_bonus {
            if !curve.is_finite() || curve < 0.0 {
                return Err(ApiError::InvalidInput(format!("曲线加分无效: {}", curve)));
            }
        }

        let config = self.config_manager.load_admission_config()?;
        let program = config.build_program(code.trim(), name.trim(), faculty.trim(), capacity, curve_bonus);
        self.program_repo.batch_upsert(std::slice::from_ref(&program))?;

        info!(
            program = %program.name,
            capacity = program.capacity,
            curve_bonus = program.curve_bonus,
            "专业已登记"
        );
        Ok(program)
    }

    /// 停用专业（不再参与分配）
    pub fn deactivate_program(&self, name: &str) -> ApiResult<()> {
        self.program_repo.deactivate(name)?;
        Ok(())
    }

    /// 启用中的专业（目录顺序）
    pub fn list_programs(&self) -> ApiResult<Vec<Program>> {
        Ok(self.program_repo.find_active()?)
    }

    /// 设置及格线
    pub fn set_passing_threshold(&self, threshold: f64) -> ApiResult<()> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ApiError::InvalidInput(format!("及格线无效: {}", threshold)));
        }
        self.config_manager.set_passing_threshold(threshold)?;
        Ok(())
    }

    // ==========================================
    // 考生导入
    // ==========================================

    /// 导入考生名单
    ///
    /// # 参数
    /// - file_path: .csv / .xlsx / .xls
    /// - reference_date: 考试日期（缺少通道列时用于派生通道）
    ///
    /// # 返回
    /// 被阻断的行只出现在 DQ 明细中,不落库
    #[instrument(skip(self))]
    pub fn import_candidates(
        &self,
        file_path: &str,
        reference_date: NaiveDate,
    ) -> ApiResult<ImportApiResponse> {
        let window_years = self.config_manager.get_free_track_window_years()?;
        let importer = CandidateImporter::new(window_years);
        let report = importer.import_file(file_path, reference_date)?;

        let imported = self
            .candidate_repo
            .batch_upsert(&report.candidates, Some(&report.batch_id))?;

        Ok(ImportApiResponse {
            batch_id: report.batch_id,
            imported,
            dq_summary: report.summary,
            dq_violations: report.violations,
            elapsed_ms: report.elapsed_ms,
        })
    }

    pub fn find_candidate(&self, code: &str) -> ApiResult<Candidate> {
        self.candidate_repo
            .find_by_code(code)?
            .ok_or_else(|| ApiError::NotFound(format!("考生(code={})不存在", code)))
    }

    // ==========================================
    // 分配
    // ==========================================

    /// 执行一次完整分配并持久化结果
    ///
    /// 流程: 加载配置 → 加载专业与考生 → 四阶段分配 → 回写考生状态与专业占用 → 记录运行
    #[instrument(skip(self))]
    pub fn run_allocation(&self) -> ApiResult<AllocationRunResponse> {
        let config = self.config_manager.load_admission_config()?;

        let programs = self.program_repo.find_active()?;
        if programs.is_empty() {
            warn!("专业目录为空,本次分配不会录取任何考生");
        }
        let registry = ProgramRegistry::from_programs(programs).map_err(EngineError::from)?;
        let candidates = self.candidate_repo.find_all()?;

        let orchestrator = AdmissionOrchestrator::new(config.passing_threshold)?;
        let outcome = orchestrator.run(candidates, registry)?;

        let run_id = Uuid::new_v4().to_string();
        let executed_at = Local::now().naive_local();
        let snapshot = self.config_manager.get_config_snapshot()?;
        let record = AllocationRunRecord::from_result(
            run_id.clone(),
            executed_at,
            config.exam_name.clone(),
            config.passing_threshold,
            &outcome.result,
            Some(snapshot),
        );
        let programs = outcome.registry.into_programs();

        // 考生状态、专业占用、运行记录同一事务提交
        {
            let conn = self
                .conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(format!("锁获取失败: {}", e)))?;
            let tx = conn.unchecked_transaction()?;
            CandidateRepository::update_allocation_state_tx(&tx, &outcome.candidates)?;
            ProgramRepository::update_occupancy_tx(&tx, &programs)?;
            AllocationRunRepository::insert_tx(&tx, &record)?;
            tx.commit()?;
        }

        info!(
            run_id = %run_id,
            admitted = outcome.result.stats.total_admitted,
            rejected = outcome.result.stats.total_rejected,
            occupancy_pct = outcome.result.stats.occupancy_percentage,
            "分配运行已保存"
        );

        Ok(AllocationRunResponse {
            run_id,
            executed_at: record.executed_at,
            threshold: config.passing_threshold,
            result: outcome.result,
        })
    }

    /// 最近的运行记录（最新在前）
    pub fn list_runs(&self, limit: usize) -> ApiResult<Vec<AllocationRunRecord>> {
        Ok(self.run_repo.list_recent(limit)?)
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出考生结果（按考生编号排序）
    pub fn export_results(&self, path: &str) -> ApiResult<usize> {
        let candidates = self.candidate_repo.find_all()?;
        Ok(ResultExporter.export_candidates(path, &candidates)?)
    }

    /// 导出专业占用报表
    pub fn export_occupancy(&self, path: &str) -> ApiResult<usize> {
        let programs = self.program_repo.find_active()?;
        Ok(ResultExporter.export_occupancy(path, &programs)?)
    }
}

/// 获取默认数据库路径
///
/// 优先读取环境变量 UNAS_ADMISSION_DB_PATH,否则放在用户数据目录下
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./unas_admission.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("unas-admission");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("unas_admission.db");
        }
    }

    path.to_string_lossy().to_string()
}
