// ==========================================
// 招生录取分配系统 - 日志初始化
// ==========================================
// 输出: stderr（stdout 留给命令结果）
// 级别: UNAS_ADMISSION_LOG > RUST_LOG > info
// 格式: UNAS_ADMISSION_LOG_FORMAT=json 时输出 JSON 行
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志级别环境变量（优先于 RUST_LOG）
pub const LOG_LEVEL_ENV: &str = "UNAS_ADMISSION_LOG";

/// 日志格式环境变量
pub const LOG_FORMAT_ENV: &str = "UNAS_ADMISSION_LOG_FORMAT";

const DEFAULT_DIRECTIVE: &str = "info";

/// 初始化日志系统
///
/// 例如 `UNAS_ADMISSION_LOG=unas_admission::engine=debug` 可查看每次录取的明细。
pub fn init() {
    let filter = build_filter();
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// 测试用: debug 级别,输出交给测试框架捕获;可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("unas_admission=debug"))
        .with_test_writer()
        .try_init();
}

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}
