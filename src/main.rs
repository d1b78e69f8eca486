// ==========================================
// 招生录取分配系统 - 命令行入口
// ==========================================
// 用法: unas-admission [--db <path>] <command> [args]
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use unas_admission::api::{get_default_db_path, AdmissionApi};
use unas_admission::domain::types::AllocationPhase;
use unas_admission::logging;

const DEFAULT_RUN_LIMIT: usize = 10;

const USAGE: &str = "\
用法: unas-admission [--db <path>] <command> [args]

命令:
  seed                                         写入默认专业目录
  add-program <code> <name> <faculty> <capacity> [curve]
                                               登记专业（不指定曲线时按考试类别取值）
  threshold <value>                            设置及格线
  import <file> [--date YYYY-MM-DD]            导入考生名单（.csv/.xlsx/.xls）
  run                                          执行四阶段分配
  export <out.csv>                             导出考生结果
  report <out.csv>                             导出专业占用报表
  runs [limit]                                 查看最近的分配运行";

fn main() -> Result<()> {
    logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let db_path = take_option(&mut args, "--db")?.unwrap_or_else(get_default_db_path);

    let Some(command) = args.first().cloned() else {
        println!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    tracing::info!("{} v{} - 数据库: {}", unas_admission::APP_NAME, unas_admission::VERSION, db_path);
    let api = AdmissionApi::new(&db_path)?;

    match command.as_str() {
        "seed" => {
            let count = api.seed_default_programs()?;
            println!("已写入 {} 个专业", count);
        }
        "add-program" => {
            let [code, name, faculty, capacity, ..] = rest else {
                bail!("add-program 需要 <code> <name> <faculty> <capacity> [curve]\n\n{}", USAGE);
            };
            let capacity: i32 = capacity
                .parse()
                .with_context(|| format!("名额不是整数: {}", capacity))?;
            let curve = rest
                .get(4)
                .map(|v| v.parse::<f64>().with_context(|| format!("曲线不是数字: {}", v)))
                .transpose()?;

            let program = api.register_program(code, name, faculty, capacity, curve)?;
            println!(
                "已登记 {} ({}), 名额 {}, 曲线 {:.2}",
                program.name, program.exam_category, program.capacity, program.curve_bonus
            );
        }
        "threshold" => {
            let value = rest.first().ok_or_else(|| anyhow!("threshold 需要 <value>"))?;
            let threshold: f64 = value
                .replace(',', ".")
                .parse()
                .with_context(|| format!("及格线不是数字: {}", value))?;
            api.set_passing_threshold(threshold)?;
            println!("及格线已设置为 {:.2}", threshold);
        }
        "import" => {
            let mut rest = rest.to_vec();
            let reference_date = match take_option(&mut rest, "--date")? {
                Some(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .with_context(|| format!("日期格式应为 YYYY-MM-DD: {}", value))?,
                None => Local::now().date_naive(),
            };
            let file = rest.first().ok_or_else(|| anyhow!("import 需要 <file>"))?;

            let response = api.import_candidates(file, reference_date)?;
            println!(
                "批次 {}: 共 {} 行, 导入 {}, 阻断 {}, 警告 {}, 冲突 {} ({} ms)",
                response.batch_id,
                response.dq_summary.total_rows,
                response.imported,
                response.dq_summary.blocked,
                response.dq_summary.warning,
                response.dq_summary.conflict,
                response.elapsed_ms
            );
            for violation in &response.dq_violations {
                println!(
                    "  第 {} 行 [{}] {}: {}",
                    violation.row_number, violation.level, violation.field, violation.message
                );
            }
        }
        "run" => {
            let response = api.run_allocation()?;
            let stats = &response.result.stats;
            println!("运行 {} (及格线 {:.2})", response.run_id, response.threshold);
            for phase in AllocationPhase::ORDERED {
                println!("  {:<14} 录取 {}", phase.to_string(), response.result.admitted_in_phase(phase));
            }
            for roster in &response.result.rosters {
                println!(
                    "  {:<40} {:>3}/{:<3} ({:.2}%)",
                    roster.program_name, roster.occupied, roster.capacity, roster.occupancy_percentage
                );
            }
            println!(
                "考生 {}, 录取 {}, 未录取 {}, 总占用 {}/{} ({:.2}%)",
                stats.total_candidates,
                stats.total_admitted,
                stats.total_rejected,
                stats.total_occupied,
                stats.total_capacity,
                stats.occupancy_percentage
            );
        }
        "export" => {
            let path = rest.first().ok_or_else(|| anyhow!("export 需要 <out.csv>"))?;
            let rows = api.export_results(path)?;
            println!("已导出 {} 名考生到 {}", rows, path);
        }
        "report" => {
            let path = rest.first().ok_or_else(|| anyhow!("report 需要 <out.csv>"))?;
            let rows = api.export_occupancy(path)?;
            println!("已导出 {} 个专业到 {}", rows, path);
        }
        "runs" => {
            let limit = match rest.first() {
                Some(v) => v.parse().with_context(|| format!("limit 不是整数: {}", v))?,
                None => DEFAULT_RUN_LIMIT,
            };
            for run in api.list_runs(limit)? {
                println!(
                    "{}  {}  及格线 {:.2}  录取 {}/{}  占用 {}/{}",
                    run.executed_at.format("%Y-%m-%d %H:%M:%S"),
                    run.run_id,
                    run.threshold,
                    run.total_admitted,
                    run.total_candidates,
                    run.total_occupied,
                    run.total_capacity
                );
            }
        }
        "help" | "--help" | "-h" => println!("{}", USAGE),
        other => bail!("未知命令: {}\n\n{}", other, USAGE),
    }

    Ok(())
}

/// 取出 `--name <value>` 形式的选项并从参数列表中移除
fn take_option(args: &mut Vec<String>, name: &str) -> Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        bail!("{} 需要一个值", name);
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}
