// ==========================================
// 制造订单工艺路线 - 命令行入口
// ==========================================
// 用法:
//   aps-routing <scenario.json> [--qty JOB:MO=QTY]... [--out PATH] [--config PATH]
//
// 加载场景快照, 依次应用需求数量修改 (未指定时重算全部订单),
// 打印订单数量汇总 (JSON), 结果写回场景文件或 --out 指定的文件。
// ==========================================

use anyhow::{anyhow, bail, Context};
use aps_routing::config::{default_config_path, ConfigManager};
use aps_routing::{logging, RoutingApi, RoutingStore};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

struct CliArgs {
    scenario: PathBuf,
    qty_changes: Vec<(String, String, f64)>,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<CliArgs> {
    let mut args = args.into_iter();
    let mut scenario = None;
    let mut qty_changes = Vec::new();
    let mut out = None;
    let mut config = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--qty" => {
                let raw = args.next().ok_or_else(|| anyhow!("--qty 缺少参数 JOB:MO=QTY"))?;
                qty_changes.push(parse_qty_change(&raw)?);
            }
            "--out" => {
                out = Some(PathBuf::from(args.next().ok_or_else(|| anyhow!("--out 缺少路径"))?));
            }
            "--config" => {
                config = Some(PathBuf::from(args.next().ok_or_else(|| anyhow!("--config 缺少路径"))?));
            }
            other if other.starts_with("--") => bail!("未知参数: {}", other),
            other => {
                if scenario.replace(PathBuf::from(other)).is_some() {
                    bail!("只能指定一个场景文件");
                }
            }
        }
    }

    Ok(CliArgs {
        scenario: scenario.ok_or_else(|| {
            anyhow!("用法: aps-routing <scenario.json> [--qty JOB:MO=QTY]... [--out PATH] [--config PATH]")
        })?,
        qty_changes,
        out,
        config,
    })
}

/// "J1:MO1=25" -> ("J1", "MO1", 25.0)
fn parse_qty_change(raw: &str) -> anyhow::Result<(String, String, f64)> {
    let (target, qty) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("数量修改格式应为 JOB:MO=QTY: {}", raw))?;
    let (job, mo) = target
        .split_once(':')
        .ok_or_else(|| anyhow!("数量修改格式应为 JOB:MO=QTY: {}", raw))?;
    let qty: f64 = qty
        .trim()
        .parse()
        .with_context(|| format!("数量无效: {}", raw))?;
    Ok((job.trim().to_string(), mo.trim().to_string(), qty))
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let args = parse_args(std::env::args().skip(1))?;

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = ConfigManager::new(&config_path)?;
    aps_routing::i18n::set_locale(&config.locale()?);

    tracing::info!("{} v{}", aps_routing::APP_NAME, aps_routing::VERSION);
    tracing::info!("加载场景: {}", args.scenario.display());
    let store = RoutingStore::load_from_file(&args.scenario)
        .with_context(|| format!("加载场景失败: {}", args.scenario.display()))?;

    let api = RoutingApi::from_config(Arc::new(Mutex::new(store)), &config)
        .map_err(|e| anyhow!(e.localized_message()))?;

    if args.qty_changes.is_empty() {
        api.update_all_mo_quantities()
            .map_err(|e| anyhow!(e.localized_message()))?;
    }
    for (job, mo, qty) in &args.qty_changes {
        api.update_mo_required_qty(job, mo, *qty)
            .map_err(|e| anyhow!(e.localized_message()))?;
    }

    let summaries = api
        .list_mo_quantity_summaries()
        .map_err(|e| anyhow!(e.localized_message()))?;
    println!("{}", serde_json::to_string_pretty(&summaries)?);

    let out = args.out.unwrap_or(args.scenario);
    let store = api.store();
    let store = store.lock().map_err(|e| anyhow!("存储锁获取失败: {}", e))?;
    store.save_to_file(&out)?;
    tracing::info!("结果已写入: {}", out.display());
    Ok(())
}
