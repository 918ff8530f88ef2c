// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别与输出格式
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=aps_routing::engine::quantity=debug 查看逐条路径的遍历次数,
///   RUST_LOG=aps_routing::engine::duplicator=debug 查看副本工序接入路径的节点数
/// - APS_LOG_FORMAT: `json` 时输出 JSON 行 (便于批量运行场景后检索), 其他值为文本
///
/// # 示例
/// ```no_run
/// use aps_routing::{logging, RoutingStore};
/// logging::init();
/// let store = RoutingStore::load_from_file("scenario.json").unwrap();
/// ```
pub fn init() {
    // 从环境变量读取日志级别，默认为 info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("APS_LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// 初始化测试环境的日志系统
///
/// 引擎模块开到 debug, 便于失败时查看路径遍历与回滚日志; 重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("aps_routing=debug"))
        .with_test_writer()
        .try_init();
}
