// ==========================================
// 数量取整与报废换算
// ==========================================

/// 浮点误差容忍度: 99.9999999999 视为 100
const QTY_EPSILON: f64 = 1e-9;

/// 向上取整 (容忍浮点误差)
pub(crate) fn ceil_qty(qty: f64) -> f64 {
    (qty - QTY_EPSILON).ceil()
}

/// 向下取整 (容忍浮点误差)
pub(crate) fn floor_qty(qty: f64) -> f64 {
    (qty + QTY_EPSILON).floor()
}

/// 保留指定小数位
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// 成品率 (1 - 报废率), 报废率限定在 [0, 1]
pub(crate) fn yield_factor(scrap_percent: f64) -> f64 {
    1.0 - scrap_percent.clamp(0.0, 1.0)
}

/// 由产出数量反推投入数量与预计报废数量
///
/// 返回 (投入数量, 报废数量); 整数拆分时两者均向上取整。
/// 报废率为 1 时无法反推, 投入数量按产出数量计。
pub(crate) fn scrap_adjusted_start(finish_qty: f64, scrap_percent: f64, whole_number: bool) -> (f64, f64) {
    let factor = yield_factor(scrap_percent);
    let mut start = if factor > 0.0 { finish_qty / factor } else { finish_qty };
    if whole_number {
        start = ceil_qty(start);
    }

    let scrap = scrap_percent.clamp(0.0, 1.0) * start;
    if whole_number {
        (start, ceil_qty(scrap))
    } else {
        (start, scrap)
    }
}
