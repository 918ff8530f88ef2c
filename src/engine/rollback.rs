// ==========================================
// 制造订单工艺路线 - 调用级快照回滚
// ==========================================
// 顶层调用失败时把存储恢复到调用前的状态
// ==========================================

use crate::engine::error::EngineResult;
use crate::repository::RoutingStore;
use tracing::warn;

/// 在快照保护下执行 `f`; `enabled=false` 时直接执行 (失败可能留下部分修改)
pub(crate) fn with_rollback<T>(
    store: &mut RoutingStore,
    enabled: bool,
    f: impl FnOnce(&mut RoutingStore) -> EngineResult<T>,
) -> EngineResult<T> {
    if !enabled {
        return f(store);
    }

    let snapshot = store.clone();
    match f(store) {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!(error = %err, "引擎调用失败, 存储已回滚");
            *store = snapshot;
            Err(err)
        }
    }
}
