// ==========================================
// 制造订单工艺路线 - 实体句柄
// ==========================================
// 职责: 为路线存储中的每类实体提供类型安全的整数句柄
// 说明: 句柄只在同一个 RoutingStore 内有效
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// 在存储数组中的下标
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $prefix, self.0)
            }
        }
    };
}

define_handle!(
    /// 制造订单句柄
    MoId,
    "MO"
);
define_handle!(
    /// 替代路径句柄
    PathId,
    "PATH"
);
define_handle!(
    /// 路径节点(边)句柄
    NodeId,
    "NODE"
);
define_handle!(
    /// 工序句柄
    OpId,
    "OP"
);
define_handle!(
    /// 作业(工序拆分单元)句柄
    ActivityId,
    "ACT"
);
define_handle!(
    /// 物料需求句柄
    MaterialReqId,
    "MR"
);
define_handle!(
    /// 产出品句柄
    ProductId,
    "PRD"
);
