// ==========================================
// 制造订单工艺路线 - 路线 API
// ==========================================
// 职责: 需求数量修改 / 数量重算 / 订单与工序复制 / 数量汇总查询
// 红线: 外部只传外部编号 (Job/MO/工序), 句柄不出 API 层
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::ids::MoId;
use crate::engine::{EngineConfig, QuantityPropagator, StructuralDuplicator};
use crate::repository::RoutingStore;

// ==========================================
// RoutingApi - 路线 API
// ==========================================

/// 路线API
///
/// 职责：
/// 1. 修改订单需求数量并重算工序/作业数量
/// 2. 复制订单 / 复制工序并接入当前路径
/// 3. 订单数量汇总 (界面展示)
pub struct RoutingApi {
    store: Arc<Mutex<RoutingStore>>,
    propagator: QuantityPropagator,
    duplicator: StructuralDuplicator,
}

impl RoutingApi {
    /// 创建新的RoutingApi实例
    pub fn new(store: Arc<Mutex<RoutingStore>>, config: EngineConfig) -> Self {
        Self {
            store,
            propagator: QuantityPropagator::new(config.clone()),
            duplicator: StructuralDuplicator::new(config),
        }
    }

    /// 按配置管理器中的引擎配置创建
    pub fn from_config(store: Arc<Mutex<RoutingStore>>, config: &ConfigManager) -> ApiResult<Self> {
        let engine_config = config
            .engine_config()
            .map_err(|e| ApiError::ConfigError(format!("{:#}", e)))?;
        Ok(Self::new(store, engine_config))
    }

    /// 共享的路线存储
    pub fn store(&self) -> Arc<Mutex<RoutingStore>> {
        Arc::clone(&self.store)
    }

    fn lock(&self) -> ApiResult<MutexGuard<'_, RoutingStore>> {
        self.store
            .lock()
            .map_err(|e| ApiError::LockError(e.to_string()))
    }

    /// 修改订单需求数量并重算
    ///
    /// # 参数
    /// - job_external_id: 作业单编号
    /// - mo_external_id: 订单编号
    /// - new_qty: 新需求数量 (有限且非负)
    ///
    /// # 返回
    /// - Ok(f64): 订单预计完工数量
    /// - Err(ApiError): API错误
    pub fn update_mo_required_qty(
        &self,
        job_external_id: &str,
        mo_external_id: &str,
        new_qty: f64,
    ) -> ApiResult<f64> {
        if !new_qty.is_finite() || new_qty < 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "需求数量必须为非负有限数: {}",
                new_qty
            )));
        }

        let mut store = self.lock()?;
        let mo_id = resolve_mo(&store, job_external_id, mo_external_id)?;
        let expected = self
            .propagator
            .update_mo_required_qty(&mut store, mo_id, new_qty)?;

        info!(
            job = %job_external_id,
            mo = %mo_external_id,
            new_qty = new_qty,
            expected_finish_qty = expected,
            "订单需求数量已更新"
        );
        Ok(expected)
    }

    /// 需求数量不变, 重算单个订单
    pub fn update_quantities(&self, job_external_id: &str, mo_external_id: &str) -> ApiResult<f64> {
        let mut store = self.lock()?;
        let mo_id = resolve_mo(&store, job_external_id, mo_external_id)?;
        Ok(self.propagator.update_quantities(&mut store, mo_id)?)
    }

    /// 重算全部订单
    pub fn update_all_mo_quantities(&self) -> ApiResult<()> {
        let mut store = self.lock()?;
        self.propagator.update_all_mo_quantities(&mut store)?;
        Ok(())
    }

    /// 复制订单
    ///
    /// # 返回
    /// - Ok(Vec<String>): 新订单编号 (按复制顺序)
    pub fn copy_mo(&self, job_external_id: &str, mo_external_id: &str, count: u32) -> ApiResult<Vec<String>> {
        let mut store = self.lock()?;
        let copies = self
            .duplicator
            .copy_mo_by_external_id(&mut store, job_external_id, mo_external_id, count)?;

        let external_ids = copies
            .into_iter()
            .map(|id| store.mo(id).map(|mo| mo.external_id.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            job = %job_external_id,
            mo = %mo_external_id,
            copies = ?external_ids,
            "订单复制完成"
        );
        Ok(external_ids)
    }

    /// 复制工序并接入当前路径, 随后重算订单数量
    ///
    /// # 返回
    /// - Ok(String): 新工序编号
    pub fn insert_operation_copy(
        &self,
        job_external_id: &str,
        mo_external_id: &str,
        op_external_id: &str,
    ) -> ApiResult<String> {
        let mut store = self.lock()?;
        let snapshot = if self.propagator.config().rollback_on_failure {
            Some(store.clone())
        } else {
            None
        };

        let result = self
            .duplicator
            .insert_operation_copy(&mut store, job_external_id, mo_external_id, op_external_id)
            .and_then(|copy| {
                let mo_id = store.operation(copy)?.mo;
                self.propagator.update_quantities(&mut store, mo_id)?;
                Ok(store.operation(copy)?.external_id.clone())
            });

        match result {
            Ok(copy_external_id) => Ok(copy_external_id),
            Err(err) => {
                // 复制成功但重算失败时也整体回退
                if let Some(snapshot) = snapshot {
                    *store = snapshot;
                }
                Err(err.into())
            }
        }
    }

    /// 订单数量汇总
    pub fn mo_quantity_summary(
        &self,
        job_external_id: &str,
        mo_external_id: &str,
    ) -> ApiResult<MoQuantitySummary> {
        let store = self.lock()?;
        let mo_id = resolve_mo(&store, job_external_id, mo_external_id)?;
        build_summary(&store, mo_id)
    }

    /// 全部订单数量汇总 (按插入顺序)
    pub fn list_mo_quantity_summaries(&self) -> ApiResult<Vec<MoQuantitySummary>> {
        let store = self.lock()?;
        store
            .mo_ids()
            .into_iter()
            .map(|id| build_summary(&store, id))
            .collect()
    }
}

fn resolve_mo(store: &RoutingStore, job_external_id: &str, mo_external_id: &str) -> ApiResult<MoId> {
    if job_external_id.trim().is_empty() || mo_external_id.trim().is_empty() {
        return Err(ApiError::InvalidInput("作业单编号和订单编号不能为空".to_string()));
    }
    store
        .find_mo(job_external_id, mo_external_id)
        .ok_or_else(|| ApiError::NotFound(format!("订单 {}/{} 不存在", job_external_id, mo_external_id)))
}

fn build_summary(store: &RoutingStore, mo_id: MoId) -> ApiResult<MoQuantitySummary> {
    let mo = store.mo(mo_id)?;
    let current_path = match mo.current_path {
        Some(path_id) => Some(store.path(path_id)?.external_id.clone()),
        None => None,
    };

    let mut operations = Vec::with_capacity(mo.operations().len());
    for op_id in mo.operations() {
        let op = store.operation(*op_id)?;
        let mut finished_activity_count = 0;
        for activity_id in op.activities() {
            if store.activity(*activity_id)?.is_finished() {
                finished_activity_count += 1;
            }
        }
        operations.push(OperationQuantityRow {
            external_id: op.external_id.clone(),
            name: op.name.clone(),
            required_start_qty: op.required_start_qty,
            required_finish_qty: op.required_finish_qty,
            remaining_finish_qty: op.remaining_finish_qty,
            expected_scrap_qty: op.expected_scrap_qty,
            activity_count: op.activities().len(),
            finished_activity_count,
        });
    }

    Ok(MoQuantitySummary {
        job_external_id: mo.job_external_id.clone(),
        mo_external_id: mo.external_id.clone(),
        name: mo.name.clone(),
        required_qty: mo.required_qty,
        expected_finish_qty: mo.expected_finish_qty,
        current_path,
        operations,
    })
}

// ==========================================
// 数量汇总结构
// ==========================================

/// 订单数量汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoQuantitySummary {
    pub job_external_id: String,
    pub mo_external_id: String,
    pub name: String,
    pub required_qty: f64,
    pub expected_finish_qty: f64,
    pub current_path: Option<String>,
    pub operations: Vec<OperationQuantityRow>,
}

/// 工序数量行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationQuantityRow {
    pub external_id: String,
    pub name: String,
    pub required_start_qty: f64,
    pub required_finish_qty: f64,
    pub remaining_finish_qty: f64,
    pub expected_scrap_qty: f64,
    pub activity_count: usize,
    pub finished_activity_count: usize,
}
