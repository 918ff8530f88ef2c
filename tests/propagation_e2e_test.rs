// ==========================================
// 数量传播端到端测试
// ==========================================
// 场景: 下料 -> 冲压 (报废 20%, 按前序可供量扣减) -> 装配 (单耗 2)
// 流程: 场景文件 -> 重算 -> 修改需求 -> 物料/产出缩放 -> 写回 -> 重新加载
// ==========================================

mod test_helpers;

use aps_routing::config::{config_keys, ConfigManager};
use aps_routing::{RoutingApi, RoutingStore};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use test_helpers::{assert_qty, MoBuilder, OpSpec};

fn stamping_scenario(store: &mut RoutingStore) {
    MoBuilder::new("J1", "MO1", 10.0)
        .op(OpSpec::new("10", "下料"))
        .op(
            OpSpec::new("20", "冲压")
                .scrap(0.2)
                .deduct_scrap()
                .activities(2)
                .material(50.0, 100.0),
        )
        .op(OpSpec::new("30", "装配").product(10.0))
        .path(
            "MAIN",
            &[("10", Some("20"), 1.0), ("20", Some("30"), 2.0), ("30", None, 1.0)],
        )
        .build(store);
}

fn row<'a>(
    summary: &'a aps_routing::api::MoQuantitySummary,
    op_external_id: &str,
) -> &'a aps_routing::api::OperationQuantityRow {
    summary
        .operations
        .iter()
        .find(|r| r.external_id == op_external_id)
        .unwrap()
}

#[test]
fn test_scrap_and_usage_through_three_operations() {
    let mut store = RoutingStore::new();
    stamping_scenario(&mut store);
    let api = test_helpers::create_test_api(store);

    api.update_all_mo_quantities().unwrap();
    let summary = api.mo_quantity_summary("J1", "MO1").unwrap();

    // 装配: 10 件, 每件消耗 2 个冲压件
    assert_qty(row(&summary, "30").required_finish_qty, 10.0);
    // 冲压: 产出 20, 投入 20 / 0.8 = 25, 报废 5
    assert_qty(row(&summary, "20").required_finish_qty, 20.0);
    assert_qty(row(&summary, "20").required_start_qty, 25.0);
    assert_qty(row(&summary, "20").expected_scrap_qty, 5.0);
    // 下料: 满足冲压投入
    assert_qty(row(&summary, "10").required_finish_qty, 25.0);
    assert_qty(summary.expected_finish_qty, 10.0);

    // 冲压两个作业各分 10, 投入向上取整 12.5 -> 13
    let shared = api.store();
    let store = shared.lock().unwrap();
    let mo = store.find_mo("J1", "MO1").unwrap();
    let stamping = store.find_operation(mo, "20").unwrap();
    for activity_id in store.operation(stamping).unwrap().activities() {
        let activity = store.activity(*activity_id).unwrap();
        assert_qty(activity.required_finish_qty, 10.0);
        assert_qty(activity.required_start_qty, 13.0);
    }
}

#[test]
fn test_quantity_change_rescales_materials_and_products() {
    let mut store = RoutingStore::new();
    stamping_scenario(&mut store);
    let api = test_helpers::create_test_api(store);
    api.update_all_mo_quantities().unwrap();

    let expected = api.update_mo_required_qty("J1", "MO1", 15.0).unwrap();
    assert_qty(expected, 15.0);

    let summary = api.mo_quantity_summary("J1", "MO1").unwrap();
    // 冲压: 产出 30, 投入 30 / 0.8 = 37.5 -> 38, 报废 7.6 -> 8
    assert_qty(row(&summary, "20").required_start_qty, 38.0);
    assert_qty(row(&summary, "20").expected_scrap_qty, 8.0);
    // 可供 38 件投入, 扣报废后 30.4 -> 30
    assert_qty(row(&summary, "20").remaining_finish_qty, 30.0);

    let shared = api.store();
    let store = shared.lock().unwrap();
    let mo = store.find_mo("J1", "MO1").unwrap();

    // 物料需求按投入比例 38 / 25 缩放
    let stamping = store.operation(store.find_operation(mo, "20").unwrap()).unwrap();
    let requirement = store
        .material_requirement(stamping.material_requirements()[0])
        .unwrap();
    assert_qty(requirement.total_required_qty, 76.0);
    assert_qty(requirement.total_cost, 152.0);

    // 产出品按产出比例 15 / 10 缩放
    let assembly = store.operation(store.find_operation(mo, "30").unwrap()).unwrap();
    let product = store.product(assembly.products()[0]).unwrap();
    assert_qty(product.total_output_qty, 15.0);
}

#[test]
fn test_scenario_file_roundtrip_with_config() {
    let dir = tempdir().unwrap();
    let scenario = dir.path().join("scenario.json");

    let mut store = RoutingStore::new();
    stamping_scenario(&mut store);
    store.save_to_file(&scenario).unwrap();

    let config = ConfigManager::new(dir.path().join("config.json")).unwrap();
    config.set_config_value(config_keys::COST_DECIMALS, "0").unwrap();
    config.save().unwrap();

    let loaded = RoutingStore::load_from_file(&scenario).unwrap();
    let api = RoutingApi::from_config(Arc::new(Mutex::new(loaded)), &config).unwrap();
    api.update_all_mo_quantities().unwrap();
    api.update_mo_required_qty("J1", "MO1", 12.0).unwrap();
    api.store().lock().unwrap().save_to_file(&scenario).unwrap();

    let reloaded = RoutingStore::load_from_file(&scenario).unwrap();
    let mo = reloaded.find_mo("J1", "MO1").unwrap();
    assert_qty(reloaded.mo(mo).unwrap().required_qty, 12.0);
    assert_qty(reloaded.mo(mo).unwrap().expected_finish_qty, 12.0);

    // 冲压投入 24 / 0.8 = 30, 成本 100 × 30 / 25 = 120 (保留 0 位小数)
    let stamping = reloaded
        .operation(reloaded.find_operation(mo, "20").unwrap())
        .unwrap();
    assert_qty(stamping.required_start_qty, 30.0);
    let requirement = reloaded
        .material_requirement(stamping.material_requirements()[0])
        .unwrap();
    assert_qty(requirement.total_cost, 120.0);
}

#[test]
fn test_invalid_config_is_reported() {
    let config = ConfigManager::in_memory();
    config.set_config_value(config_keys::ROLLBACK_ON_FAILURE, "maybe").unwrap();

    let result = RoutingApi::from_config(Arc::new(Mutex::new(RoutingStore::new())), &config);
    assert!(matches!(result, Err(aps_routing::ApiError::ConfigError(_))));
}
