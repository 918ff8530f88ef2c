// ==========================================
// 制造订单工艺路线 - 场景快照 (JSON)
// ==========================================
// 职责: 路线存储的整体导入/导出
// 格式: { version, saved_at, store }
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::routing_store::RoutingStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// 当前快照格式版本
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    store: &'a RoutingStore,
}

#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

#[derive(Deserialize)]
struct SnapshotIn {
    store: RoutingStore,
}

impl RoutingStore {
    /// 导出为 JSON 快照
    pub fn to_json(&self) -> RepositoryResult<String> {
        let snapshot = SnapshotOut {
            version: SNAPSHOT_FORMAT_VERSION,
            saved_at: Utc::now(),
            store: self,
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// 从 JSON 快照恢复; 版本不匹配时拒绝
    pub fn from_json(json: &str) -> RepositoryResult<Self> {
        let header: SnapshotHeader = serde_json::from_str(json)?;
        if header.version != SNAPSHOT_FORMAT_VERSION {
            return Err(RepositoryError::UnsupportedSnapshotVersion {
                found: header.version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }

        let mut store = serde_json::from_str::<SnapshotIn>(json)?.store;
        store.rebuild_index();
        store.validate_references()?;
        debug!(mo_count = store.mo_count(), "场景快照解析完成");
        Ok(store)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> RepositoryResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), mo_count = self.mo_count(), "场景快照已保存");
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let store = Self::from_json(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), mo_count = store.mo_count(), "场景快照已加载");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::operation::{Activity, ResourceOperation};
    use crate::domain::routing::{AlternatePath, ManufacturingOrder};
    use crate::domain::types::ProductionStatus;

    #[test]
    fn test_snapshot_restores_index_and_children() {
        let mut store = RoutingStore::new();
        let mo = store
            .insert_mo(ManufacturingOrder::new("J1", "MO1", "订单1", 50.0))
            .unwrap();
        let op = store
            .insert_operation(mo, ResourceOperation::new("10", "下料"))
            .unwrap();
        let mut activity = Activity::new("A1");
        activity.production_status = ProductionStatus::Finished;
        store.insert_activity(op, activity).unwrap();
        let path = store.insert_path(mo, AlternatePath::new("P1", "主路径")).unwrap();
        store.insert_node(path, op, None, 1.0).unwrap();

        let restored = RoutingStore::from_json(&store.to_json().unwrap()).unwrap();

        let mo_id = restored.find_mo("J1", "MO1").expect("索引应被重建");
        let op_id = restored.find_operation(mo_id, "10").unwrap();
        let activity_id = restored.operation(op_id).unwrap().activities()[0];
        assert!(restored.activity(activity_id).unwrap().is_finished());
        assert_eq!(restored.mo(mo_id).unwrap().current_path, Some(path));
    }

    #[test]
    fn test_snapshot_version_mismatch() {
        let json = r#"{"version": 99, "saved_at": "2026-01-01T00:00:00Z", "store": {}}"#;
        match RoutingStore::from_json(json) {
            Err(RepositoryError::UnsupportedSnapshotVersion { found, expected }) => {
                assert_eq!(found, 99);
                assert_eq!(expected, SNAPSHOT_FORMAT_VERSION);
            }
            other => panic!("Expected UnsupportedSnapshotVersion, got {:?}", other),
        }
    }

    /// 把合法快照中的某个字段改写为指定 JSON 值
    fn tampered_snapshot(pointer: &str, value: serde_json::Value) -> String {
        let mut store = RoutingStore::new();
        let mo = store
            .insert_mo(ManufacturingOrder::new("J1", "MO1", "订单1", 10.0))
            .unwrap();
        let op = store
            .insert_operation(mo, ResourceOperation::new("10", "下料"))
            .unwrap();
        store.insert_activity(op, Activity::new("A1")).unwrap();
        let path = store.insert_path(mo, AlternatePath::new("P1", "主路径")).unwrap();
        store.insert_node(path, op, None, 1.0).unwrap();

        let mut json: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        *json.pointer_mut(pointer).unwrap() = value;
        json.to_string()
    }

    #[test]
    fn test_snapshot_rejects_dangling_handles() {
        let cases = [
            ("/store/mos/0/operations", serde_json::json!([5])),
            ("/store/mos/0/paths", serde_json::json!([3])),
            ("/store/mos/0/current_path", serde_json::json!(7)),
            ("/store/paths/0/nodes", serde_json::json!([0, 9])),
            ("/store/nodes/0/predecessor", serde_json::json!(4)),
            ("/store/operations/0/activities", serde_json::json!([2])),
        ];

        for (pointer, value) in cases {
            match RoutingStore::from_json(&tampered_snapshot(pointer, value)) {
                Err(RepositoryError::ForeignKeyViolation(_)) => {}
                other => panic!("{}: Expected ForeignKeyViolation, got {:?}", pointer, other),
            }
        }
    }

    #[test]
    fn test_snapshot_rejects_operation_of_other_mo() {
        let mut store = RoutingStore::new();
        let mo1 = store
            .insert_mo(ManufacturingOrder::new("J1", "MO1", "订单1", 10.0))
            .unwrap();
        let mo2 = store
            .insert_mo(ManufacturingOrder::new("J1", "MO2", "订单2", 10.0))
            .unwrap();
        store
            .insert_operation(mo1, ResourceOperation::new("10", "下料"))
            .unwrap();
        store
            .insert_operation(mo2, ResourceOperation::new("10", "下料"))
            .unwrap();

        let mut json: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
        // MO1 声明了 MO2 的工序
        json["store"]["mos"][0]["operations"] = serde_json::json!([0, 1]);

        assert!(matches!(
            RoutingStore::from_json(&json.to_string()),
            Err(RepositoryError::ForeignKeyViolation(_))
        ));
    }

    #[test]
    fn test_snapshot_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("scenario.json");

        let mut store = RoutingStore::new();
        store
            .insert_mo(ManufacturingOrder::new("J1", "MO1", "订单1", 5.0))
            .unwrap();
        store.save_to_file(&file).unwrap();

        let loaded = RoutingStore::load_from_file(&file).unwrap();
        assert!(loaded.find_mo("J1", "MO1").is_some());
    }
}
