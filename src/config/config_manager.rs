// ==========================================
// 制造订单工艺路线 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写与持久化
// 存储: JSON 文件 (key-value), 未设置的键取默认值
// ==========================================

use crate::engine::EngineConfig;
use anyhow::{anyhow, bail, Context};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    values: Mutex<BTreeMap<String, String>>,
    path: Option<PathBuf>,
}

impl ConfigManager {
    /// 从配置文件创建 ConfigManager
    ///
    /// # 参数
    /// - path: 配置文件路径 (文件不存在时视为空配置, 首次 save 时创建)
    pub fn new(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
            serde_json::from_str::<BTreeMap<String, String>>(&raw)
                .with_context(|| format!("配置文件格式错误: {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "配置已加载");
        Ok(Self {
            values: Mutex::new(values),
            path: Some(path),
        })
    }

    /// 纯内存配置 (测试/一次性运行)
    pub fn in_memory() -> Self {
        Self {
            values: Mutex::new(BTreeMap::new()),
            path: None,
        }
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values.lock().map_err(|e| anyhow!("锁获取失败: {}", e))
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    /// 读取配置值，带默认值
    pub fn get_config_or_default(&self, key: &str, default: &str) -> anyhow::Result<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 覆写配置值 (仅内存, 调用 save 后落盘)
    pub fn set_config_value(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// 写回配置文件; 内存配置直接返回
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&*self.lock()?)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("创建配置目录失败: {}", parent.display()))?;
            }
        }
        std::fs::write(path, json)
            .with_context(|| format!("写入配置文件失败: {}", path.display()))?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式, 键有序）
    pub fn get_config_snapshot(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&*self.lock()?)?)
    }

    // ===== 引擎配置 =====

    /// 组装引擎配置
    ///
    /// 值无法解析或超出范围时报错, 不静默回退到默认值。
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let defaults = EngineConfig::default();

        let cost_decimals: u32 = self.parse_or(config_keys::COST_DECIMALS, defaults.cost_decimals)?;
        if cost_decimals > 10 {
            bail!("{} 超出范围: {} (允许 0..=10)", config_keys::COST_DECIMALS, cost_decimals);
        }

        let copy_suffix_start: u32 =
            self.parse_or(config_keys::COPY_SUFFIX_START, defaults.copy_suffix_start)?;
        if copy_suffix_start == 0 {
            bail!("{} 必须大于 0", config_keys::COPY_SUFFIX_START);
        }

        let max_copy_count: u32 = self.parse_or(config_keys::MAX_COPY_COUNT, defaults.max_copy_count)?;
        if max_copy_count == 0 {
            bail!("{} 必须大于 0", config_keys::MAX_COPY_COUNT);
        }

        Ok(EngineConfig {
            cost_decimals,
            rollback_on_failure: self
                .parse_or(config_keys::ROLLBACK_ON_FAILURE, defaults.rollback_on_failure)?,
            copy_suffix_start,
            max_copy_count,
        })
    }

    /// 界面/错误信息语言 (默认 zh-CN)
    pub fn locale(&self) -> anyhow::Result<String> {
        self.get_config_or_default(config_keys::LOCALE, DEFAULT_LOCALE)
    }

    fn parse_or<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key)? {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map_err(|e| anyhow!("配置项 {} 的值无效: {:?} ({})", key, raw, e)),
            None => Ok(default),
        }
    }
}

const DEFAULT_LOCALE: &str = "zh-CN";

/// 获取默认配置文件路径
///
/// # 返回
/// - 环境变量 APS_CONFIG_PATH (非空时)
/// - 否则: 用户配置目录/aps-routing/config.json
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("APS_CONFIG_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("aps-routing").join("config.json"),
        None => PathBuf::from("./aps_routing_config.json"),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 数量传播
    pub const COST_DECIMALS: &str = "cost_decimals"; // 物料成本保留小数位
    pub const ROLLBACK_ON_FAILURE: &str = "rollback_on_failure";

    // 结构复制
    pub const COPY_SUFFIX_START: &str = "copy_suffix_start";
    pub const MAX_COPY_COUNT: &str = "max_copy_count";

    // 界面
    pub const LOCALE: &str = "locale";
}
