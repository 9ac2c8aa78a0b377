//! 持久化适配层
//!
//! # 设计思路
//!
//! 历史存储只依赖一个“按键读写有序字符串列表”的能力，不关心底层介质。
//! 通过 `HistoryPersistence` trait 注入，SQLite、JSON 文件、内存三种实现可互换，
//! 测试时直接注入 `MemoryStore`。
//!
//! # 实现思路
//!
//! - `save` 在存储完成一次变更后同步调用；失败只影响持久化，不回滚内存状态。
//! - `load` 只在启动时调用一次；键不存在时返回空列表而不是错误。
//! - 所有实现都必须原样保持列表顺序。

mod json_file;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::AppError;

pub use json_file::JsonFileStore;

/// 剪贴板历史在持久化介质中的固定键名
pub const HISTORY_KEY: &str = "clipboard_history.items";

/// 键值式持久化能力
pub trait HistoryPersistence: Send + Sync {
    /// 以 `key` 覆盖写入完整的有序列表
    fn save(&self, key: &str, items: &[String]) -> Result<(), AppError>;

    /// 读取 `key` 对应的有序列表，不存在时返回空列表
    fn load(&self, key: &str) -> Result<Vec<String>, AppError>;
}

/// 进程内存储
///
/// 用于测试，以及配置的后端无法打开时的降级运行。
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一条记录，模拟上次运行留下的数据
    pub fn with_record(key: &str, items: Vec<String>) -> Self {
        let store = Self::new();
        store
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), items);
        store
    }
}

impl HistoryPersistence for MemoryStore {
    fn save(&self, key: &str, items: &[String]) -> Result<(), AppError> {
        let mut records = self
            .records
            .lock()
            .map_err(|e| AppError::Storage(format!("获取内存存储锁失败: {}", e)))?;
        records.insert(key.to_string(), items.to_vec());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Vec<String>, AppError> {
        let records = self
            .records
            .lock()
            .map_err(|e| AppError::Storage(format!("获取内存存储锁失败: {}", e)))?;
        Ok(records.get(key).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryPersistence, MemoryStore, HISTORY_KEY};

    #[test]
    fn missing_key_loads_as_empty() {
        let store = MemoryStore::new();
        assert!(store.load(HISTORY_KEY).expect("load").is_empty());
    }

    #[test]
    fn save_overwrites_previous_record() {
        let store = MemoryStore::with_record(HISTORY_KEY, vec!["old".to_string()]);
        store
            .save(HISTORY_KEY, &["b".to_string(), "a".to_string()])
            .expect("save");
        assert_eq!(store.load(HISTORY_KEY).expect("load"), vec!["b", "a"]);
    }
}
