//! JSON 文件持久化
//!
//! ## 职责
//! - 每个键对应目录下的一个 `<key>.json` 文件
//! - 先写临时文件再 `rename`，进程中途退出也不会留下半截记录
//!
//! ## 错误语义
//! - 目录创建、读写失败映射为 `AppError::Io` / `AppError::Storage`
//! - 文件内容无法解析映射为 `AppError::Storage`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::HistoryPersistence;

#[derive(Debug, Serialize, Deserialize)]
struct ListRecord {
    items: Vec<String>,
}

/// 以 JSON 文件保存列表的存储实现
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

fn file_stem_for_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

impl JsonFileStore {
    /// 在 `dir` 下创建存储，目录不存在时自动创建
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            AppError::Storage(format!("创建历史目录 '{}' 失败: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem_for_key(key)))
    }
}

impl HistoryPersistence for JsonFileStore {
    fn save(&self, key: &str, items: &[String]) -> Result<(), AppError> {
        let path = self.record_path(key);
        let tmp_path = path.with_extension("json.tmp");

        let record = ListRecord { items: items.to_vec() };
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| AppError::Storage(format!("序列化历史记录失败: {}", e)))?;

        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Vec<String>, AppError> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let record = serde_json::from_str::<ListRecord>(&content).map_err(|e| {
            AppError::Storage(format!("解析历史文件 '{}' 失败: {}", path.display(), e))
        })?;
        Ok(record.items)
    }
}
