//! 守护进程配置
//!
//! # 设计思路
//!
//! 配置只决定“历史存放在哪里、用什么介质存”，容量与轮询间隔是编译期常量。
//! 配置文件缺失或损坏时回退到默认值并记录日志，绝不阻止启动。
//!
//! # 实现思路
//!
//! - `AppConfig` 通过 `serde` 读写 `config.json`，未知字段忽略、缺失字段取默认。
//! - `load_config_from_path` / `save_config_to_path` 只接受路径，便于测试。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 持久化介质
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceBackend {
    #[default]
    Sqlite,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 自定义数据目录；为空时使用平台默认数据目录
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub backend: PersistenceBackend,
}

impl AppConfig {
    /// 非空的自定义数据目录
    pub fn custom_data_dir(&self) -> Option<&str> {
        self.data_dir.as_deref().filter(|dir| !dir.trim().is_empty())
    }
}

/// 读取配置；文件不存在或无法解析时返回默认配置
pub fn load_config_from_path(config_path: &Path) -> AppConfig {
    if !config_path.exists() {
        return AppConfig::default();
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("读取配置文件 '{}' 失败，使用默认配置: {}", config_path.display(), e);
            return AppConfig::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("解析配置文件 '{}' 失败，使用默认配置: {}", config_path.display(), e);
            AppConfig::default()
        }
    }
}

pub fn save_config_to_path(config_path: &Path, config: &AppConfig) -> Result<(), AppError> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Config(format!("创建配置目录失败: {}", e)))?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| AppError::Config(format!("序列化配置失败: {}", e)))?;
    fs::write(config_path, content)
        .map_err(|e| AppError::Config(format!("写入配置文件失败: {}", e)))?;
    Ok(())
}
