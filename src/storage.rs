//! 存储目录与持久化后端管理模块
//!
//! # 设计思路
//!
//! 统一管理历史数据的存放位置，支持用户自定义目录，
//! 并按配置打开对应的持久化后端。
//!
//! # 实现思路
//!
//! - 优先使用配置中的自定义目录。
//! - 未设置时回退到 `directories::ProjectDirs` 给出的平台数据目录。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;

use crate::db::{SqliteStore, DB_FILE_NAME};
use crate::error::AppError;
use crate::persistence::{HistoryPersistence, JsonFileStore};
use crate::settings::{AppConfig, PersistenceBackend, CONFIG_FILE_NAME};

const APP_NAME: &str = "clip-history";

fn project_dirs() -> Result<ProjectDirs, AppError> {
    ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| AppError::Storage("无法确定用户主目录".to_string()))
}

/// 配置文件路径（平台配置目录下的 `config.json`）
pub fn config_file_path() -> Result<PathBuf, AppError> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE_NAME))
}

/// 获取历史数据目录，不存在时自动创建
///
/// # 返回
/// - `Ok(PathBuf)`：可用的数据目录
/// - `Err(AppError::Storage)`：无法获取或创建目录
pub fn resolve_data_dir(custom_dir: Option<&str>) -> Result<PathBuf, AppError> {
    let dir = match custom_dir {
        Some(dir) => PathBuf::from(dir),
        None => project_dirs()?.data_dir().to_path_buf(),
    };
    ensure_dir(&dir)?;
    Ok(dir)
}

fn ensure_dir(dir: &Path) -> Result<(), AppError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Storage(format!("创建数据目录 '{}' 失败: {}", dir.display(), e))
        })?;
    }
    Ok(())
}

/// 在 `data_dir` 下打开指定的持久化后端
pub fn open_backend(
    backend: PersistenceBackend,
    data_dir: &Path,
) -> Result<Arc<dyn HistoryPersistence>, AppError> {
    let store: Arc<dyn HistoryPersistence> = match backend {
        PersistenceBackend::Sqlite => Arc::new(SqliteStore::open(&data_dir.join(DB_FILE_NAME))?),
        PersistenceBackend::Json => Arc::new(JsonFileStore::open(data_dir.join("history"))?),
    };
    log::info!("持久化后端: {:?} ({})", backend, data_dir.display());
    Ok(store)
}

/// 按配置解析目录并打开后端
pub fn open_configured_backend(config: &AppConfig) -> Result<Arc<dyn HistoryPersistence>, AppError> {
    let data_dir = resolve_data_dir(config.custom_data_dir())?;
    open_backend(config.backend, &data_dir)
}
