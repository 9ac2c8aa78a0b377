//! # 剪贴板历史守护进程：应用入口
//!
//! 本文件仅负责初始化与装配：日志 → 配置 → 持久化 → 历史存储 → 轮询器。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::process::ExitCode;
use std::sync::Arc;

use clip_history::clipboard::preview::{preview, PREVIEW_MAX_CHARS};
use clip_history::clipboard::{ChangePoller, SystemClipboard};
use clip_history::error::AppError;
use clip_history::history::HistoryStore;
use clip_history::persistence::{HistoryPersistence, MemoryStore};
use clip_history::settings::{self, AppConfig};
use clip_history::storage;

/// 读取配置；首次运行时写入默认配置
fn load_or_init_config() -> AppConfig {
    let config_path = match storage::config_file_path() {
        Ok(path) => path,
        Err(err) => {
            log::warn!("无法确定配置文件位置，使用默认配置: {err}");
            return AppConfig::default();
        }
    };

    if !config_path.exists() {
        let config = AppConfig::default();
        match settings::save_config_to_path(&config_path, &config) {
            Ok(()) => log::info!("首次运行，已写入默认配置: {}", config_path.display()),
            Err(err) => log::warn!("写入默认配置失败: {err}"),
        }
        return config;
    }

    settings::load_config_from_path(&config_path)
}

fn open_persistence(config: &AppConfig) -> Arc<dyn HistoryPersistence> {
    match storage::open_configured_backend(config) {
        Ok(persistence) => persistence,
        Err(err) => {
            log::error!("持久化后端初始化失败，历史将仅保存在内存中: {err}");
            Arc::new(MemoryStore::new())
        }
    }
}

fn log_history(items: &[String]) {
    log::info!("历史已更新，共 {} 条", items.len());
    for (index, item) in items.iter().enumerate() {
        log::debug!("  [{}] {}", index, preview(item, PREVIEW_MAX_CHARS));
    }
}

async fn run() -> Result<(), AppError> {
    log::info!("setup: begin");

    let config = load_or_init_config();
    let history = Arc::new(HistoryStore::load(open_persistence(&config)));
    log::info!("setup: history loaded ({} items)", history.len());

    let reader = Arc::downgrade(&history);
    let subscription = history.subscribe(move || {
        if let Some(history) = reader.upgrade() {
            log_history(&history.list());
        }
    });

    let poller = ChangePoller::new(SystemClipboard::new()?, Arc::clone(&history));
    poller.start(&tokio::runtime::Handle::current());
    log::info!("setup: complete");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::Runtime(format!("等待退出信号失败: {}", e)))?;

    poller.stop();
    subscription.unsubscribe();
    if history.persistence_degraded() {
        log::warn!("退出时持久化处于降级状态，最近的历史可能未保存");
    }
    log::info!("已退出，保留 {} 条历史记录", history.len());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("运行失败: {err}");
            ExitCode::FAILURE
        }
    }
}
