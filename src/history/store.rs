//! 历史存储子模块
//!
//! ## 职责
//! - 维护按新旧排序、去重、最多 `MAX_HISTORY` 条的文本列表（下标 0 为最新）
//! - 每次变更后同步写入持久化层并发布变更事件
//!
//! ## 不变量
//! - 长度 ≤ `MAX_HISTORY`
//! - 不含空字符串
//! - 不含相等的两条记录
//!
//! ## 错误语义
//! - 持久化失败不回滚内存状态，只置位 `persistence_degraded` 并记录日志

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clipboard::preview::{preview, PREVIEW_MAX_CHARS};
use crate::persistence::{HistoryPersistence, HISTORY_KEY};

use super::notify::{ChangeNotifier, Subscription};

/// 历史记录容量上限
pub const MAX_HISTORY: usize = 10;

/// 新捕获的文本置顶；与当前最新一条相同则不做任何事
///
/// 列表中其它位置已有相同文本时先移除旧的那条，保持唯一。
fn apply_insert(items: &mut Vec<String>, text: String) -> bool {
    if text.is_empty() {
        return false;
    }
    if items.first() == Some(&text) {
        return false;
    }

    items.retain(|existing| *existing != text);
    items.insert(0, text);
    items.truncate(MAX_HISTORY);
    true
}

/// 将下标 `index` 处的记录移到最前，越界时不做任何事
fn apply_promote(items: &mut Vec<String>, index: usize) -> bool {
    if index >= items.len() {
        return false;
    }

    let item = items.remove(index);
    items.retain(|existing| *existing != item);
    items.insert(0, item);
    true
}

/// 修正启动时读到的列表：去掉空串与重复项（保留靠前的），并截断到容量上限
fn sanitize_loaded(saved: Vec<String>) -> Vec<String> {
    let mut items: Vec<String> = Vec::with_capacity(saved.len().min(MAX_HISTORY));
    for text in saved {
        if text.is_empty() || items.contains(&text) {
            continue;
        }
        items.push(text);
        if items.len() == MAX_HISTORY {
            break;
        }
    }
    items
}

/// 剪贴板历史存储
///
/// 进程启动时创建一次，通过 `Arc<HistoryStore>` 共享给轮询器与展示层。
/// 所有“读取-判断-修改-持久化”序列都在同一把锁内完成。
pub struct HistoryStore {
    items: Mutex<Vec<String>>,
    persistence: Arc<dyn HistoryPersistence>,
    notifier: ChangeNotifier,
    persistence_degraded: AtomicBool,
}

impl HistoryStore {
    /// 创建空历史（不读取持久化数据）
    pub fn new(persistence: Arc<dyn HistoryPersistence>) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            persistence,
            notifier: ChangeNotifier::new(),
            persistence_degraded: AtomicBool::new(false),
        }
    }

    /// 从持久化层恢复历史
    ///
    /// 读取失败时以空历史启动，并标记持久化降级。
    pub fn load(persistence: Arc<dyn HistoryPersistence>) -> Self {
        let store = Self::new(Arc::clone(&persistence));

        match persistence.load(HISTORY_KEY) {
            Ok(saved) => {
                let saved_len = saved.len();
                let items = sanitize_loaded(saved);
                if items.len() != saved_len {
                    log::warn!(
                        "持久化历史不满足约束，已修正: {} 条 -> {} 条",
                        saved_len,
                        items.len()
                    );
                }
                log::info!("已加载 {} 条历史记录", items.len());
                *store.lock_items() = items;
            }
            Err(err) => {
                log::warn!("读取持久化历史失败，以空历史启动: {}", err);
                store.persistence_degraded.store(true, Ordering::SeqCst);
            }
        }

        store
    }

    fn lock_items(&self) -> MutexGuard<'_, Vec<String>> {
        match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("历史列表锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }

    fn persist(&self, items: &[String]) {
        match self.persistence.save(HISTORY_KEY, items) {
            Ok(()) => {
                if self.persistence_degraded.swap(false, Ordering::SeqCst) {
                    log::info!("持久化已恢复");
                }
            }
            Err(err) => {
                self.persistence_degraded.store(true, Ordering::SeqCst);
                log::warn!("保存历史失败，仅保留内存状态: {}", err);
            }
        }
    }

    /// 在锁内执行一次变更；发生变更时持久化，释放锁后再发布事件
    fn mutate(&self, op: impl FnOnce(&mut Vec<String>) -> bool) -> bool {
        {
            let mut items = self.lock_items();
            if !op(&mut items) {
                return false;
            }
            self.persist(&items);
        }
        self.notifier.notify();
        true
    }

    /// 记录一次新捕获的文本
    ///
    /// 返回 `true` 表示历史发生了变化并已发布事件。
    pub fn insert_or_promote(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        let label = preview(&text, PREVIEW_MAX_CHARS);
        let changed = self.mutate(|items| apply_insert(items, text));
        if changed {
            log::info!("新增历史记录: {}", label);
        } else {
            log::trace!("与最新记录相同或为空，忽略: {}", label);
        }
        changed
    }

    /// 将下标处的记录移到最前；越界时返回 `false` 且不发布事件
    pub fn promote(&self, index: usize) -> bool {
        let changed = self.mutate(|items| apply_promote(items, index));
        if changed {
            log::info!("第 {} 条记录已移到最前", index);
        } else {
            log::debug!("置顶下标越界，忽略: {}", index);
        }
        changed
    }

    /// 清空历史；即使本来为空也会持久化并发布事件
    pub fn clear(&self) {
        self.mutate(|items| {
            items.clear();
            true
        });
        log::info!("历史记录已清空");
    }

    /// 当前列表的快照
    pub fn list(&self) -> Vec<String> {
        self.lock_items().clone()
    }

    pub fn get(&self, index: usize) -> Option<String> {
        self.lock_items().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    /// 最近一次持久化是否失败
    pub fn persistence_degraded(&self) -> bool {
        self.persistence_degraded.load(Ordering::SeqCst)
    }

    /// 订阅历史变更事件
    ///
    /// 回调在历史锁释放后执行，可以读取本存储。由轮询器触发的回调运行在
    /// 轮询器的状态锁内，回调中不能再操作该轮询器。
    #[must_use = "丢弃 Subscription 会立即退订"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(callback)
    }
}
