//! 剪贴板变化轮询器
//!
//! ## 职责
//! - 以固定间隔读取变化计数，计数变化时读取文本并交给 `HistoryStore`
//! - 同一次变化只处理一次：先记录新计数，再读取内容
//!
//! ## 生命周期
//! - `start()` 幂等：再次调用会取消旧任务并用新任务替换
//! - `stop()` 返回后不会再有任何一次检测被执行（包括正在执行中的那一次已结束）
//! - 轮询器被丢弃时自动 `stop()`
//!
//! ## 并发
//! - 定时循环运行在 tokio 任务中，每次检测交给 `spawn_blocking`，不占用异步工作线程
//! - 每次检测都在 `state` 锁内完成；`stop()` 同样获取该锁并递增代数，
//!   旧任务醒来后发现代数不匹配即退出

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::history::HistoryStore;

use super::preview::{preview, PREVIEW_MAX_CHARS};
use super::{ChangeCount, ClipboardSource};

/// 轮询间隔
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// 单次检测的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// 计数未变化，无任何副作用
    Unchanged,
    /// 计数已变化，但没有可用文本或文本为空
    NoText,
    /// 文本与当前最新记录相同，历史未变
    AlreadyFront,
    /// 文本已写入历史
    Captured,
}

struct PollerState<C> {
    source: C,
    last_change_count: ChangeCount,
    generation: u64,
}

struct PollerShared<C> {
    state: Mutex<PollerState<C>>,
    history: Arc<HistoryStore>,
}

fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("{}锁中毒，继续使用恢复数据", what);
            poisoned.into_inner()
        }
    }
}

fn check_for_change<C: ClipboardSource>(
    state: &mut PollerState<C>,
    history: &HistoryStore,
) -> PollOutcome {
    let current = state.source.change_count();
    if current == state.last_change_count {
        return PollOutcome::Unchanged;
    }

    // 先落计数，读取失败也不会重复处理同一次变化
    state.last_change_count = current;
    log::debug!("检测到剪贴板变化: {:?}", current);

    let text = match state.source.read_text() {
        Some(text) if !text.is_empty() => text,
        _ => {
            log::debug!("剪贴板没有可用文本，跳过");
            return PollOutcome::NoText;
        }
    };

    let label = preview(&text, PREVIEW_MAX_CHARS);
    if history.insert_or_promote(text) {
        PollOutcome::Captured
    } else {
        log::trace!("与最新记录相同，跳过: {}", label);
        PollOutcome::AlreadyFront
    }
}

impl<C: ClipboardSource> PollerShared<C> {
    fn lock_state(&self) -> MutexGuard<'_, PollerState<C>> {
        lock_or_recover(&self.state, "轮询状态")
    }

    /// 定时任务的一次触发；代数不匹配说明已被停止或替换，返回 `None`
    fn fire(&self, generation: u64) -> Option<PollOutcome> {
        let mut state = self.lock_state();
        if state.generation != generation {
            return None;
        }
        Some(check_for_change(&mut state, &self.history))
    }
}

/// 剪贴板变化轮询器
pub struct ChangePoller<C: ClipboardSource + 'static> {
    shared: Arc<PollerShared<C>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<C: ClipboardSource + 'static> ChangePoller<C> {
    /// 创建轮询器，并把当前计数记为已观察，启动时已在剪贴板中的内容不会被捕获
    pub fn new(mut source: C, history: Arc<HistoryStore>) -> Self {
        let last_change_count = source.change_count();
        Self {
            shared: Arc::new(PollerShared {
                state: Mutex::new(PollerState {
                    source,
                    last_change_count,
                    generation: 0,
                }),
                history,
            }),
            task: Mutex::new(None),
        }
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        lock_or_recover(&self.task, "轮询任务")
    }

    /// 在给定运行时上启动定时检测，已有任务会被取消并替换
    pub fn start(&self, runtime: &Handle) {
        let mut task = self.lock_task();

        let generation = {
            let mut state = self.shared.lock_state();
            state.generation = state.generation.wrapping_add(1);
            state.generation
        };

        if let Some(previous) = task.take() {
            previous.abort();
            log::debug!("📋 替换已有的剪贴板轮询任务");
        }

        let shared = Arc::clone(&self.shared);
        *task = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval 的第一次 tick 立即完成，首次检测发生在一个间隔之后
            ticker.tick().await;

            loop {
                ticker.tick().await;
                // 剪贴板读取与持久化都是阻塞操作，放到阻塞线程池执行
                let firing = Arc::clone(&shared);
                match tokio::task::spawn_blocking(move || firing.fire(generation)).await {
                    Ok(Some(_)) => {}
                    Ok(None) => break,
                    Err(err) => {
                        log::error!("📋 剪贴板检测任务异常退出: {}", err);
                        break;
                    }
                }
            }
        }));

        log::info!("📋 剪贴板轮询已启动（间隔 {}ms）", POLL_INTERVAL.as_millis());
    }

    /// 停止定时检测；返回后不会再发生任何检测
    ///
    /// 正在进行的检测会先执行完毕。历史变更回调在检测持有的状态锁内触发，
    /// 因此不能在回调里调用 `stop()` / `start()` / `poll_once()` /
    /// `last_change_count()`，否则会死锁。
    pub fn stop(&self) {
        let mut task = self.lock_task();
        {
            let mut state = self.shared.lock_state();
            state.generation = state.generation.wrapping_add(1);
        }

        if let Some(handle) = task.take() {
            handle.abort();
            log::info!("📋 剪贴板轮询已停止");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// 立即执行一次检测，不受定时任务状态影响
    pub fn poll_once(&self) -> PollOutcome {
        let mut state = self.shared.lock_state();
        check_for_change(&mut state, &self.shared.history)
    }

    /// 最近一次观察到的变化计数
    pub fn last_change_count(&self) -> ChangeCount {
        self.shared.lock_state().last_change_count
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.shared.history
    }
}

impl<C: ClipboardSource + 'static> Drop for ChangePoller<C> {
    fn drop(&mut self) {
        self.stop();
    }
}
