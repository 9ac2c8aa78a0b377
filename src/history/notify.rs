//! 变更通知子模块
//!
//! ## 职责
//! - 维护“历史已变化”的订阅者列表
//! - `Subscription` 采用 RAII：守卫离开作用域即自动退订
//!
//! ## 约定
//! - 事件不携带负载，订阅者收到后自行调用 `HistoryStore::list()` 重新读取
//! - 回调在快照后、持锁之外执行，回调内部可以安全地订阅或退订

use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Callback)>,
}

fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    match registry.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("订阅表锁中毒，继续使用恢复数据");
            poisoned.into_inner()
        }
    }
}

/// 历史变更的发布点
#[derive(Default)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册回调，返回的守卫被丢弃时自动退订
    #[must_use = "丢弃 Subscription 会立即退订"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut registry = lock_registry(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, Arc::new(callback)));
        log::debug!("新增历史订阅者 #{}，当前 {} 个", id, registry.listeners.len());

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// 通知全部订阅者，没有订阅者时什么都不做
    pub fn notify(&self) {
        let snapshot: Vec<Callback> = lock_registry(&self.registry)
            .listeners
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            callback();
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock_registry(&self.registry).listeners.len()
    }
}

/// 订阅守卫
///
/// 只持有订阅表的弱引用，发布方先于守卫销毁时退订自动变为空操作。
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// 显式退订，等价于直接丢弃守卫
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock_registry(&registry)
                .listeners
                .retain(|(id, _)| *id != self.id);
            log::debug!("历史订阅者 #{} 已退订", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::ChangeNotifier;

    #[test]
    fn notify_reaches_every_subscriber() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h1 = Arc::clone(&hits);
        let _a = notifier.subscribe(move || {
            h1.fetch_add(1, Ordering::SeqCst);
        });
        let h2 = Arc::clone(&hits);
        let _b = notifier.subscribe(move || {
            h2.fetch_add(10, Ordering::SeqCst);
        });

        notifier.notify();
        assert_eq!(hits.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let notifier = ChangeNotifier::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = Arc::clone(&hits);
        let sub = notifier.subscribe(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(notifier.subscriber_count(), 1);

        sub.unsubscribe();
        notifier.notify();

        assert_eq!(notifier.subscriber_count(), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscription_outliving_notifier_is_harmless() {
        let notifier = ChangeNotifier::new();
        let sub = notifier.subscribe(|| {});
        drop(notifier);
        drop(sub);
    }

    #[test]
    fn notify_without_subscribers_is_noop() {
        ChangeNotifier::new().notify();
    }
}
