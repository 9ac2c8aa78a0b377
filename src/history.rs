//! 剪贴板历史模块
//!
//! # 设计思路
//!
//! 历史是一个“有序 + 去重 + 限长”的字符串列表，所有约束由存储自身的变更操作维护，
//! 不依赖外部校验。展示层通过订阅变更事件得知需要刷新，再调用 `list()` 重新读取。
//!
//! # 实现思路
//!
//! - `store`：`HistoryStore` 聚合根，内部互斥锁串行化每一次变更与持久化。
//! - `notify`：`ChangeNotifier` 观察者列表，`Subscription` 守卫负责退订。

mod notify;
mod store;

pub use notify::{ChangeNotifier, Subscription};
pub use store::{HistoryStore, MAX_HISTORY};
