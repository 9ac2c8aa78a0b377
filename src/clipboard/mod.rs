//! 剪贴板管理模块
//!
//! # 设计思路
//!
//! 系统剪贴板没有可订阅的变化通知，因此采用定时轮询：
//! - **变化计数**：每次只比较一个不透明的计数值，O(1) 判断“是否有新内容”
//! - **读取文本**：计数变化后才读取纯文本，交给历史存储
//! - **预览**：日志与展示层只使用截断后的单行预览
//!
//! # 实现思路
//!
//! - `ClipboardSource` trait 抽象“计数 + 文本”两种能力，测试注入脚本化实现。
//! - `SystemClipboard` 基于 `arboard` 读取文本；macOS 使用 `NSPasteboard.changeCount`，
//!   Windows 使用 `GetClipboardSequenceNumber`，其它平台按内容哈希合成计数。
//! - `ChangePoller` 在 tokio 运行时上以固定间隔执行检测。
//! - 子模块按职责拆分：轮询归 `poller`，系统实现归 `system`，文本截断归 `preview`。

pub mod poller;
pub mod preview;
pub mod system;

pub use poller::{ChangePoller, PollOutcome, POLL_INTERVAL};
pub use system::SystemClipboard;

/// 剪贴板变化计数
///
/// 只用于相等比较，不假设单调或连续。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChangeCount(pub u64);

/// 可被轮询的剪贴板
pub trait ClipboardSource: Send {
    /// 读取当前变化计数
    fn change_count(&mut self) -> ChangeCount;

    /// 读取当前纯文本内容，没有文本时返回 `None`
    fn read_text(&mut self) -> Option<String>;
}
