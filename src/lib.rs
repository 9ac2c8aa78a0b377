//! # 剪贴板历史守护进程：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │             展示层（托盘菜单等，进程外或调用方）          │
//! │   list() / promote(i) / clear()      ↑ 变更事件（无负载） │
//! └───────┼──────────────────────────────┼───────────────────┘
//!         ↓                              │
//! ┌───────┼──────────────────────────────┼───────────────────┐
//! │       ↓          核心 (Rust)         │                   │
//! │                                                          │
//! │  clipboard ── ChangePoller（500ms 轮询变化计数）          │
//! │       │  计数变化 → 读取纯文本                            │
//! │       ↓                                                  │
//! │  history ──── HistoryStore（置顶 / 去重 / 限 10 条）      │
//! │       │  每次变更同步写入                                 │
//! │       ↓                                                  │
//! │  persistence ─ HistoryPersistence（SQLite / JSON / 内存） │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`clipboard`] | 剪贴板抽象、系统实现、变化轮询、文本预览 |
//! | [`history`] | 有序去重限长的历史存储与变更通知 |
//! | [`persistence`] | 键值持久化 trait 及 JSON 文件 / 内存实现 |
//! | [`db`] | SQLite 持久化实现 |
//! | [`settings`] | 守护进程配置读写 |
//! | [`storage`] | 数据目录解析与后端选择 |

pub mod error;
pub mod clipboard;
pub mod db;
pub mod history;
pub mod persistence;
pub mod settings;
pub mod storage;
