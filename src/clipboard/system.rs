//! 系统剪贴板实现
//!
//! ## 职责
//! - 文本读取统一走 `arboard`
//! - 变化计数优先使用平台原生值：
//!   - macOS：`NSPasteboard.generalPasteboard.changeCount`
//!   - Windows：`GetClipboardSequenceNumber`
//! - 原生计数不可用（Linux 等）时，按当前文本的哈希合成计数：哈希变化即计数加一
//!
//! ## 错误语义
//! - 创建剪贴板失败返回 `AppError::Clipboard`
//! - 读取文本失败视为“没有文本”，只记录 debug 日志

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::AppError;

use super::{ChangeCount, ClipboardSource};

#[cfg(target_os = "macos")]
fn native_change_count() -> Option<u64> {
    use cocoa::base::{id, nil};
    use cocoa::foundation::NSInteger;
    use objc::{class, msg_send, sel, sel_impl};

    unsafe {
        let pasteboard: id = msg_send![class!(NSPasteboard), generalPasteboard];
        if pasteboard == nil {
            return None;
        }
        let count: NSInteger = msg_send![pasteboard, changeCount];
        Some(count as u64)
    }
}

#[cfg(windows)]
fn native_change_count() -> Option<u64> {
    // 返回 0 表示当前窗口站没有剪贴板访问权限
    let sequence = unsafe { windows::Win32::System::DataExchange::GetClipboardSequenceNumber() };
    if sequence == 0 {
        None
    } else {
        Some(u64::from(sequence))
    }
}

#[cfg(not(any(target_os = "macos", windows)))]
fn native_change_count() -> Option<u64> {
    None
}

fn text_fingerprint(text: Option<&str>) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// 内容哈希合成的变化计数
#[derive(Debug, Default)]
struct SyntheticCounter {
    count: u64,
    last_fingerprint: Option<u64>,
}

impl SyntheticCounter {
    /// 观察一次当前内容，内容与上次不同则计数加一
    fn observe(&mut self, text: Option<&str>) -> u64 {
        let fingerprint = text_fingerprint(text);
        if self.last_fingerprint != Some(fingerprint) {
            if self.last_fingerprint.is_some() {
                self.count = self.count.wrapping_add(1);
            }
            self.last_fingerprint = Some(fingerprint);
        }
        self.count
    }
}

/// 基于 `arboard` 的系统剪贴板
pub struct SystemClipboard {
    #[cfg(not(any(target_os = "macos", windows)))]
    clipboard: arboard::Clipboard,
    synthetic: SyntheticCounter,
    /// 合成计数时已经读到的文本，供紧随其后的 `read_text` 直接使用
    pending_text: Option<Option<String>>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, AppError> {
        #[cfg(any(target_os = "macos", windows))]
        {
            // 仅用于尽早暴露剪贴板不可用的问题，读取时再按需创建
            arboard::Clipboard::new()
                .map_err(|e| AppError::Clipboard(format!("打开系统剪贴板失败: {}", e)))?;
        }

        Ok(Self {
            #[cfg(not(any(target_os = "macos", windows)))]
            clipboard: arboard::Clipboard::new()
                .map_err(|e| AppError::Clipboard(format!("打开系统剪贴板失败: {}", e)))?,
            synthetic: SyntheticCounter::default(),
            pending_text: None,
        })
    }

    #[cfg(not(any(target_os = "macos", windows)))]
    fn fetch_text(&mut self) -> Option<String> {
        match self.clipboard.get_text() {
            Ok(text) => Some(text),
            Err(e) => {
                log::debug!("读取剪贴板文本失败: {}", e);
                None
            }
        }
    }

    #[cfg(any(target_os = "macos", windows))]
    fn fetch_text(&mut self) -> Option<String> {
        let mut clipboard = match arboard::Clipboard::new() {
            Ok(clipboard) => clipboard,
            Err(e) => {
                log::debug!("打开系统剪贴板失败: {}", e);
                return None;
            }
        };
        match clipboard.get_text() {
            Ok(text) => Some(text),
            Err(e) => {
                log::debug!("读取剪贴板文本失败: {}", e);
                None
            }
        }
    }
}

impl ClipboardSource for SystemClipboard {
    fn change_count(&mut self) -> ChangeCount {
        if let Some(count) = native_change_count() {
            return ChangeCount(count);
        }

        let text = self.fetch_text();
        let count = self.synthetic.observe(text.as_deref());
        self.pending_text = Some(text);
        ChangeCount(count)
    }

    fn read_text(&mut self) -> Option<String> {
        match self.pending_text.take() {
            Some(text) => text,
            None => self.fetch_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SyntheticCounter;

    #[test]
    fn synthetic_counter_starts_at_zero_for_initial_content() {
        let mut counter = SyntheticCounter::default();
        assert_eq!(counter.observe(Some("boot")), 0);
        assert_eq!(counter.observe(Some("boot")), 0);
    }

    #[test]
    fn synthetic_counter_bumps_on_every_content_change() {
        let mut counter = SyntheticCounter::default();
        counter.observe(Some("a"));
        assert_eq!(counter.observe(Some("b")), 1);
        assert_eq!(counter.observe(None), 2);
        assert_eq!(counter.observe(None), 2);
        assert_eq!(counter.observe(Some("a")), 3);
    }
}
