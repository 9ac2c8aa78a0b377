//! 文本预览
//!
//! 将任意长度、可能多行的文本压成一行并截断，供日志与菜单类展示使用。
//! 按 Unicode 标量计数，不会在多字节字符中间截断。

/// 默认预览长度（字符数）
pub const PREVIEW_MAX_CHARS: usize = 30;

const ELLIPSIS: &str = "...";

/// 生成单行预览：换行、制表符替换为空格，超过 `max_chars` 时追加省略号
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c });

    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}{ELLIPSIS}")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::{preview, PREVIEW_MAX_CHARS};

    #[test]
    fn short_text_is_unchanged() {
        assert_eq!(preview("hello", PREVIEW_MAX_CHARS), "hello");
    }

    #[test]
    fn exact_length_has_no_ellipsis() {
        let text = "a".repeat(PREVIEW_MAX_CHARS);
        assert_eq!(preview(&text, PREVIEW_MAX_CHARS), text);
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let text = "b".repeat(PREVIEW_MAX_CHARS + 1);
        let expected = format!("{}...", "b".repeat(PREVIEW_MAX_CHARS));
        assert_eq!(preview(&text, PREVIEW_MAX_CHARS), expected);
    }

    #[test]
    fn multibyte_characters_count_as_one() {
        assert_eq!(preview("剪贴板历史记录", 3), "剪贴板...");
    }

    #[test]
    fn newlines_are_flattened() {
        assert_eq!(preview("fn main() {\n\tok\n}", 40), "fn main() {  ok }");
    }
}
