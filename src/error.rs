//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，历史存储、持久化、剪贴板读取与守护进程启动
//! 全部返回 `Result<T, AppError>`，避免 `.map_err(|e| e.to_string())` 到处散落。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error` 提供 `From` 转换，调用侧直接 `?`。
//! - 数据库错误由调用侧附带上下文后映射为 `AppError::Database`。
//! - 实现 `Serialize` 将错误序列化为字符串，便于转交给进程外的展示层。

use serde::Serialize;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板读取失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 存储目录或持久化文件不可用
    #[error("存储不可用: {0}")]
    Storage(String),

    /// 数据库操作失败
    #[error("数据库错误: {0}")]
    Database(String),

    /// 配置文件读写失败
    #[error("配置错误: {0}")]
    Config(String),

    /// 异步运行时相关错误
    #[error("运行时错误: {0}")]
    Runtime(String),
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn serializes_as_display_string() {
        let err = AppError::Storage("磁盘已满".to_string());
        let json = serde_json::to_string(&err).expect("serialize error");
        assert_eq!(json, "\"存储不可用: 磁盘已满\"");
    }

    #[test]
    fn io_errors_convert_with_question_mark() {
        fn fails() -> Result<(), AppError> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(AppError::Io(_))));
    }
}
