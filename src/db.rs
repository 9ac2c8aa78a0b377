//! SQLite 持久化模块
//!
//! # 设计思路
//!
//! 使用 `rusqlite` 直接操作 SQLite，把剪贴板历史作为一条键值记录保存：
//! 键为固定名称，值为 JSON 数组形式的有序字符串列表。
//!
//! # 优势
//!
//! - **原子性**：一次 `UPSERT` 覆盖整条记录，不会出现半新半旧的列表
//! - **顺序保真**：JSON 数组原样保留下标顺序
//! - **可扩展**：同一张表可容纳其它键，无需迁移

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppError;
use crate::persistence::HistoryPersistence;

mod schema;

/// 历史数据库文件名
pub const DB_FILE_NAME: &str = "clipboard.db";

/// 基于 SQLite 的键值存储
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// 打开（或创建）数据库文件并初始化 Schema
    pub fn open(db_path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Database(format!("创建数据库目录失败: {}", e))
            })?;
        }
        log::info!("数据库路径: {}", db_path.display());

        let conn = Connection::open(db_path).map_err(|e| {
            AppError::Database(format!("打开数据库失败: {}", e))
        })?;
        Self::from_connection(conn)
    }

    /// 内存数据库，主要用于测试
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            AppError::Database(format!("打开内存数据库失败: {}", e))
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        schema::initialize_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> Result<T, AppError>) -> Result<T, AppError> {
        let conn = self.conn.lock().map_err(|e| {
            AppError::Database(format!("获取数据库锁失败: {}", e))
        })?;
        op(&conn)
    }
}

fn save_list(conn: &Connection, key: &str, items: &[String]) -> Result<(), AppError> {
    let encoded = serde_json::to_string(items)
        .map_err(|e| AppError::Database(format!("序列化列表失败: {}", e)))?;
    let now = chrono::Utc::now().timestamp_millis();

    conn.execute(
        "INSERT INTO kv_lists (key, items, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET items = excluded.items, updated_at = excluded.updated_at",
        params![key, encoded, now],
    )
    .map_err(|e| AppError::Database(format!("写入列表失败: {}", e)))?;
    Ok(())
}

fn load_list(conn: &Connection, key: &str) -> Result<Vec<String>, AppError> {
    let encoded: Option<String> = conn
        .query_row(
            "SELECT items FROM kv_lists WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| AppError::Database(format!("读取列表失败: {}", e)))?;

    match encoded {
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| AppError::Database(format!("解析列表失败: {}", e))),
        None => Ok(Vec::new()),
    }
}

impl HistoryPersistence for SqliteStore {
    fn save(&self, key: &str, items: &[String]) -> Result<(), AppError> {
        self.with_conn(|conn| save_list(conn, key, items))
    }

    fn load(&self, key: &str) -> Result<Vec<String>, AppError> {
        self.with_conn(|conn| load_list(conn, key))
    }
}
