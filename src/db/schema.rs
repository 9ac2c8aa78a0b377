//! Schema 初始化子模块
//!
//! ## 职责
//! - 创建/迁移键值表结构
//! - 设置 SQLite 运行参数（WAL）
//!
//! ## 错误语义
//! - DDL 或 PRAGMA 失败统一映射为 `AppError::Database`

use rusqlite::Connection;

use crate::error::AppError;

const SCHEMA_VERSION: i64 = 1;

fn get_user_version(conn: &Connection) -> Result<i64, AppError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| AppError::Database(format!("读取数据库版本失败: {}", e)))
}

fn set_user_version(conn: &Connection, version: i64) -> Result<(), AppError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| AppError::Database(format!("写入数据库版本失败: {}", e)))
}

fn enable_wal(conn: &Connection) -> Result<(), AppError> {
    let mode: String = conn
        .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
        .map_err(|e| AppError::Database(format!("设置 WAL 模式失败: {}", e)))?;
    log::debug!("数据库日志模式: {}", mode);
    Ok(())
}

fn create_kv_table(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv_lists (
            key TEXT PRIMARY KEY NOT NULL,
            items TEXT NOT NULL,
            updated_at INTEGER NOT NULL DEFAULT 0
        );",
    )
    .map_err(|e| AppError::Database(format!("创建键值表失败: {}", e)))
}

pub(crate) fn initialize_schema(conn: &Connection) -> Result<(), AppError> {
    enable_wal(conn)?;

    let version = get_user_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(AppError::Database(format!(
            "数据库版本 {} 高于当前支持的 {}",
            version, SCHEMA_VERSION
        )));
    }

    create_kv_table(conn)?;

    if version < SCHEMA_VERSION {
        set_user_version(conn, SCHEMA_VERSION)?;
        log::info!("数据库 schema 已升级: v{} -> v{}", version, SCHEMA_VERSION);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{get_user_version, initialize_schema, SCHEMA_VERSION};

    #[test]
    fn initialize_is_idempotent_and_sets_version() {
        let conn = Connection::open_in_memory().expect("open in-memory sqlite");
        initialize_schema(&conn).expect("first init");
        initialize_schema(&conn).expect("second init");

        assert_eq!(get_user_version(&conn).expect("version"), SCHEMA_VERSION);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_lists", [], |row| row.get(0))
            .expect("kv table exists");
        assert_eq!(count, 0);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().expect("open in-memory sqlite");
        conn.execute_batch("PRAGMA user_version = 99;").expect("bump version");
        assert!(initialize_schema(&conn).is_err());
    }
}
