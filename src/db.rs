// ==========================================
// 公益物资调配平台 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供幂等建表入口,供巡检二进制与测试共用
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 初始化数据库 schema（幂等）
///
/// 所有日期列以 TEXT 存储,格式 %Y-%m-%d;时间戳列格式 %Y-%m-%d %H:%M:%S
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- 物品目录
        CREATE TABLE IF NOT EXISTS item_template (
            item_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT
        );

        -- 库存批次(只增不删;EXPIRED 为终态)
        CREATE TABLE IF NOT EXISTS stock_lot (
            lot_id TEXT PRIMARY KEY,
            item_id TEXT NOT NULL REFERENCES item_template(item_id),
            branch_id TEXT NOT NULL,
            quantity REAL NOT NULL CHECK (quantity >= 0),
            expiration_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'VALID',
            created_date TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_stock_lot_item_branch
            ON stock_lot (item_id, branch_id, status);
        CREATE INDEX IF NOT EXISTS idx_stock_lot_branch_expiry
            ON stock_lot (branch_id, expiration_date, status);

        -- 出库调拨单
        CREATE TABLE IF NOT EXISTS transfer_request (
            transfer_id TEXT PRIMARY KEY,
            branch_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING',
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_transfer_branch_status
            ON transfer_request (branch_id, status);

        -- 调拨明细行
        CREATE TABLE IF NOT EXISTS transfer_line_item (
            transfer_id TEXT NOT NULL REFERENCES transfer_request(transfer_id) ON DELETE CASCADE,
            item_id TEXT NOT NULL REFERENCES item_template(item_id),
            quantity REAL NOT NULL CHECK (quantity > 0),
            PRIMARY KEY (transfer_id, item_id)
        );

        -- 援助请求
        CREATE TABLE IF NOT EXISTS aid_request (
            request_id TEXT PRIMARY KEY,
            beneficiary_id TEXT,
            created_at TEXT NOT NULL
        );

        -- 援助请求时段
        CREATE TABLE IF NOT EXISTS aid_request_window (
            request_id TEXT NOT NULL REFERENCES aid_request(request_id) ON DELETE CASCADE,
            day TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_aid_window_request
            ON aid_request_window (request_id);

        -- 援助物品条目
        CREATE TABLE IF NOT EXISTS aid_item (
            aid_item_id TEXT PRIMARY KEY,
            request_id TEXT NOT NULL REFERENCES aid_request(request_id) ON DELETE CASCADE,
            item_id TEXT NOT NULL REFERENCES item_template(item_id),
            quantity REAL NOT NULL CHECK (quantity > 0),
            status TEXT NOT NULL DEFAULT 'PENDING',
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_aid_item_status
            ON aid_item (status);

        -- 援助物品属性(规格/口味/尺码等自由属性)
        CREATE TABLE IF NOT EXISTS aid_item_attribute (
            aid_item_id TEXT NOT NULL REFERENCES aid_item(aid_item_id) ON DELETE CASCADE,
            attr_name TEXT NOT NULL,
            attr_value TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_aid_attr_item
            ON aid_item_attribute (aid_item_id);

        -- 配置作用域
        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );
        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        -- 配置键值
        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        // 重复执行不报错
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }
}
