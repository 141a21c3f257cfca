// ==========================================
// 公益物资调配平台 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键全集
// ==========================================
pub mod config_keys {
    /// 特急阈值(天)
    pub const URGENCY_VERY_URGENT_DAYS: &str = "urgency.very_urgent_days";
    /// 紧急阈值(天)
    pub const URGENCY_URGENT_DAYS: &str = "urgency.urgent_days";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    // ==========================================
    // 基础读写
    // ==========================================

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取配置值,不存在时返回默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入全局配置值(存在则覆盖)
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    // ==========================================
    // 紧急等级阈值
    // ==========================================
    // 默认 3/7 天;边界值归入更紧急一档(引擎语义,与配置无关)

    /// 特急阈值(天)
    pub fn get_very_urgent_days(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::URGENCY_VERY_URGENT_DAYS, "3")?;
        Ok(value.parse::<f64>().unwrap_or(3.0))
    }

    /// 紧急阈值(天)
    pub fn get_urgent_days(&self) -> Result<f64, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::URGENCY_URGENT_DAYS, "7")?;
        Ok(value.parse::<f64>().unwrap_or(7.0))
    }
}
