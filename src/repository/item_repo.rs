// ==========================================
// 公益物资调配平台 - 物品目录仓储
// ==========================================
// 职责: 管理 item_template 表的查询
// 说明: 单条可用量查询要求物品存在(NotFound);
//       批量查询对未知物品直接省略结果,由调用方据此区分
// ==========================================

use crate::domain::stock::ItemTemplate;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ItemTemplateRepository - 物品目录仓储
// ==========================================
pub struct ItemTemplateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ItemTemplateRepository {
    /// 创建新的物品目录仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入物品模板
    pub fn insert(&self, template: &ItemTemplate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO item_template (item_id, name, category) VALUES (?1, ?2, ?3)",
            params![template.item_id, template.name, template.category],
        )?;
        Ok(())
    }

    /// 按ID查询物品模板
    pub fn find_by_id(&self, item_id: &str) -> RepositoryResult<Option<ItemTemplate>> {
        let conn = self.get_conn()?;
        let template = conn
            .query_row(
                "SELECT item_id, name, category FROM item_template WHERE item_id = ?1",
                params![item_id],
                |row| {
                    Ok(ItemTemplate {
                        item_id: row.get(0)?,
                        name: row.get(1)?,
                        category: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(template)
    }

    /// 物品是否存在于目录
    pub fn exists(&self, item_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM item_template WHERE item_id = ?1",
                params![item_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}
