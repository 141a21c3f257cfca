// ==========================================
// 公益物资调配平台 - 援助请求仓储
// ==========================================
// 职责: 管理 aid_request / aid_request_window /
//       aid_item / aid_item_attribute 表,组装匹配候选视图
// 红线: Repository 不含业务逻辑;时段/紧急度判定在引擎层
// ==========================================

use crate::domain::aid::{AidItem, AidItemCandidate, AidRequest};
use crate::domain::schedule::{ScheduledWindow, DATE_FORMAT, TIME_FORMAT};
use crate::domain::types::AidItemStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// AidRequestRepository - 援助请求仓储
// ==========================================
pub struct AidRequestRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AidRequestRepository {
    /// 创建新的援助请求仓储实例
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

    // ==========================================
    // 写入
    // ==========================================

    /// 写入援助请求及其时段(单事务)
    pub fn insert_request(&self, request: &AidRequest) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO aid_request (request_id, beneficiary_id, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![
                request.request_id,
                request.beneficiary_id,
                request.created_at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;
        for window in &request.windows {
            tx.execute(
                r#"
                INSERT INTO aid_request_window (request_id, day, start_time, end_time)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    request.request_id,
                    window.day.format(DATE_FORMAT).to_string(),
                    window.start_time.format(TIME_FORMAT).to_string(),
                    window.end_time.format(TIME_FORMAT).to_string(),
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 写入援助物品条目及其属性(单事务)
    pub fn insert_item(
        &self,
        item: &AidItem,
        attributes: &[(String, String)],
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO aid_item (aid_item_id, request_id, item_id, quantity, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                item.aid_item_id,
                item.request_id,
                item.item_id,
                item.quantity,
                item.status.as_str(),
                item.created_at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;
        for (name, value) in attributes {
            tx.execute(
                r#"
                INSERT INTO aid_item_attribute (aid_item_id, attr_name, attr_value)
                VALUES (?1, ?2, ?3)
                "#,
                params![item.aid_item_id, name, value],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    // ==========================================
    // 候选视图组装
    // ==========================================

    /// 加载全部已受理的援助物品候选(含模板名称/属性值/请求时段)
    ///
    /// 只做数据组装;窗口是否仍未结束由匹配引擎按注入的 now 判定
    pub fn list_accepted_candidates(&self) -> RepositoryResult<Vec<AidItemCandidate>> {
        let conn = self.get_conn()?;

        // 1. 已受理物品 + 模板名称
        let mut stmt = conn.prepare(
            r#"
            SELECT ai.aid_item_id, ai.request_id, ai.item_id, ai.quantity, ai.status,
                   ai.created_at, it.name
            FROM aid_item ai
            JOIN item_template it ON it.item_id = ai.item_id
            WHERE ai.status = 'ACCEPTED'
            ORDER BY ai.created_at, ai.aid_item_id
            "#,
        )?;
        let items: Vec<(AidItem, String)> = stmt
            .query_map([], |row| {
                let status_raw: String = row.get(4)?;
                let created_raw: String = row.get(5)?;
                Ok((
                    AidItem {
                        aid_item_id: row.get(0)?,
                        request_id: row.get(1)?,
                        item_id: row.get(2)?,
                        quantity: row.get(3)?,
                        status: AidItemStatus::from_code(&status_raw)
                            .unwrap_or(AidItemStatus::Cancelled),
                        created_at: NaiveDateTime::parse_from_str(&created_raw, DATETIME_FORMAT)
                            .unwrap_or_else(|_| {
                                NaiveDate::from_ymd_opt(1970, 1, 1)
                                    .unwrap()
                                    .and_hms_opt(0, 0, 0)
                                    .unwrap()
                            }),
                    },
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if items.is_empty() {
            return Ok(Vec::new());
        }

        // 2. 属性值按物品分组
        let mut attr_stmt = conn.prepare(
            r#"
            SELECT aid_item_id, attr_value
            FROM aid_item_attribute
            "#,
        )?;
        let mut attrs_by_item: HashMap<String, Vec<String>> = HashMap::new();
        let attr_rows = attr_stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for attr in attr_rows {
            let (aid_item_id, value) = attr?;
            attrs_by_item.entry(aid_item_id).or_default().push(value);
        }

        // 3. 时段按请求分组
        let mut window_stmt = conn.prepare(
            r#"
            SELECT request_id, day, start_time, end_time
            FROM aid_request_window
            "#,
        )?;
        let mut windows_by_request: HashMap<String, Vec<ScheduledWindow>> = HashMap::new();
        let window_rows = window_stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        for window in window_rows {
            let (request_id, day_raw, start_raw, end_raw) = window?;
            let day = NaiveDate::parse_from_str(&day_raw, DATE_FORMAT)
                .map_err(|e| RepositoryError::ValidationError(format!("时段日期损坏: {}", e)))?;
            let start = NaiveTime::parse_from_str(&start_raw, TIME_FORMAT)
                .map_err(|e| RepositoryError::ValidationError(format!("时段开始时刻损坏: {}", e)))?;
            let end = NaiveTime::parse_from_str(&end_raw, TIME_FORMAT)
                .map_err(|e| RepositoryError::ValidationError(format!("时段结束时刻损坏: {}", e)))?;
            windows_by_request
                .entry(request_id)
                .or_default()
                .push(ScheduledWindow {
                    day,
                    start_time: start,
                    end_time: end,
                });
        }

        // 4. 组装候选视图
        let candidates = items
            .into_iter()
            .map(|(item, template_name)| {
                let attributes = attrs_by_item.remove(&item.aid_item_id).unwrap_or_default();
                let windows = windows_by_request
                    .get(&item.request_id)
                    .cloned()
                    .unwrap_or_default();
                AidItemCandidate {
                    item,
                    template_name,
                    attributes,
                    windows,
                }
            })
            .collect();

        Ok(candidates)
    }
}
