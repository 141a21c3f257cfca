// ==========================================
// 公益物资调配平台 - 库存批次仓储
// ==========================================
// 职责: 管理 stock_lot 表的查询与状态流转
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::schedule::DATE_FORMAT;
use crate::domain::stock::StockLot;
use crate::domain::types::LotStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

/// 运输安全边际(天)
///
/// 批次必须比请求窗口的截止日再多存活这么多天才计入可用量,
/// 避免发放在途期间当日过期
pub const TRANSIT_BUFFER_DAYS: i64 = 1;

// ==========================================
// StockLotRepository - 库存批次仓储
// ==========================================
pub struct StockLotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockLotRepository {
    /// 创建新的库存批次仓储实例
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入
    // ==========================================

    /// 写入新批次(捐赠入库)
    pub fn insert(&self, lot: &StockLot) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::insert_with_conn(&conn, lot)
    }

    /// 在给定连接上写入批次(供事务路径复用)
    pub(crate) fn insert_with_conn(conn: &Connection, lot: &StockLot) -> RepositoryResult<()> {
        conn.execute(
            r#"
            INSERT INTO stock_lot
                (lot_id, item_id, branch_id, quantity, expiration_date, status, created_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                lot.lot_id,
                lot.item_id,
                lot.branch_id,
                lot.quantity,
                lot.expiration_date.format(DATE_FORMAT).to_string(),
                lot.status.as_str(),
                lot.created_date.format(DATE_FORMAT).to_string(),
            ],
        )?;
        Ok(())
    }

    /// 批量置为过期 (VALID → EXPIRED)
    ///
    /// 幂等: 已是 EXPIRED 的批次不受影响,也不计入返回值
    ///
    /// # 返回
    /// 实际发生状态流转的批次数
    pub fn mark_expired(&self, lot_ids: &[String]) -> RepositoryResult<usize> {
        if lot_ids.is_empty() {
            return Ok(0);
        }
        let conn = self.get_conn()?;

        // 动态 IN 子句
        let placeholders = (1..=lot_ids.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE stock_lot SET status = 'EXPIRED' WHERE status = 'VALID' AND lot_id IN ({})",
            placeholders
        );
        let changed = conn.execute(
            &sql,
            rusqlite::params_from_iter(lot_ids.iter().map(|s| s.as_str())),
        )?;
        Ok(changed)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 按ID查询批次
    pub fn find_by_id(&self, lot_id: &str) -> RepositoryResult<Option<StockLot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT lot_id, item_id, branch_id, quantity, expiration_date, status, created_date
            FROM stock_lot
            WHERE lot_id = ?1
            "#,
        )?;
        let mut rows = stmt.query_map(params![lot_id], Self::map_lot_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// 查询"自截止日起可用"的有效库存总量
    ///
    /// # 规则
    /// - 仅统计 VALID 批次
    /// - 过期日期须不早于 cutoff + TRANSIT_BUFFER_DAYS
    /// - 不满足的批次整批排除,不做部分计入
    /// - 未知物品/站点返回 0(无库存是常态,不是错误)
    pub fn valid_quantity_usable_from(
        &self,
        item_id: &str,
        branch_id: &str,
        cutoff: NaiveDate,
    ) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        Self::valid_quantity_usable_from_with_conn(&conn, item_id, branch_id, cutoff)
    }

    /// 在给定连接上统计可用量(供事务内复核复用)
    pub(crate) fn valid_quantity_usable_from_with_conn(
        conn: &Connection,
        item_id: &str,
        branch_id: &str,
        cutoff: NaiveDate,
    ) -> RepositoryResult<f64> {
        let min_expiration = (cutoff + Duration::days(TRANSIT_BUFFER_DAYS))
            .format(DATE_FORMAT)
            .to_string();
        let total: f64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(quantity), 0.0)
            FROM stock_lot
            WHERE item_id = ?1
              AND branch_id = ?2
              AND status = 'VALID'
              AND expiration_date >= ?3
            "#,
            params![item_id, branch_id, min_expiration],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// 查询指定日期过期的有效批次(巡检"明日过期"预警)
    pub fn find_valid_expiring_on(
        &self,
        branch_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<StockLot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT lot_id, item_id, branch_id, quantity, expiration_date, status, created_date
            FROM stock_lot
            WHERE branch_id = ?1
              AND status = 'VALID'
              AND expiration_date = ?2
            "#,
        )?;
        let rows = stmt.query_map(
            params![branch_id, date.format(DATE_FORMAT).to_string()],
            Self::map_lot_row,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 查询截至指定日期(含)已到期的有效批次(巡检"今日下架")
    ///
    /// 包含早于当日的滞留批次: 若某日巡检未执行,次日巡检补处理
    pub fn find_valid_expiring_on_or_before(
        &self,
        branch_id: &str,
        date: NaiveDate,
    ) -> RepositoryResult<Vec<StockLot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT lot_id, item_id, branch_id, quantity, expiration_date, status, created_date
            FROM stock_lot
            WHERE branch_id = ?1
              AND status = 'VALID'
              AND expiration_date <= ?2
            "#,
        )?;
        let rows = stmt.query_map(
            params![branch_id, date.format(DATE_FORMAT).to_string()],
            Self::map_lot_row,
        )?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// 列出存在库存记录的全部站点
    pub fn list_branch_ids(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT branch_id FROM stock_lot ORDER BY branch_id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn map_lot_row(row: &Row<'_>) -> rusqlite::Result<StockLot> {
        let expiration_raw: String = row.get(4)?;
        let status_raw: String = row.get(5)?;
        let created_raw: String = row.get(6)?;
        Ok(StockLot {
            lot_id: row.get(0)?,
            item_id: row.get(1)?,
            branch_id: row.get(2)?,
            quantity: row.get(3)?,
            expiration_date: NaiveDate::parse_from_str(&expiration_raw, DATE_FORMAT)
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            status: LotStatus::from_code(&status_raw).unwrap_or(LotStatus::Expired),
            created_date: NaiveDate::parse_from_str(&created_raw, DATE_FORMAT)
                .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        })
    }
}
