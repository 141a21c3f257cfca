// ==========================================
// 公益物资调配平台 - 出库调拨仓储
// ==========================================
// 职责: 管理 transfer_request / transfer_line_item 表,
//       聚合"在途预留"数量,承载预约提交的串行化写路径
// 红线: 可用量读取不构成预约;预约提交必须在事务内复核可用量
// ==========================================

use crate::domain::transfer::{TransferLineItem, TransferRequest};
use crate::domain::types::TransferStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::stock_lot_repo::StockLotRepository;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 时间戳序列化格式(与数据库一致)
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// TransferRepository - 出库调拨仓储
// ==========================================
pub struct TransferRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TransferRepository {
    /// 创建新的调拨仓储实例
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
    // 在途预留查询
    // ==========================================

    /// 查询某物品在某站点的在途预留总量
    ///
    /// # 规则
    /// - 统计所有非终态(PENDING/APPROVED)调拨单的明细行数量之和
    /// - 预留是数量预算,不绑定具体批次
    pub fn pending_quantity(&self, item_id: &str, branch_id: &str) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        Self::pending_quantity_with_conn(&conn, item_id, branch_id)
    }

    /// 在给定连接上统计在途预留(供事务内复核复用)
    pub(crate) fn pending_quantity_with_conn(
        conn: &Connection,
        item_id: &str,
        branch_id: &str,
    ) -> RepositoryResult<f64> {
        let total: f64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(li.quantity), 0.0)
            FROM transfer_line_item li
            JOIN transfer_request tr ON tr.transfer_id = li.transfer_id
            WHERE li.item_id = ?1
              AND tr.branch_id = ?2
              AND tr.status NOT IN ('FULFILLED', 'CANCELLED', 'REJECTED')
            "#,
            params![item_id, branch_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    // ==========================================
    // 预约提交(串行化写路径)
    // ==========================================

    /// 事务内复核并创建预约
    ///
    /// 覆盖"库存读取 + 预留读取 + 预留写入"的最小工作单元:
    /// 1. 同一事务内重新推导可用量(有效库存 - 在途预留)
    /// 2. 不足则中止,返回可重试的 InsufficientAvailability
    /// 3. 充足则写入调拨单与明细行并提交
    ///
    /// # 参数
    /// - cutoff: 请求窗口截止日(可用量按该日推导)
    /// - created_at: 调用方注入的当前时刻
    pub fn create_reservation_checked(
        &self,
        item_id: &str,
        branch_id: &str,
        quantity: f64,
        cutoff: NaiveDate,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<TransferRequest> {
        if quantity <= 0.0 {
            return Err(RepositoryError::ValidationError(format!(
                "预约数量必须为正: {}",
                quantity
            )));
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 提交时刻复核: 读取必须与写入处于同一事务快照
        let raw =
            StockLotRepository::valid_quantity_usable_from_with_conn(&tx, item_id, branch_id, cutoff)?;
        let pending = Self::pending_quantity_with_conn(&tx, item_id, branch_id)?;
        let available = (raw - pending).max(0.0);

        if quantity > available {
            // 事务随 tx Drop 自动回滚
            return Err(RepositoryError::InsufficientAvailability {
                item_id: item_id.to_string(),
                branch_id: branch_id.to_string(),
                requested: quantity,
                available,
            });
        }

        let request = TransferRequest::new_pending(branch_id, created_at);
        tx.execute(
            r#"
            INSERT INTO transfer_request (transfer_id, branch_id, status, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                request.transfer_id,
                request.branch_id,
                request.status.as_str(),
                request.created_at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;
        tx.execute(
            r#"
            INSERT INTO transfer_line_item (transfer_id, item_id, quantity)
            VALUES (?1, ?2, ?3)
            "#,
            params![request.transfer_id, item_id, quantity],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(request)
    }

    // ==========================================
    // 状态流转
    // ==========================================

    /// 更新调拨单状态
    ///
    /// # 规则
    /// - 终态调拨单不允许再流转
    /// - 进入终态后,其明细行即不再占用可用量
    pub fn update_status(
        &self,
        transfer_id: &str,
        new_status: TransferStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let current_raw: String = conn
            .query_row(
                "SELECT status FROM transfer_request WHERE transfer_id = ?1",
                params![transfer_id],
                |row| row.get(0),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                    entity: "TransferRequest".to_string(),
                    id: transfer_id.to_string(),
                },
                other => other.into(),
            })?;

        let current = TransferStatus::from_code(&current_raw).ok_or_else(|| {
            RepositoryError::InternalError(format!("未知调拨单状态: {}", current_raw))
        })?;
        if current.is_terminal() {
            return Err(RepositoryError::InvalidStateTransition {
                from: current.to_string(),
                to: new_status.to_string(),
            });
        }

        conn.execute(
            "UPDATE transfer_request SET status = ?1 WHERE transfer_id = ?2",
            params![new_status.as_str(), transfer_id],
        )?;
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 按ID查询调拨单
    pub fn find_by_id(&self, transfer_id: &str) -> RepositoryResult<Option<TransferRequest>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT transfer_id, branch_id, status, created_at
            FROM transfer_request
            WHERE transfer_id = ?1
            "#,
        )?;
        let mut rows = stmt.query_map(params![transfer_id], |row| {
            let status_raw: String = row.get(2)?;
            let created_raw: String = row.get(3)?;
            Ok(TransferRequest {
                transfer_id: row.get(0)?,
                branch_id: row.get(1)?,
                status: TransferStatus::from_code(&status_raw)
                    .unwrap_or(TransferStatus::Cancelled),
                created_at: NaiveDateTime::parse_from_str(&created_raw, DATETIME_FORMAT)
                    .unwrap_or_else(|_| {
                        NaiveDate::from_ymd_opt(1970, 1, 1)
                            .unwrap()
                            .and_hms_opt(0, 0, 0)
                            .unwrap()
                    }),
            })
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// 查询调拨单的明细行
    pub fn list_line_items(&self, transfer_id: &str) -> RepositoryResult<Vec<TransferLineItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT transfer_id, item_id, quantity
            FROM transfer_line_item
            WHERE transfer_id = ?1
            "#,
        )?;
        let rows = stmt.query_map(params![transfer_id], |row| {
            Ok(TransferLineItem {
                transfer_id: row.get(0)?,
                item_id: row.get(1)?,
                quantity: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
