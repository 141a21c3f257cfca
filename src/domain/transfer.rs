// ==========================================
// 公益物资调配平台 - 出库调拨领域模型
// ==========================================
// 职责: 定义出库调拨单与明细行
// 说明: 非终态调拨单的明细行聚合为"在途预留",
//       预留是数量预算,不绑定具体批次
// ==========================================

use crate::domain::types::TransferStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// TransferRequest - 出库调拨单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    // ===== 主键 =====
    pub transfer_id: String, // 调拨单ID (uuid)

    // ===== 归属 =====
    pub branch_id: String, // 出库站点ID

    // ===== 状态 =====
    pub status: TransferStatus,

    // ===== 审计 =====
    pub created_at: NaiveDateTime,
}

impl TransferRequest {
    /// 创建待审核调拨单
    pub fn new_pending(branch_id: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            transfer_id: Uuid::new_v4().to_string(),
            branch_id: branch_id.into(),
            status: TransferStatus::Pending,
            created_at,
        }
    }

    /// 明细行是否仍占用可用量
    pub fn holds_reservation(&self) -> bool {
        !self.status.is_terminal()
    }
}

// ==========================================
// TransferLineItem - 调拨明细行
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferLineItem {
    pub transfer_id: String, // 所属调拨单ID
    pub item_id: String,     // 物品模板ID
    pub quantity: f64,       // 调拨数量 (>0)
}

// ==========================================
// PendingReservation - 在途预留(派生视图)
// ==========================================
// 聚合视图,不是独立持久实体;查询时刻实时反映在途承诺
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingReservation {
    pub item_id: String,   // 物品模板ID
    pub branch_id: String, // 站点ID
    pub quantity: f64,     // 在途预留总量
}
