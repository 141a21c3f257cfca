// ==========================================
// 公益物资调配平台 - 领域类型定义
// ==========================================
// 职责: 库存/预约/匹配引擎共用的枚举类型
// 红线: 紧急等级是"等级制",不是评分制
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 紧急等级 (Urgency Tier)
// ==========================================
// 由援助请求"最后一个未结束时间窗口"与当前时刻推导
// 每次读取重新计算,不落库
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyTier {
    VeryUrgent, // 特急 (≤3天)
    Urgent,     // 紧急 (≤7天)
    NotUrgent,  // 普通 (>7天)
    Expired,    // 已失效 (无剩余窗口)
}

impl UrgencyTier {
    /// 从字符串标识解析(API 过滤参数)
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "VERY_URGENT" => Some(UrgencyTier::VeryUrgent),
            "URGENT" => Some(UrgencyTier::Urgent),
            "NOT_URGENT" => Some(UrgencyTier::NotUrgent),
            "EXPIRED" => Some(UrgencyTier::Expired),
            _ => None,
        }
    }

    /// 是否仍可参与匹配
    pub fn is_actionable(&self) -> bool {
        !matches!(self, UrgencyTier::Expired)
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrgencyTier::VeryUrgent => write!(f, "VERY_URGENT"),
            UrgencyTier::Urgent => write!(f, "URGENT"),
            UrgencyTier::NotUrgent => write!(f, "NOT_URGENT"),
            UrgencyTier::Expired => write!(f, "EXPIRED"),
        }
    }
}

// ==========================================
// 库存批次状态 (Lot Status)
// ==========================================
// 状态机: VALID → EXPIRED (终态,单向)
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotStatus {
    Valid,   // 有效
    Expired, // 已过期
}

impl LotStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LotStatus::Valid => "VALID",
            LotStatus::Expired => "EXPIRED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "VALID" => Some(LotStatus::Valid),
            "EXPIRED" => Some(LotStatus::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for LotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 出库调拨单状态 (Transfer Status)
// ==========================================
// 非终态调拨单的明细行构成"在途预留"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    Pending,   // 待审核
    Approved,  // 已批准,待发放
    Fulfilled, // 已发放 (终态)
    Cancelled, // 已取消 (终态)
    Rejected,  // 已驳回 (终态)
}

impl TransferStatus {
    /// 是否为终态(终态调拨单不再占用可用量)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransferStatus::Fulfilled | TransferStatus::Cancelled | TransferStatus::Rejected
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Approved => "APPROVED",
            TransferStatus::Fulfilled => "FULFILLED",
            TransferStatus::Cancelled => "CANCELLED",
            TransferStatus::Rejected => "REJECTED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PENDING" => Some(TransferStatus::Pending),
            "APPROVED" => Some(TransferStatus::Approved),
            "FULFILLED" => Some(TransferStatus::Fulfilled),
            "CANCELLED" => Some(TransferStatus::Cancelled),
            "REJECTED" => Some(TransferStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 援助物品状态 (Aid Item Status)
// ==========================================
// 只有 ACCEPTED(已受理未发放)的物品参与匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AidItemStatus {
    Pending,   // 待受理
    Accepted,  // 已受理,待发放
    Fulfilled, // 已发放
    Cancelled, // 已取消
}

impl AidItemStatus {
    /// 是否可参与匹配
    pub fn is_open(&self) -> bool {
        matches!(self, AidItemStatus::Accepted)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AidItemStatus::Pending => "PENDING",
            AidItemStatus::Accepted => "ACCEPTED",
            AidItemStatus::Fulfilled => "FULFILLED",
            AidItemStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PENDING" => Some(AidItemStatus::Pending),
            "ACCEPTED" => Some(AidItemStatus::Accepted),
            "FULFILLED" => Some(AidItemStatus::Fulfilled),
            "CANCELLED" => Some(AidItemStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for AidItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 排序方向 (Sort Direction)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    Asc,  // 升序
    Desc, // 降序
}

impl SortDirection {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}
