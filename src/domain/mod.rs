// ==========================================
// 公益物资调配平台 - 领域模型层
// ==========================================
// 职责: 定义领域实体、值对象与派生视图
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod aid;
pub mod availability;
pub mod schedule;
pub mod stock;
pub mod transfer;
pub mod types;

// 重导出核心类型
pub use aid::{AidItem, AidItemCandidate, AidRequest, RankedAidItem};
pub use availability::{AvailabilityResult, MatchScore, PagedResult};
pub use schedule::{ScheduleError, ScheduledWindow, DATE_FORMAT, TIME_FORMAT};
pub use stock::{today_utc, ItemTemplate, StockLot};
pub use transfer::{PendingReservation, TransferLineItem, TransferRequest};
pub use types::{
    AidItemStatus, LotStatus, SortDirection, TransferStatus, UrgencyTier,
};
