// ==========================================
// 公益物资调配平台 - 引擎层
// ==========================================
// 职责: 实现库存预约与时效匹配的业务规则,不拼 SQL
// 红线: now/today 一律由调用方注入,引擎内部不取时钟
// ==========================================

pub mod availability;
pub mod events;
pub mod matching;
pub mod sweep;
pub mod time_window;
pub mod urgency;

// 重导出核心引擎
pub use availability::AvailabilityEngine;
pub use events::{
    BranchNotification, BranchNotificationKind, NoOpNotificationPublisher, NotificationPublisher,
};
pub use matching::{MatchingEngine, SearchParams, SortKey};
pub use sweep::{BranchSweepOutcome, ExpirationSweepEngine, SweepSummary};
pub use time_window::TimeWindowResolver;
pub use urgency::{UrgencyEngine, DEFAULT_URGENT_DAYS, DEFAULT_VERY_URGENT_DAYS};
