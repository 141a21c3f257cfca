// ==========================================
// 公益物资调配平台 - 库存预约与时效匹配引擎
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 平台核心引擎(可用量/预约/匹配/过期巡检)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 捐赠入库
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施(连接初始化/PRAGMA 统一/建表)
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AidItemStatus, LotStatus, SortDirection, TransferStatus, UrgencyTier};

// 领域实体与视图
pub use domain::{
    AidItem, AidItemCandidate, AidRequest, AvailabilityResult, ItemTemplate, PagedResult,
    PendingReservation, RankedAidItem, ScheduleError, ScheduledWindow, StockLot,
    TransferLineItem, TransferRequest,
};

// 引擎
pub use engine::{
    AvailabilityEngine, ExpirationSweepEngine, MatchingEngine, NoOpNotificationPublisher,
    NotificationPublisher, SweepSummary, TimeWindowResolver, UrgencyEngine,
};

// API
pub use api::{AidSearchApi, ApiError, AvailabilityApi, SweepApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "公益物资调配平台";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
