// ==========================================
// 公益物资调配平台 - 引擎层通知发布
// ==========================================
// 职责: 定义站点通知发布 trait,实现依赖倒置
// 说明: Engine 层定义 trait,通知送达层(推送/站内信)实现适配器
// 投递语义: fire-and-forget,至少一次即可
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;

// ==========================================
// 站点通知类型
// ==========================================

/// 过期巡检产生的站点通知类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchNotificationKind {
    /// 明日过期预警(有闲置风险的批次)
    ExpiryWarning,
    /// 今日过期下架汇总
    ExpiredToday,
}

impl BranchNotificationKind {
    /// 转换为字符串标识
    pub fn as_str(&self) -> &str {
        match self {
            BranchNotificationKind::ExpiryWarning => "ExpiryWarning",
            BranchNotificationKind::ExpiredToday => "ExpiredToday",
        }
    }
}

/// 站点通知
///
/// 巡检引擎按站点聚合后发布,一次巡检每站点每类型至多一条
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchNotification {
    /// 目标站点ID(通知送达站点管理员)
    pub branch_id: String,
    /// 通知类型
    pub kind: BranchNotificationKind,
    /// 涉及批次数
    pub lot_count: usize,
    /// 相关日期(预警为明日,下架为当日)
    pub date: NaiveDate,
    /// 经消息目录渲染后的文案
    pub message: String,
}

// ==========================================
// 通知发布 Trait
// ==========================================

/// 站点通知发布者 Trait
///
/// Engine 层定义,送达层实现
/// 通过 trait 实现依赖倒置,引擎不依赖任何推送通道
pub trait NotificationPublisher: Send + Sync {
    /// 发布站点通知
    ///
    /// # 返回
    /// - Ok(()): 已接收(送达由实现方保证至少一次)
    /// - Err: 发布失败(调用方仅记录日志,不中断巡检)
    fn publish(&self, notification: BranchNotification)
        -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// 空实现: 丢弃所有通知
///
/// 用于测试与不接通知通道的部署
pub struct NoOpNotificationPublisher;

impl NotificationPublisher for NoOpNotificationPublisher {
    fn publish(
        &self,
        _notification: BranchNotification,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
