// ==========================================
// 公益物资调配平台 - 紧急等级判定引擎
// ==========================================
// 红线: 紧急等级是"等级制",不是评分制
// 红线: now 由调用方注入,引擎内部不取时钟
// ==========================================
// 职责: 依据请求"最后一个未结束窗口"的截止时刻判定紧急等级
// 输入: 请求时段集合 + 注入的当前时刻 + 天数阈值
// 输出: UrgencyTier (每次读取重新计算,不落库)
// ==========================================

use crate::domain::schedule::ScheduledWindow;
use crate::domain::types::UrgencyTier;
use crate::engine::time_window::TimeWindowResolver;
use chrono::NaiveDateTime;

/// 特急阈值默认值(天)
pub const DEFAULT_VERY_URGENT_DAYS: f64 = 3.0;

/// 紧急阈值默认值(天)
pub const DEFAULT_URGENT_DAYS: f64 = 7.0;

// ==========================================
// UrgencyEngine - 紧急等级判定引擎
// ==========================================
pub struct UrgencyEngine;

impl UrgencyEngine {
    /// 创建新的紧急等级判定引擎
    pub fn new() -> Self {
        Self
    }

    /// 判定紧急等级
    ///
    /// # 规则
    /// 1) deadline = 最后一个未结束窗口的结束时刻;无 → EXPIRED
    /// 2) days_remaining = (deadline - now) 折算为天(含小数)
    /// 3) days_remaining ≤ very_urgent_days → VERY_URGENT
    ///    days_remaining ≤ urgent_days → URGENT
    ///    其余 → NOT_URGENT
    ///
    /// 边界值(恰为 3.0 / 7.0 天)归入更紧急一档:
    /// 宁可高估紧急度,不可低估
    pub fn classify(
        &self,
        windows: &[ScheduledWindow],
        now: NaiveDateTime,
        very_urgent_days: f64,
        urgent_days: f64,
    ) -> UrgencyTier {
        self.classify_with_deadline(windows, now, very_urgent_days, urgent_days)
            .0
    }

    /// 判定紧急等级,同时返回所依据的截止时刻
    ///
    /// 匹配引擎按"援助期截止"排序时复用该截止时刻,避免重复求解
    pub fn classify_with_deadline(
        &self,
        windows: &[ScheduledWindow],
        now: NaiveDateTime,
        very_urgent_days: f64,
        urgent_days: f64,
    ) -> (UrgencyTier, Option<NaiveDateTime>) {
        let deadline = match TimeWindowResolver::latest_upcoming(windows, now) {
            Some(w) => w.end_instant(),
            None => return (UrgencyTier::Expired, None),
        };

        let days_remaining = Self::days_remaining(deadline, now);
        let tier = if days_remaining <= very_urgent_days {
            UrgencyTier::VeryUrgent
        } else if days_remaining <= urgent_days {
            UrgencyTier::Urgent
        } else {
            UrgencyTier::NotUrgent
        };
        (tier, Some(deadline))
    }

    /// 截止时刻距 now 的剩余天数(含小数)
    fn days_remaining(deadline: NaiveDateTime, now: NaiveDateTime) -> f64 {
        (deadline - now).num_seconds() as f64 / 86_400.0
    }
}

impl Default for UrgencyEngine {
    fn default() -> Self {
        Self::new()
    }
}
