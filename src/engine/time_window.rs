// ==========================================
// 公益物资调配平台 - 时间窗口解析引擎
// ==========================================
// 职责: 将日程条目换算为绝对时刻,求最早/最晚未结束窗口
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================
// "未开始"按窗口开始时刻判定,"未结束"按窗口结束时刻判定,
// 两者独立评估: 进行中的窗口计入 latest_upcoming,
// 但不计入 earliest_upcoming。援助期起点取最早未开始时段,
// 截止取最后未结束时段的结束时刻。
// ==========================================

use crate::domain::schedule::ScheduledWindow;
use chrono::NaiveDateTime;

// ==========================================
// TimeWindowResolver - 时间窗口解析
// ==========================================
pub struct TimeWindowResolver;

impl TimeWindowResolver {
    /// 将窗口换算为绝对时刻
    ///
    /// # 参数
    /// - use_start: true 取开始时刻,false 取结束时刻
    ///
    /// 格式与 start < end 的校验在 ScheduledWindow 构造/解析时完成,
    /// 已构造的窗口换算不会失败
    pub fn resolve_instant(window: &ScheduledWindow, use_start: bool) -> NaiveDateTime {
        if use_start {
            window.start_instant()
        } else {
            window.end_instant()
        }
    }

    /// 最早的未开始窗口
    ///
    /// # 规则
    /// - 仅考虑开始时刻严格晚于 now 的窗口
    /// - 取开始时刻最小者;无则 None
    pub fn earliest_upcoming(
        windows: &[ScheduledWindow],
        now: NaiveDateTime,
    ) -> Option<ScheduledWindow> {
        windows
            .iter()
            .filter(|w| w.start_instant() > now)
            .min_by_key(|w| w.start_instant())
            .copied()
    }

    /// 最晚的未结束窗口
    ///
    /// # 规则
    /// - 仅考虑结束时刻严格晚于 now 的窗口(进行中的窗口也算)
    /// - 取结束时刻最大者;无则 None
    pub fn latest_upcoming(
        windows: &[ScheduledWindow],
        now: NaiveDateTime,
    ) -> Option<ScheduledWindow> {
        windows
            .iter()
            .filter(|w| w.end_instant() > now)
            .max_by_key(|w| w.end_instant())
            .copied()
    }
}
