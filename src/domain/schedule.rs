// ==========================================
// 公益物资调配平台 - 时间窗口值对象
// ==========================================
// 职责: 定义援助请求/捐赠的可用时段
// 红线: 窗口为同日时段,不允许跨夜 (start < end)
// ==========================================

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 日期序列化格式(与数据库一致)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 时刻序列化格式
pub const TIME_FORMAT: &str = "%H:%M";

// ==========================================
// 时间窗口解析错误
// ==========================================

/// 时间窗口格式错误
///
/// 属于校验类错误: 直接拒绝请求,不做自动重试
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("日期格式错误: {0}")]
    MalformedDate(String),

    #[error("时刻格式错误: {0}")]
    MalformedTime(String),

    #[error("时间窗口无效: start_time={start} >= end_time={end}")]
    InvertedWindow { start: String, end: String },
}

// ==========================================
// ScheduledWindow - 时间窗口
// ==========================================
// 不可变值对象,作为援助请求日程的一部分序列化
// 一个请求携带一组窗口,顺序无意义
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledWindow {
    pub day: NaiveDate,        // 窗口日期
    pub start_time: NaiveTime, // 开始时刻
    pub end_time: NaiveTime,   // 结束时刻
}

impl ScheduledWindow {
    /// 构造并校验时间窗口
    ///
    /// # 规则
    /// - start_time 必须严格早于 end_time (同日窗口)
    pub fn new(
        day: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, ScheduleError> {
        if start_time >= end_time {
            return Err(ScheduleError::InvertedWindow {
                start: start_time.format(TIME_FORMAT).to_string(),
                end: end_time.format(TIME_FORMAT).to_string(),
            });
        }
        Ok(Self {
            day,
            start_time,
            end_time,
        })
    }

    /// 从字符串字段构造(API 入参解析)
    ///
    /// # 参数
    /// - day: "YYYY-MM-DD"
    /// - start_time / end_time: "HH:MM" 或 "HH:MM:SS"
    ///
    /// # 返回
    /// - Err(ScheduleError): 日期/时刻无法解析,或 start >= end
    pub fn parse(day: &str, start_time: &str, end_time: &str) -> Result<Self, ScheduleError> {
        let day = NaiveDate::parse_from_str(day, DATE_FORMAT)
            .map_err(|_| ScheduleError::MalformedDate(day.to_string()))?;
        let start = Self::parse_time(start_time)?;
        let end = Self::parse_time(end_time)?;
        Self::new(day, start, end)
    }

    /// 解析时刻,兼容 "HH:MM" 与 "HH:MM:SS"
    fn parse_time(raw: &str) -> Result<NaiveTime, ScheduleError> {
        NaiveTime::parse_from_str(raw, TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| ScheduleError::MalformedTime(raw.to_string()))
    }

    /// 窗口开始的绝对时刻
    pub fn start_instant(&self) -> NaiveDateTime {
        self.day.and_time(self.start_time)
    }

    /// 窗口结束的绝对时刻
    pub fn end_instant(&self) -> NaiveDateTime {
        self.day.and_time(self.end_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_window() {
        let w = ScheduledWindow::parse("2024-06-05", "09:00", "11:30").unwrap();
        assert_eq!(w.day, NaiveDate::from_ymd_opt(2024, 6, 5).unwrap());
        assert_eq!(
            w.start_instant(),
            NaiveDate::from_ymd_opt(2024, 6, 5)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_with_seconds() {
        let w = ScheduledWindow::parse("2024-06-05", "09:00:00", "11:30:00").unwrap();
        assert_eq!(w.end_time, NaiveTime::from_hms_opt(11, 30, 0).unwrap());
    }

    #[test]
    fn test_malformed_date_rejected() {
        let err = ScheduledWindow::parse("2024/06/05", "09:00", "11:30").unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedDate(_)));
    }

    #[test]
    fn test_malformed_time_rejected() {
        let err = ScheduledWindow::parse("2024-06-05", "morning", "11:30").unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedTime(_)));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let err = ScheduledWindow::parse("2024-06-05", "12:00", "09:00").unwrap_err();
        assert!(matches!(err, ScheduleError::InvertedWindow { .. }));
        // 等长窗口同样拒绝
        let err = ScheduledWindow::parse("2024-06-05", "09:00", "09:00").unwrap_err();
        assert!(matches!(err, ScheduleError::InvertedWindow { .. }));
    }
}
