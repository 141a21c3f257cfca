// ==========================================
// 公益物资调配平台 - 可用量 API
// ==========================================
// 职责: 封装可用量查询与预约提交,解析日程入参
// 架构: API 层 → Engine 层 → Repository 层
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::availability::AvailabilityResult;
use crate::domain::schedule::ScheduledWindow;
use crate::domain::transfer::TransferRequest;
use crate::engine::availability::AvailabilityEngine;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// 日程入参 DTO
// ==========================================

/// 日程条目(外部调用方传入的原始字段)
///
/// 解析失败按校验错误整体拒绝,不做部分受理
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntryDto {
    pub day: String,        // "YYYY-MM-DD"
    pub start_time: String, // "HH:MM"
    pub end_time: String,   // "HH:MM"
}

/// 解析日程入参
fn parse_schedule(entries: &[ScheduleEntryDto]) -> ApiResult<Vec<ScheduledWindow>> {
    entries
        .iter()
        .map(|e| {
            ScheduledWindow::parse(&e.day, &e.start_time, &e.end_time).map_err(ApiError::from)
        })
        .collect()
}

// ==========================================
// AvailabilityApi - 可用量 API
// ==========================================
pub struct AvailabilityApi {
    engine: Arc<AvailabilityEngine>,
}

impl AvailabilityApi {
    /// 创建新的可用量 API 实例
    pub fn new(engine: Arc<AvailabilityEngine>) -> Self {
        Self { engine }
    }

    /// 单物品可用量查询
    ///
    /// # 返回
    /// - Ok(AvailabilityResult): window_end=None 表示日程无未结束窗口(数量0)
    /// - Err(NotFound): 物品不在目录
    /// - Err(MalformedSchedule): 日程入参无法解析
    pub async fn get_availability(
        &self,
        item_id: &str,
        branch_id: &str,
        schedule: &[ScheduleEntryDto],
        now: NaiveDateTime,
    ) -> ApiResult<AvailabilityResult> {
        let windows = parse_schedule(schedule)?;
        self.engine
            .available_quantity(item_id, branch_id, &windows, now)
            .await
            .map_err(ApiError::from)
    }

    /// 批量可用量查询
    ///
    /// 目录中不存在的物品从结果中省略,不中断整批
    pub async fn get_availability_batch(
        &self,
        item_ids: &[String],
        branch_id: &str,
        schedule: &[ScheduleEntryDto],
        now: NaiveDateTime,
    ) -> ApiResult<Vec<AvailabilityResult>> {
        let windows = parse_schedule(schedule)?;
        self.engine
            .available_quantity_batch(item_ids, branch_id, &windows, now)
            .await
            .map_err(ApiError::from)
    }

    /// 提交预约
    ///
    /// 可用量在事务内复核;不足时返回可重试的 InsufficientAvailability,
    /// 调用方可重新查询后再试
    pub async fn reserve(
        &self,
        item_id: &str,
        branch_id: &str,
        quantity: f64,
        schedule: &[ScheduleEntryDto],
        now: NaiveDateTime,
    ) -> ApiResult<TransferRequest> {
        let windows = parse_schedule(schedule)?;
        self.engine
            .reserve(item_id, branch_id, quantity, &windows, now)
            .await
            .map_err(ApiError::from)
    }
}
