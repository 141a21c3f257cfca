// ==========================================
// 公益物资调配平台 - 过期巡检 API
// ==========================================
// 职责: 对外暴露 run_expiration_sweep 单一入口
// 说明: 引擎不拥有定时器;外部日度调度器(或巡检二进制)触发
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::engine::sweep::{ExpirationSweepEngine, SweepSummary};
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// SweepApi - 过期巡检 API
// ==========================================
pub struct SweepApi {
    engine: Arc<ExpirationSweepEngine>,
}

impl SweepApi {
    /// 创建新的巡检 API 实例
    pub fn new(engine: Arc<ExpirationSweepEngine>) -> Self {
        Self { engine }
    }

    /// 执行一次全站点过期巡检
    ///
    /// # 参数
    /// - today: 调度方注入的当前日期
    ///
    /// 单站点失败在引擎内记录并跳过;仅基础设施级失败才整体报错
    pub async fn run_expiration_sweep(&self, today: NaiveDate) -> ApiResult<SweepSummary> {
        self.engine.run(today).await.map_err(ApiError::from)
    }
}
