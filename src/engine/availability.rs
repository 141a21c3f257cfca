// ==========================================
// 公益物资调配平台 - 可用量计算引擎
// ==========================================
// 职责: 组合时间窗口解析 + 库存台账 + 在途预留,
//       回答"站点B在窗口W内能为物品X保障多少数量"
// 红线: 可用量读取不构成预约;
//       预约提交走仓储层事务内复核的串行化写路径
// ==========================================
// 数量语义: 非负实数,减法在 0 处截断
// 过期比较: 按日历日粒度,不看时分秒
// ==========================================

use crate::domain::availability::AvailabilityResult;
use crate::domain::schedule::ScheduledWindow;
use crate::domain::transfer::TransferRequest;
use crate::engine::time_window::TimeWindowResolver;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::item_repo::ItemTemplateRepository;
use crate::repository::stock_lot_repo::StockLotRepository;
use crate::repository::transfer_repo::TransferRepository;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// AvailabilityEngine - 可用量计算引擎
// ==========================================
pub struct AvailabilityEngine {
    item_repo: Arc<ItemTemplateRepository>,
    stock_repo: Arc<StockLotRepository>,
    transfer_repo: Arc<TransferRepository>,
}

impl AvailabilityEngine {
    /// 创建新的可用量计算引擎
    pub fn new(
        item_repo: Arc<ItemTemplateRepository>,
        stock_repo: Arc<StockLotRepository>,
        transfer_repo: Arc<TransferRepository>,
    ) -> Self {
        Self {
            item_repo,
            stock_repo,
            transfer_repo,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 单物品可用量
    ///
    /// # 规则
    /// 1) window_end = 最后一个未结束窗口的结束时刻;
    ///    无 → 该日程不可预约,返回数量0(window_end=None),不报错
    /// 2) raw = 台账中截止日后仍可用的有效库存
    /// 3) pending = 在途预留
    /// 4) available = max(0, raw - pending)
    ///
    /// # 返回
    /// - Err(NotFound): 物品不在目录中(单条查询要求物品存在)
    #[instrument(skip(self, windows))]
    pub async fn available_quantity(
        &self,
        item_id: &str,
        branch_id: &str,
        windows: &[ScheduledWindow],
        now: NaiveDateTime,
    ) -> RepositoryResult<AvailabilityResult> {
        if !self.item_repo.exists(item_id)? {
            return Err(RepositoryError::NotFound {
                entity: "ItemTemplate".to_string(),
                id: item_id.to_string(),
            });
        }

        let window_end = match TimeWindowResolver::latest_upcoming(windows, now) {
            Some(w) => w.end_instant(),
            None => return Ok(AvailabilityResult::no_upcoming_window(item_id)),
        };

        let raw =
            self.stock_repo
                .valid_quantity_usable_from(item_id, branch_id, window_end.date())?;
        let pending = self.transfer_repo.pending_quantity(item_id, branch_id)?;
        let available = (raw - pending).max(0.0);

        Ok(AvailabilityResult {
            item_id: item_id.to_string(),
            available_quantity: available,
            window_end: Some(window_end),
        })
    }

    /// 批量可用量
    ///
    /// 同一日程下逐物品计算;目录中不存在的物品直接省略,
    /// 不中断整批计算
    #[instrument(skip(self, item_ids, windows), fields(count = item_ids.len()))]
    pub async fn available_quantity_batch(
        &self,
        item_ids: &[String],
        branch_id: &str,
        windows: &[ScheduledWindow],
        now: NaiveDateTime,
    ) -> RepositoryResult<Vec<AvailabilityResult>> {
        let window_end = TimeWindowResolver::latest_upcoming(windows, now).map(|w| w.end_instant());

        let computations = item_ids.iter().map(|item_id| {
            let item_id = item_id.clone();
            async move {
                if !self.item_repo.exists(&item_id)? {
                    // 未知物品: 省略而非报错
                    return Ok::<Option<AvailabilityResult>, RepositoryError>(None);
                }
                let result = match window_end {
                    None => AvailabilityResult::no_upcoming_window(item_id.as_str()),
                    Some(end) => {
                        let raw = self.stock_repo.valid_quantity_usable_from(
                            &item_id,
                            branch_id,
                            end.date(),
                        )?;
                        let pending =
                            self.transfer_repo.pending_quantity(&item_id, branch_id)?;
                        AvailabilityResult {
                            item_id: item_id.clone(),
                            available_quantity: (raw - pending).max(0.0),
                            window_end: Some(end),
                        }
                    }
                };
                Ok(Some(result))
            }
        });

        let results = futures::future::join_all(computations).await;
        let mut out = Vec::with_capacity(results.len());
        for result in results {
            if let Some(r) = result? {
                out.push(r);
            }
        }
        Ok(out)
    }

    // ==========================================
    // 预约提交
    // ==========================================

    /// 提交预约(可用量检查 → 事务内复核 → 写入调拨单)
    ///
    /// 复核发生在仓储层事务内: 并发提交同一物品/站点时,
    /// 后到者按提交时刻的库存与预留重新推导,不足即中止
    ///
    /// # 返回
    /// - Err(InsufficientAvailability): 可重试,调用方可重新查询后再试
    /// - Err(BusinessRuleViolation): 日程已无未结束窗口
    #[instrument(skip(self, windows))]
    pub async fn reserve(
        &self,
        item_id: &str,
        branch_id: &str,
        quantity: f64,
        windows: &[ScheduledWindow],
        now: NaiveDateTime,
    ) -> RepositoryResult<TransferRequest> {
        if !self.item_repo.exists(item_id)? {
            return Err(RepositoryError::NotFound {
                entity: "ItemTemplate".to_string(),
                id: item_id.to_string(),
            });
        }

        let window_end = TimeWindowResolver::latest_upcoming(windows, now)
            .map(|w| w.end_instant())
            .ok_or_else(|| {
                RepositoryError::BusinessRuleViolation(
                    "日程已无未结束窗口,无法提交预约".to_string(),
                )
            })?;

        self.transfer_repo.create_reservation_checked(
            item_id,
            branch_id,
            quantity,
            window_end.date(),
            now,
        )
    }
}
