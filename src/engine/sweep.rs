// ==========================================
// 公益物资调配平台 - 过期巡检引擎
// ==========================================
// 职责: 按站点处理"明日过期预警"与"今日过期下架"
// 红线: 引擎不拥有定时器,由外部调度器每日触发一次
// 红线: 单站点失败只记录日志并跳过,不得中断其余站点
// ==========================================
// 状态机: 批次 VALID → EXPIRED,终态单向
// 预警口径: 明日过期批次中,其物品在该站点无在途预留者
//           (有预留的批次视为将在过期前发放,不计浪费)
// ==========================================

use crate::engine::events::{BranchNotification, BranchNotificationKind, NotificationPublisher};
use crate::i18n;
use crate::repository::error::RepositoryResult;
use crate::repository::stock_lot_repo::StockLotRepository;
use crate::repository::transfer_repo::TransferRepository;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// 巡检结果
// ==========================================

/// 单站点巡检结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSweepOutcome {
    pub branch_id: String,
    /// 计入预警的明日过期批次数
    pub lots_warned: usize,
    /// 本次实际下架的批次数
    pub lots_expired: usize,
}

/// 整次巡检汇总(供调度方日志)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepSummary {
    pub branches_processed: usize,
    pub branches_failed: usize,
    pub lots_warned: usize,
    pub lots_expired: usize,
}

// ==========================================
// ExpirationSweepEngine - 过期巡检引擎
// ==========================================
pub struct ExpirationSweepEngine {
    stock_repo: Arc<StockLotRepository>,
    transfer_repo: Arc<TransferRepository>,
    publisher: Arc<dyn NotificationPublisher>,
}

impl ExpirationSweepEngine {
    /// 创建新的过期巡检引擎
    pub fn new(
        stock_repo: Arc<StockLotRepository>,
        transfer_repo: Arc<TransferRepository>,
        publisher: Arc<dyn NotificationPublisher>,
    ) -> Self {
        Self {
            stock_repo,
            transfer_repo,
            publisher,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行一次全站点巡检
    ///
    /// # 参数
    /// - today: 调度方注入的当前日期
    ///
    /// # 失败语义
    /// - 站点列表取不到 → 整次失败(基础设施错误)
    /// - 单站点处理失败 → 记错误日志,计入 branches_failed,继续下一站点
    #[instrument(skip(self))]
    pub async fn run(&self, today: NaiveDate) -> RepositoryResult<SweepSummary> {
        let branch_ids = self.stock_repo.list_branch_ids()?;
        let mut summary = SweepSummary::default();

        for branch_id in branch_ids {
            match self.sweep_branch(&branch_id, today) {
                Ok(outcome) => {
                    summary.branches_processed += 1;
                    summary.lots_warned += outcome.lots_warned;
                    summary.lots_expired += outcome.lots_expired;
                }
                Err(e) => {
                    summary.branches_failed += 1;
                    tracing::error!(branch_id = %branch_id, error = %e, "站点巡检失败,跳过");
                }
            }
        }

        tracing::info!(
            processed = summary.branches_processed,
            failed = summary.branches_failed,
            warned = summary.lots_warned,
            expired = summary.lots_expired,
            "过期巡检完成"
        );
        Ok(summary)
    }

    /// 单站点巡检(独立工作单元)
    fn sweep_branch(&self, branch_id: &str, today: NaiveDate) -> RepositoryResult<BranchSweepOutcome> {
        let tomorrow = today + Duration::days(1);

        // === 明日过期预警 ===
        let expiring_tomorrow = self.stock_repo.find_valid_expiring_on(branch_id, tomorrow)?;
        // 同物品多批次只查一次在途预留
        let mut pending_cache: HashMap<String, f64> = HashMap::new();
        let mut warn_count = 0usize;
        for lot in &expiring_tomorrow {
            let pending = match pending_cache.get(&lot.item_id) {
                Some(p) => *p,
                None => {
                    let p = self.transfer_repo.pending_quantity(&lot.item_id, branch_id)?;
                    pending_cache.insert(lot.item_id.clone(), p);
                    p
                }
            };
            // 有在途预留的物品,视为将在过期前发放
            if pending <= 0.0 {
                warn_count += 1;
            }
        }
        if warn_count > 0 {
            self.publish(BranchNotification {
                branch_id: branch_id.to_string(),
                kind: BranchNotificationKind::ExpiryWarning,
                lot_count: warn_count,
                date: tomorrow,
                message: i18n::t_with_args(
                    "sweep.expiry_warning",
                    &[
                        ("branch", branch_id),
                        ("count", &warn_count.to_string()),
                        ("date", &tomorrow.to_string()),
                    ],
                ),
            });
        }

        // === 今日过期下架 ===
        // 含滞留批次: 若某日巡检未执行,本次补处理
        let expiring_today = self
            .stock_repo
            .find_valid_expiring_on_or_before(branch_id, today)?;
        let lot_ids: Vec<String> = expiring_today.iter().map(|l| l.lot_id.clone()).collect();
        let expired_count = self.stock_repo.mark_expired(&lot_ids)?;
        if expired_count > 0 {
            self.publish(BranchNotification {
                branch_id: branch_id.to_string(),
                kind: BranchNotificationKind::ExpiredToday,
                lot_count: expired_count,
                date: today,
                message: i18n::t_with_args(
                    "sweep.expired_today",
                    &[
                        ("branch", branch_id),
                        ("count", &expired_count.to_string()),
                        ("date", &today.to_string()),
                    ],
                ),
            });
        }

        Ok(BranchSweepOutcome {
            branch_id: branch_id.to_string(),
            lots_warned: warn_count,
            lots_expired: expired_count,
        })
    }

    /// 发布通知(fire-and-forget: 失败只记日志,不影响巡检)
    fn publish(&self, notification: BranchNotification) {
        let kind = notification.kind;
        let branch_id = notification.branch_id.clone();
        if let Err(e) = self.publisher.publish(notification) {
            tracing::warn!(
                branch_id = %branch_id,
                kind = kind.as_str(),
                error = %e,
                "站点通知发布失败"
            );
        }
    }
}
