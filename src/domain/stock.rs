// ==========================================
// 公益物资调配平台 - 库存批次领域模型
// ==========================================
// 红线: 批次数量不得为负;批次只增不删,过期批次保留为历史
// ==========================================

use crate::domain::types::LotStatus;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// StockLot - 库存批次
// ==========================================
// 一个批次 = 某站点某物品的一批带统一保质期的库存
// 由捐赠入库创建;仅过期巡检可将状态置为 EXPIRED
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLot {
    // ===== 主键 =====
    pub lot_id: String, // 批次ID (uuid)

    // ===== 归属 =====
    pub item_id: String,   // 物品模板ID
    pub branch_id: String, // 站点ID

    // ===== 数量与期限 =====
    pub quantity: f64,             // 剩余数量 (≥0)
    pub expiration_date: NaiveDate, // 过期日期 (按日粒度)

    // ===== 状态 =====
    pub status: LotStatus, // VALID / EXPIRED

    // ===== 审计 =====
    pub created_date: NaiveDate, // 入库日期
}

impl StockLot {
    /// 创建新的有效批次(捐赠入库)
    pub fn new_valid(
        item_id: impl Into<String>,
        branch_id: impl Into<String>,
        quantity: f64,
        expiration_date: NaiveDate,
        created_date: NaiveDate,
    ) -> Self {
        Self {
            lot_id: Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            branch_id: branch_id.into(),
            quantity,
            expiration_date,
            status: LotStatus::Valid,
            created_date,
        }
    }

    /// 批次在指定截止日后是否仍可使用
    ///
    /// # 规则
    /// - 过期日期须不早于 cutoff + margin_days (运输安全边际)
    pub fn usable_from(&self, cutoff: NaiveDate, margin_days: i64) -> bool {
        self.status == LotStatus::Valid
            && self.expiration_date >= cutoff + chrono::Duration::days(margin_days)
    }
}

// ==========================================
// ItemTemplate - 物品模板
// ==========================================
// 平台物品目录条目;匹配引擎按模板名称做关键词打分
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub item_id: String,          // 物品模板ID
    pub name: String,             // 物品名称
    pub category: Option<String>, // 分类 (食品/衣物/药品...)
}

impl ItemTemplate {
    pub fn new(item_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
            category: None,
        }
    }
}

/// 当前日期(UTC),仅供非引擎路径使用
///
/// 红线: 引擎计算一律显式注入 now/today,不在内部取时钟
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_from_margin() {
        let lot = StockLot::new_valid(
            "item-1",
            "branch-1",
            5.0,
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );
        // cutoff 06-09 + 1天 = 06-10 ≤ 过期日 → 可用
        assert!(lot.usable_from(NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(), 1));
        // cutoff 06-10 + 1天 = 06-11 > 过期日 → 不可用
        assert!(!lot.usable_from(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), 1));
    }

    #[test]
    fn test_expired_lot_never_usable() {
        let mut lot = StockLot::new_valid(
            "item-1",
            "branch-1",
            5.0,
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );
        lot.status = LotStatus::Expired;
        assert!(!lot.usable_from(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), 1));
    }
}
