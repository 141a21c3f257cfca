// ==========================================
// 公益物资调配平台 - 援助请求领域模型
// ==========================================
// 职责: 定义援助请求、援助物品及匹配候选视图
// 说明: 紧急等级/援助期均为派生值,读取时依据注入的 now 重新计算
// ==========================================

use crate::domain::schedule::ScheduledWindow;
use crate::domain::types::{AidItemStatus, UrgencyTier};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// AidRequest - 援助请求
// ==========================================
// 受助方提交的请求,携带一组可接收时段(顺序无意义)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AidRequest {
    // ===== 主键 =====
    pub request_id: String,

    // ===== 归属 =====
    pub beneficiary_id: Option<String>, // 受助方ID (外部身份体系)

    // ===== 日程 =====
    pub windows: Vec<ScheduledWindow>, // 可接收时段集合

    // ===== 审计 =====
    pub created_at: NaiveDateTime,
}

// ==========================================
// AidItem - 援助物品条目
// ==========================================
// 请求下的单个物品需求;状态 ACCEPTED 时参与匹配
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AidItem {
    // ===== 主键 =====
    pub aid_item_id: String,

    // ===== 归属 =====
    pub request_id: String, // 所属援助请求
    pub item_id: String,    // 物品模板ID

    // ===== 需求 =====
    pub quantity: f64, // 需求数量

    // ===== 状态 =====
    pub status: AidItemStatus,

    // ===== 审计 =====
    pub created_at: NaiveDateTime,
}

// ==========================================
// AidItemCandidate - 匹配候选视图
// ==========================================
// 仓储层组装的联查视图: 物品 + 模板名称 + 属性值 + 所属请求时段
// 匹配引擎只读取该视图,不回查数据库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AidItemCandidate {
    pub item: AidItem,
    pub template_name: String,      // 物品模板名称(打分用)
    pub attributes: Vec<String>,    // 属性值列表(打分用,如规格/口味/尺码)
    pub windows: Vec<ScheduledWindow>, // 所属请求的时段集合
}

// ==========================================
// RankedAidItem - 匹配结果条目
// ==========================================
// 搜索通过后的派生结果;紧急等级与援助期截止均按调用时刻计算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedAidItem {
    pub item: AidItem,
    pub template_name: String,
    pub urgency: UrgencyTier, // 派生紧急等级
    /// 援助期起点: 最早未开始窗口的开始时刻
    /// (进行中的窗口不计入起点,但仍计入截止)
    pub aid_period_start: Option<NaiveDateTime>,
    /// 援助期截止: 最后一个未结束窗口的结束时刻
    pub aid_period_end: Option<NaiveDateTime>,
    pub score: i32, // 关键词累计得分(无查询词时为0)
}
