// ==========================================
// 公益物资调配平台 - 匹配排序引擎
// ==========================================
// 职责: 过滤可匹配援助物品 + 关键词打分 + 排序 + 分页
// 红线: 无状态引擎,只处理已取回的候选集,不回查数据库
// ==========================================
// 排序键是显式枚举的有限集合,逐键绑定具名比较函数;
// 集合之外的键按校验错误拒绝,不做运行时字段反射
// ==========================================

use crate::domain::aid::{AidItemCandidate, RankedAidItem};
use crate::domain::availability::{MatchScore, PagedResult};
use crate::domain::types::{SortDirection, UrgencyTier};
use crate::engine::time_window::TimeWindowResolver;
use crate::engine::urgency::UrgencyEngine;
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use tracing::instrument;

// ==========================================
// SortKey - 支持的排序键
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// 物品模板名称
    TemplateName,
    /// 需求数量
    Quantity,
    /// 条目创建时间
    CreatedAt,
    /// 援助期截止(派生值: 最后一个未结束窗口的结束时刻)
    AidPeriodEnd,
}

impl SortKey {
    /// 从字符串标识解析;集合之外的键返回 None,由调用方拒绝
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TEMPLATE_NAME" => Some(SortKey::TemplateName),
            "QUANTITY" => Some(SortKey::Quantity),
            "CREATED_AT" => Some(SortKey::CreatedAt),
            "AID_PERIOD_END" => Some(SortKey::AidPeriodEnd),
            _ => None,
        }
    }
}

// ==========================================
// SearchParams - 搜索参数
// ==========================================
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub query: Option<String>,              // 关键词(空白分词)
    pub urgency_filter: Option<UrgencyTier>, // 紧急等级过滤
    pub sort_key: Option<SortKey>,          // 显式排序键(优先于相关度序)
    pub sort_dir: SortDirection,            // 排序方向
    pub page: usize,                        // 页码(从1起)
    pub page_size: usize,                   // 页大小
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            query: None,
            urgency_filter: None,
            sort_key: None,
            sort_dir: SortDirection::Asc,
            page: 1,
            page_size: 10,
        }
    }
}

/// 模板名称命中一个词的得分
const NAME_HIT_SCORE: i32 = 5;

/// 属性值命中一个词的追加得分(每个属性值各计一次)
const ATTRIBUTE_HIT_SCORE: i32 = 2;

// ==========================================
// MatchingEngine - 匹配排序引擎
// ==========================================
pub struct MatchingEngine {
    urgency: UrgencyEngine,
}

impl MatchingEngine {
    /// 创建新的匹配排序引擎
    pub fn new() -> Self {
        Self {
            urgency: UrgencyEngine::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 搜索可匹配的援助物品
    ///
    /// 处理顺序:
    /// 1) 资格过滤: 物品已受理 且 所属请求仍有未结束窗口
    /// 2) 紧急等级过滤: 未指定时默认排除 EXPIRED
    /// 3) 关键词打分: 有查询词时,零分条目整体剔除
    /// 4) 排序: 显式排序键优先;否则有查询词按得分降序,无则保持取回顺序
    /// 5) 分页: 越界页返回空页
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    pub fn search(
        &self,
        candidates: Vec<AidItemCandidate>,
        params: &SearchParams,
        now: NaiveDateTime,
        very_urgent_days: f64,
        urgent_days: f64,
    ) -> PagedResult<RankedAidItem> {
        let terms = Self::split_terms(params.query.as_deref());

        let mut ranked: Vec<RankedAidItem> = Vec::new();
        for candidate in candidates {
            // 资格过滤
            if !candidate.item.status.is_open() {
                continue;
            }
            let (tier, deadline) = self.urgency.classify_with_deadline(
                &candidate.windows,
                now,
                very_urgent_days,
                urgent_days,
            );
            if deadline.is_none() {
                continue;
            }

            // 紧急等级过滤
            match params.urgency_filter {
                Some(filter) if tier != filter => continue,
                None if !tier.is_actionable() => continue,
                _ => {}
            }

            // 关键词打分
            let score = Self::score_candidate(&candidate, &terms);
            if !terms.is_empty() && score.score == 0 {
                continue;
            }

            let aid_period_start = TimeWindowResolver::earliest_upcoming(&candidate.windows, now)
                .map(|w| w.start_instant());
            ranked.push(RankedAidItem {
                template_name: candidate.template_name,
                urgency: tier,
                aid_period_start,
                aid_period_end: deadline,
                score: score.score,
                item: candidate.item,
            });
        }

        // 排序: 显式排序键 > 相关度序 > 取回顺序
        if let Some(key) = params.sort_key {
            ranked.sort_by(|a, b| {
                let ordering = Self::compare_by_key(a, b, key);
                match params.sort_dir {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        } else if !terms.is_empty() {
            ranked.sort_by(|a, b| b.score.cmp(&a.score));
        }

        PagedResult::paginate(ranked, params.page, params.page_size)
    }

    // ==========================================
    // 打分
    // ==========================================

    /// 关键词累计得分
    ///
    /// # 规则(逐词累计)
    /// - 模板名称含该词(大小写不敏感子串) → +5
    /// - 每个属性值含该词 → 各 +2
    fn score_candidate(candidate: &AidItemCandidate, terms: &[String]) -> MatchScore {
        let name = candidate.template_name.to_lowercase();
        let attributes: Vec<String> = candidate
            .attributes
            .iter()
            .map(|a| a.to_lowercase())
            .collect();

        let mut score = 0;
        for term in terms {
            if name.contains(term.as_str()) {
                score += NAME_HIT_SCORE;
            }
            for attribute in &attributes {
                if attribute.contains(term.as_str()) {
                    score += ATTRIBUTE_HIT_SCORE;
                }
            }
        }

        MatchScore {
            aid_item_id: candidate.item.aid_item_id.clone(),
            score,
        }
    }

    /// 查询词分词(空白切分,统一小写;纯空白视同无查询)
    fn split_terms(query: Option<&str>) -> Vec<String> {
        query
            .map(|q| q.split_whitespace().map(|t| t.to_lowercase()).collect())
            .unwrap_or_default()
    }

    // ==========================================
    // 比较方法
    // ==========================================

    /// 按排序键比较两个条目(升序语义,方向由调用方翻转)
    fn compare_by_key(a: &RankedAidItem, b: &RankedAidItem, key: SortKey) -> Ordering {
        match key {
            SortKey::TemplateName => a.template_name.cmp(&b.template_name),
            SortKey::Quantity => a
                .item
                .quantity
                .partial_cmp(&b.item.quantity)
                .unwrap_or(Ordering::Equal),
            SortKey::CreatedAt => a.item.created_at.cmp(&b.item.created_at),
            SortKey::AidPeriodEnd => a.aid_period_end.cmp(&b.aid_period_end),
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}
