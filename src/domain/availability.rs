// ==========================================
// 公益物资调配平台 - 可用量计算视图
// ==========================================
// 职责: 定义可用量计算结果与分页容器
// 说明: 均为派生值,不落库,不跨请求缓存
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// AvailabilityResult - 可用量计算结果
// ==========================================
// 不变式: available_quantity = max(0, 有效库存 - 在途预留)
// window_end = None 表示该日程已无未结束窗口(可用量按0返回)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub item_id: String,                     // 物品模板ID
    pub available_quantity: f64,             // 可保障数量 (≥0)
    pub window_end: Option<NaiveDateTime>,   // 计算所依据的窗口截止时刻
}

impl AvailabilityResult {
    /// 无未结束窗口时的零可用量结果
    pub fn no_upcoming_window(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            available_quantity: 0.0,
            window_end: None,
        }
    }

    /// 日程是否仍有未结束窗口
    pub fn has_upcoming_window(&self) -> bool {
        self.window_end.is_some()
    }
}

// ==========================================
// MatchScore - 关键词匹配得分(过程值)
// ==========================================
// 搜索过程中的临时评分,排序后即丢弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScore {
    pub aid_item_id: String,
    pub score: i32,
}

// ==========================================
// PagedResult - 分页容器
// ==========================================
// 超出末尾的页返回空页,不报错
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,     // 当前页条目
    pub total: usize,      // 过滤后的候选总数
    pub page: usize,       // 页码 (从1起)
    pub page_size: usize,  // 页大小
}

impl<T> PagedResult<T> {
    /// 对已过滤排序的候选集切页
    ///
    /// # 规则
    /// - skip = (page - 1) * page_size
    /// - 越界页返回空页
    pub fn paginate(all: Vec<T>, page: usize, page_size: usize) -> Self {
        let total = all.len();
        let skip = page.saturating_sub(1).saturating_mul(page_size);
        let items = all.into_iter().skip(skip).take(page_size).collect();
        Self {
            items,
            total,
            page,
            page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_middle_page() {
        let data: Vec<i32> = (1..=25).collect();
        let page = PagedResult::paginate(data, 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.total, 25);
    }

    #[test]
    fn test_paginate_out_of_range_is_empty() {
        let data: Vec<i32> = (1..=25).collect();
        let page = PagedResult::paginate(data, 4, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 25);
    }

    #[test]
    fn test_no_upcoming_window_result() {
        let r = AvailabilityResult::no_upcoming_window("item-1");
        assert_eq!(r.available_quantity, 0.0);
        assert!(!r.has_upcoming_window());
    }
}
