// ==========================================
// 公益物资调配平台 - 援助物品搜索 API
// ==========================================
// 职责: 解析搜索入参(紧急等级/排序键/分页),
//       取回候选集并委托匹配引擎
// 架构: API 层 → Repository 层(取数) + Engine 层(打分排序)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::aid::RankedAidItem;
use crate::domain::availability::PagedResult;
use crate::domain::types::{SortDirection, UrgencyTier};
use crate::engine::matching::{MatchingEngine, SearchParams, SortKey};
use crate::repository::aid_repo::AidRequestRepository;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// 默认页码
const DEFAULT_PAGE: usize = 1;

/// 默认页大小
const DEFAULT_PAGE_SIZE: usize = 10;

// ==========================================
// 搜索入参 DTO
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchAidItemsRequest {
    pub query: Option<String>,          // 关键词
    pub urgency_filter: Option<String>, // "VERY_URGENT" / "URGENT" / "NOT_URGENT" / "EXPIRED"
    pub sort_key: Option<String>,       // "TEMPLATE_NAME" / "QUANTITY" / "CREATED_AT" / "AID_PERIOD_END"
    pub sort_dir: Option<String>,       // "ASC" / "DESC"
    pub page: Option<usize>,            // 缺省 1
    pub page_size: Option<usize>,       // 缺省 10
}

// ==========================================
// AidSearchApi - 援助物品搜索 API
// ==========================================
pub struct AidSearchApi {
    aid_repo: Arc<AidRequestRepository>,
    config: Arc<ConfigManager>,
    engine: MatchingEngine,
}

impl AidSearchApi {
    /// 创建新的搜索 API 实例
    pub fn new(aid_repo: Arc<AidRequestRepository>, config: Arc<ConfigManager>) -> Self {
        Self {
            aid_repo,
            config,
            engine: MatchingEngine::new(),
        }
    }

    /// 搜索可匹配的援助物品
    ///
    /// # 返回
    /// - Err(InvalidSortField): 排序键不在支持集合内
    /// - Err(InvalidInput): 紧急等级/排序方向/分页参数非法
    #[instrument(skip(self, request))]
    pub async fn search_eligible_aid_items(
        &self,
        request: &SearchAidItemsRequest,
        now: NaiveDateTime,
    ) -> ApiResult<PagedResult<RankedAidItem>> {
        let params = self.parse_params(request)?;

        let very_urgent_days = self
            .config
            .get_very_urgent_days()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let urgent_days = self
            .config
            .get_urgent_days()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let candidates = self.aid_repo.list_accepted_candidates()?;
        Ok(self
            .engine
            .search(candidates, &params, now, very_urgent_days, urgent_days))
    }

    /// 入参解析与默认值填充
    fn parse_params(&self, request: &SearchAidItemsRequest) -> ApiResult<SearchParams> {
        let urgency_filter = match &request.urgency_filter {
            None => None,
            Some(raw) => Some(UrgencyTier::from_code(raw).ok_or_else(|| {
                ApiError::InvalidInput(format!("未知紧急等级: {}", raw))
            })?),
        };

        let sort_key = match &request.sort_key {
            None => None,
            Some(raw) => {
                Some(SortKey::from_code(raw).ok_or_else(|| ApiError::InvalidSortField(raw.clone()))?)
            }
        };

        let sort_dir = match &request.sort_dir {
            None => SortDirection::Asc,
            Some(raw) => SortDirection::from_code(raw)
                .ok_or_else(|| ApiError::InvalidInput(format!("未知排序方向: {}", raw)))?,
        };

        let page = request.page.unwrap_or(DEFAULT_PAGE);
        let page_size = request.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 || page_size == 0 {
            return Err(ApiError::InvalidInput(format!(
                "分页参数必须为正: page={}, page_size={}",
                page, page_size
            )));
        }

        Ok(SearchParams {
            query: request.query.clone(),
            urgency_filter,
            sort_key,
            sort_dir,
            page,
            page_size,
        })
    }
}
