// ==========================================
// 公益物资调配平台 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型,转换Repository错误为面向调用方的错误分类
// 分类约定:
// - 校验类/可用量不足 → 调用方可自行纠正或重试("bad request"类)
// - 基础设施类 → 对外只给通用"稍后重试",不泄露内部细节
// ==========================================

use crate::domain::schedule::ScheduleError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 校验错误(拒绝请求,不自动重试)
    // ==========================================
    #[error("时间窗口格式错误: {0}")]
    MalformedSchedule(String),

    #[error("不支持的排序字段: {0}")]
    InvalidSortField(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 业务状态
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("可用量不足: item_id={item_id}, 请求 {requested}, 可保障 {available}")]
    InsufficientAvailability {
        item_id: String,
        requested: f64,
        available: f64,
    },

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 基础设施错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 是否属于调用方可纠正/可重试的错误类
    ///
    /// true → "bad request"类(修正入参或重新查询后重试)
    /// false → 基础设施故障,对外给通用"稍后重试"
    pub fn is_client_correctable(&self) -> bool {
        matches!(
            self,
            ApiError::MalformedSchedule(_)
                | ApiError::InvalidSortField(_)
                | ApiError::InvalidInput(_)
                | ApiError::NotFound(_)
                | ApiError::InsufficientAvailability { .. }
                | ApiError::BusinessRuleViolation(_)
        )
    }
}

// Repository错误 → API错误
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={})", entity, id))
            }
            RepositoryError::InsufficientAvailability {
                item_id,
                requested,
                available,
                ..
            } => ApiError::InsufficientAvailability {
                item_id,
                requested,
                available,
            },
            RepositoryError::BusinessRuleViolation(msg) => ApiError::BusinessRuleViolation(msg),
            RepositoryError::InvalidStateTransition { from, to } => {
                ApiError::BusinessRuleViolation(format!("无效的状态转换: {} → {}", from, to))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg) => ApiError::DatabaseError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

// 时间窗口解析错误 → API错误
impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        ApiError::MalformedSchedule(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_correctable_classification() {
        assert!(ApiError::MalformedSchedule("x".into()).is_client_correctable());
        assert!(ApiError::InvalidSortField("x".into()).is_client_correctable());
        assert!(ApiError::InsufficientAvailability {
            item_id: "i".into(),
            requested: 6.0,
            available: 4.0
        }
        .is_client_correctable());
        assert!(!ApiError::DatabaseError("x".into()).is_client_correctable());
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::InsufficientAvailability {
            item_id: "i".into(),
            branch_id: "b".into(),
            requested: 6.0,
            available: 4.0,
        }
        .into();
        assert!(matches!(err, ApiError::InsufficientAvailability { .. }));

        let err: ApiError = RepositoryError::DatabaseQueryError("boom".into()).into();
        assert!(matches!(err, ApiError::DatabaseError(_)));
    }
}
