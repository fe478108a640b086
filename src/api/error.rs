// ==========================================
// 高校学籍记录系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把引擎/仓储错误转换为带稳定机器码的用户可读错误
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::engine::error::{PolicyError, Rejection};
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 学籍规则错误
    // ==========================================
    /// 规则拒绝（选课重复、已通过、循环依赖等）
    #[error("业务规则违反 [{code}]: {reason}")]
    RuleViolation { code: String, reason: String },

    /// 前置条件不满足（未选课、课程未在学期开设、无下一学期等）
    #[error("前置条件不满足 [{code}]: {reason}")]
    PreconditionFailed { code: String, reason: String },

    /// 结构校验失败（带全部违规明细）
    #[error("数据验证失败: {reason}")]
    ValidationFailed {
        reason: String,
        violations: Vec<ValidationViolation>,
    },

    // ==========================================
    // 通用输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 稳定机器码
    pub fn code(&self) -> &str {
        match self {
            ApiError::RuleViolation { code, .. } | ApiError::PreconditionFailed { code, .. } => {
                code
            }
            ApiError::ValidationFailed { violations, .. } => violations
                .first()
                .map(|v| v.violation_type.as_str())
                .unwrap_or("VALIDATION_FAILED"),
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BusinessRuleViolation(_) => "CONSTRAINT_VIOLATION",
            ApiError::DatabaseError(_) | ApiError::DatabaseConnectionError(_) => "STORAGE_FAILURE",
            ApiError::InternalError(_) | ApiError::Other(_) => "INTERNAL_ERROR",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::ContactListCorrupt(msg) => {
                ApiError::InternalError(format!("联系方式数据损坏: {}", msg))
            }
        }
    }
}

// ==========================================
// 从 PolicyError 转换
// ==========================================
impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::Rejected(r) => ApiError::RuleViolation {
                code: r.code.as_str().to_string(),
                reason: r.message,
            },
            PolicyError::IllegalState(r) => ApiError::PreconditionFailed {
                code: r.code.as_str().to_string(),
                reason: r.message,
            },
            PolicyError::Invalid { entity, violations } => ApiError::ValidationFailed {
                reason: format!("{} 存在 {} 处校验错误", entity, violations.len()),
                violations: violations.into_iter().map(ValidationViolation::from).collect(),
            },
            PolicyError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            PolicyError::Repository(e) => ApiError::from(e),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// 违规类型（原因码，如 GRADE_OUT_OF_RANGE）
    pub violation_type: String,
    /// 字段路径（可选）
    pub field: Option<String>,
    /// 违规原因
    pub reason: String,
}

impl From<Rejection> for ValidationViolation {
    fn from(r: Rejection) -> Self {
        Self {
            violation_type: r.code.as_str().to_string(),
            field: r.field,
            reason: r.message,
        }
    }
}
