// ==========================================
// 高校学籍记录系统 - 规则引擎错误类型
// ==========================================
// 职责: 定义拒绝原因码、规则拒绝、前置条件失败、存储失败
// 红线: 所有拒绝必须携带稳定的机器码与可读原因
// ==========================================

use crate::domain::types::EntityKind;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ==========================================
// RejectionCode - 拒绝原因码
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    // ===== 先修关系 =====
    SelfPrerequisite,
    CourseMustExist,
    UnscheduledCourse,
    MinimumSemesterNotMet,
    PrerequisiteNotEarlier,
    CircularDependency,

    // ===== 选课 =====
    CourseNotInSemester,
    CostOutOfRange,
    AlreadyEnrolled,
    InsufficientSemesterCredits,
    AmountPaidReadOnly,

    // ===== 考试 =====
    NotEnrolled,
    AlreadyPassed,
    MaxAttemptsReached,
    GradeOutOfRange,
    MultipleExamsSameDay,

    // ===== 升级 =====
    NoEnrollments,
    NoNextSemester,
    InsufficientCredits,

    // ===== 通用结构校验 =====
    NotFound,
    Required,
    TooLong,
    InvalidFormat,
    OutOfRange,
    InvalidRange,
    MissingContact,
    DuplicateSemesterNumber,
    DuplicateGroupId,
}

impl RejectionCode {
    /// 稳定机器码
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionCode::SelfPrerequisite => "SELF_PREREQUISITE",
            RejectionCode::CourseMustExist => "COURSE_MUST_EXIST",
            RejectionCode::UnscheduledCourse => "UNSCHEDULED_COURSE",
            RejectionCode::MinimumSemesterNotMet => "MINIMUM_SEMESTER_NOT_MET",
            RejectionCode::PrerequisiteNotEarlier => "PREREQUISITE_NOT_EARLIER",
            RejectionCode::CircularDependency => "CIRCULAR_DEPENDENCY",
            RejectionCode::CourseNotInSemester => "COURSE_NOT_IN_SEMESTER",
            RejectionCode::CostOutOfRange => "COST_OUT_OF_RANGE",
            RejectionCode::AlreadyEnrolled => "ALREADY_ENROLLED",
            RejectionCode::InsufficientSemesterCredits => "INSUFFICIENT_SEMESTER_CREDITS",
            RejectionCode::AmountPaidReadOnly => "AMOUNT_PAID_READ_ONLY",
            RejectionCode::NotEnrolled => "NOT_ENROLLED",
            RejectionCode::AlreadyPassed => "ALREADY_PASSED",
            RejectionCode::MaxAttemptsReached => "MAX_ATTEMPTS_REACHED",
            RejectionCode::GradeOutOfRange => "GRADE_OUT_OF_RANGE",
            RejectionCode::MultipleExamsSameDay => "MULTIPLE_EXAMS_SAME_DAY",
            RejectionCode::NoEnrollments => "NO_ENROLLMENTS",
            RejectionCode::NoNextSemester => "NO_NEXT_SEMESTER",
            RejectionCode::InsufficientCredits => "INSUFFICIENT_CREDITS",
            RejectionCode::NotFound => "NOT_FOUND",
            RejectionCode::Required => "REQUIRED",
            RejectionCode::TooLong => "TOO_LONG",
            RejectionCode::InvalidFormat => "INVALID_FORMAT",
            RejectionCode::OutOfRange => "OUT_OF_RANGE",
            RejectionCode::InvalidRange => "INVALID_RANGE",
            RejectionCode::MissingContact => "MISSING_CONTACT",
            RejectionCode::DuplicateSemesterNumber => "DUPLICATE_SEMESTER_NUMBER",
            RejectionCode::DuplicateGroupId => "DUPLICATE_GROUP_ID",
        }
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Rejection - 单条拒绝原因
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    /// 原因码
    pub code: RejectionCode,
    /// 字段路径（结构校验时填写）
    pub field: Option<String>,
    /// 可读原因
    pub message: String,
}

impl Rejection {
    pub fn new(code: RejectionCode, message: impl Into<String>) -> Self {
        Self {
            code,
            field: None,
            message: message.into(),
        }
    }

    /// 附加字段路径
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}] {}: {}", self.code, field, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

// ==========================================
// ErrorCategory - 错误大类
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// 规则校验拒绝（可由调用方修正，不重试）
    Validation,
    /// 前置条件不满足（实体不存在或关系缺失）
    Precondition,
    /// 存储层失败
    Storage,
}

// ==========================================
// PolicyError - 规则引擎错误
// ==========================================
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("规则拒绝: {0}")]
    Rejected(Rejection),

    #[error("{entity} 结构校验失败: {}", join_violations(.violations))]
    Invalid {
        entity: EntityKind,
        violations: Vec<Rejection>,
    },

    #[error("{entity}(id={id})不存在")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("前置条件不满足: {0}")]
    IllegalState(Rejection),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn join_violations(violations: &[Rejection]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl PolicyError {
    pub fn rejected(code: RejectionCode, message: impl Into<String>) -> Self {
        PolicyError::Rejected(Rejection::new(code, message))
    }

    pub fn illegal_state(code: RejectionCode, message: impl Into<String>) -> Self {
        PolicyError::IllegalState(Rejection::new(code, message))
    }

    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        PolicyError::NotFound { entity, id }
    }

    /// 稳定机器码（Invalid 取首条违规的原因码）
    pub fn code(&self) -> &'static str {
        match self {
            PolicyError::Rejected(r) | PolicyError::IllegalState(r) => r.code.as_str(),
            PolicyError::Invalid { violations, .. } => violations
                .first()
                .map(|v| v.code.as_str())
                .unwrap_or("VALIDATION_FAILED"),
            PolicyError::NotFound { .. } => RejectionCode::NotFound.as_str(),
            PolicyError::Repository(_) => "STORAGE_FAILURE",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PolicyError::Rejected(_) | PolicyError::Invalid { .. } => ErrorCategory::Validation,
            PolicyError::NotFound { .. } | PolicyError::IllegalState(_) => {
                ErrorCategory::Precondition
            }
            PolicyError::Repository(_) => ErrorCategory::Storage,
        }
    }

    /// 是否由指定原因码引起（Invalid 检查全部违规）
    pub fn has_code(&self, code: RejectionCode) -> bool {
        match self {
            PolicyError::Rejected(r) | PolicyError::IllegalState(r) => r.code == code,
            PolicyError::Invalid { violations, .. } => violations.iter().any(|v| v.code == code),
            PolicyError::NotFound { .. } => code == RejectionCode::NotFound,
            PolicyError::Repository(_) => false,
        }
    }
}

/// Result 类型别名
pub type PolicyResult<T> = Result<T, PolicyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_screaming_snake() {
        assert_eq!(RejectionCode::SelfPrerequisite.as_str(), "SELF_PREREQUISITE");
        assert_eq!(
            serde_json::to_string(&RejectionCode::MultipleExamsSameDay).unwrap(),
            "\"MULTIPLE_EXAMS_SAME_DAY\""
        );
    }

    #[test]
    fn test_category_and_code() {
        let err = PolicyError::illegal_state(RejectionCode::NotEnrolled, "未选课");
        assert_eq!(err.category(), ErrorCategory::Precondition);
        assert_eq!(err.code(), "NOT_ENROLLED");

        let err = PolicyError::not_found(EntityKind::Student, 7);
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().contains("Student(id=7)"));

        let err = PolicyError::Invalid {
            entity: EntityKind::Exam,
            violations: vec![
                Rejection::new(RejectionCode::GradeOutOfRange, "成绩越界").with_field("grade"),
                Rejection::new(RejectionCode::MultipleExamsSameDay, "同日已有考试"),
            ],
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.code(), "GRADE_OUT_OF_RANGE");
        assert!(err.has_code(RejectionCode::MultipleExamsSameDay));
        assert!(err.to_string().contains("grade"));
    }
}
