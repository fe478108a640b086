// ==========================================
// 高校学籍记录系统 - 领域类型定义
// ==========================================
// 职责: 成绩口径常量、实体类别枚举、金额比较工具
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 成绩口径 (1-10 分制)
// ==========================================
/// 最低有效成绩
pub const MIN_GRADE: i32 = 1;
/// 最高有效成绩
pub const MAX_GRADE: i32 = 10;
/// 及格线（成绩 ≥ 5 视为通过）
pub const PASSING_GRADE: i32 = 5;

/// 允许设置先修关系的最小学期序号
pub const MIN_PREREQUISITE_SEMESTER: i32 = 2;

/// 金额比较容差（金额以 f64 存储）
pub const MONEY_EPSILON: f64 = 1e-9;

/// 判断成绩是否及格
pub fn is_passing_grade(grade: i32) -> bool {
    grade >= PASSING_GRADE
}

/// 判断成绩是否在有效范围内
pub fn is_valid_grade(grade: i32) -> bool {
    (MIN_GRADE..=MAX_GRADE).contains(&grade)
}

// ==========================================
// 实体类别 (Entity Kind)
// ==========================================
// 用于错误信息中的实体定位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Student,
    Course,
    Semester,
    CourseSemester,
    Enrollment,
    Exam,
    CoursePrerequisite,
    CourseDiscount,
}

impl EntityKind {
    /// 对应的数据库表名
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Student => "student",
            EntityKind::Course => "course",
            EntityKind::Semester => "semester",
            EntityKind::CourseSemester => "course_semester",
            EntityKind::Enrollment => "enrollment",
            EntityKind::Exam => "exam",
            EntityKind::CoursePrerequisite => "course_prerequisite",
            EntityKind::CourseDiscount => "course_discount",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Student => write!(f, "Student"),
            EntityKind::Course => write!(f, "Course"),
            EntityKind::Semester => write!(f, "Semester"),
            EntityKind::CourseSemester => write!(f, "CourseSemester"),
            EntityKind::Enrollment => write!(f, "Enrollment"),
            EntityKind::Exam => write!(f, "Exam"),
            EntityKind::CoursePrerequisite => write!(f, "CoursePrerequisite"),
            EntityKind::CourseDiscount => write!(f, "CourseDiscount"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_bounds() {
        assert!(is_valid_grade(1));
        assert!(is_valid_grade(10));
        assert!(!is_valid_grade(0));
        assert!(!is_valid_grade(11));
    }

    #[test]
    fn test_passing_grade_threshold() {
        assert!(!is_passing_grade(4));
        assert!(is_passing_grade(5));
        assert!(is_passing_grade(10));
    }

    #[test]
    fn test_entity_kind_serialization() {
        let json = serde_json::to_string(&EntityKind::CoursePrerequisite).unwrap();
        assert_eq!(json, "\"COURSE_PREREQUISITE\"");
        assert_eq!(EntityKind::Enrollment.table_name(), "enrollment");
    }
}
