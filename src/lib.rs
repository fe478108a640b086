// ==========================================
// 高校学籍记录系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 教务规则引擎（先修图、选课准入、考试重修、升学期、组合折扣）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 学籍政策规则
pub mod engine;

// 配置层 - 政策参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/表结构）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Course, CourseDiscount, CoursePrerequisite, CourseSemester, Enrollment, EntityKind, Exam,
    ExamHistory, Semester, Student,
};

// 引擎
pub use engine::{
    DiscountEngine, EnrollmentEngine, ExamAttemptEngine, PolicyError, PolicyRepositories,
    PrerequisiteValidator, PromotionEngine, RecordValidator, Rejection, RejectionCode,
};

// API
pub use api::{ApiError, CourseApi, EnrollmentApi, ExamApi, SemesterApi, StudentApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "高校学籍记录系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
