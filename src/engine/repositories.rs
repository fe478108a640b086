// ==========================================
// 高校学籍记录系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合规则引擎所需的所有 Repository
// 目标: 减少各引擎构造函数参数数量，便于测试时替换存储实现
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{
    CourseDiscountRepository, CoursePrerequisiteRepository, CourseRepository,
    CourseSemesterRepository, EnrollmentRepository, ExamRepository, SemesterRepository,
    SqliteCourseRepository, SqliteCourseSemesterRepository, SqliteDiscountRepository,
    SqliteEnrollmentRepository, SqliteExamRepository, SqlitePrerequisiteRepository,
    SqliteSemesterRepository, SqliteStudentRepository, StudentRepository,
};

/// 学籍规则引擎仓储集合
///
/// 聚合规则引擎所需的所有 Repository（trait 对象），简化依赖注入。
///
/// # 包含的仓储
/// - `students` / `courses` / `semesters`: 主数据
/// - `course_semesters`: 课程开设学期
/// - `prerequisites`: 先修关系边
/// - `enrollments` / `exams`: 选课与考试记录
/// - `discounts`: 课程组合折扣
#[derive(Clone)]
pub struct PolicyRepositories {
    pub students: Arc<dyn StudentRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub semesters: Arc<dyn SemesterRepository>,
    pub course_semesters: Arc<dyn CourseSemesterRepository>,
    pub prerequisites: Arc<dyn CoursePrerequisiteRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub exams: Arc<dyn ExamRepository>,
    pub discounts: Arc<dyn CourseDiscountRepository>,
}

impl PolicyRepositories {
    /// 基于同一个 SQLite 连接构建全部仓储
    pub fn sqlite(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            students: Arc::new(SqliteStudentRepository::from_connection(conn.clone())),
            courses: Arc::new(SqliteCourseRepository::from_connection(conn.clone())),
            semesters: Arc::new(SqliteSemesterRepository::from_connection(conn.clone())),
            course_semesters: Arc::new(SqliteCourseSemesterRepository::from_connection(
                conn.clone(),
            )),
            prerequisites: Arc::new(SqlitePrerequisiteRepository::from_connection(conn.clone())),
            enrollments: Arc::new(SqliteEnrollmentRepository::from_connection(conn.clone())),
            exams: Arc::new(SqliteExamRepository::from_connection(conn.clone())),
            discounts: Arc::new(SqliteDiscountRepository::from_connection(conn)),
        }
    }
}

// 注: PolicyRepositories 作为简单的聚合结构体，其正确性由
// 集成测试 (tests/repository_integration_test.rs) 与各引擎测试来验证。
