// ==========================================
// 高校学籍记录系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod course_repo;
pub mod discount_repo;
pub mod enrollment_repo;
pub mod error;
pub mod exam_repo;
pub mod prerequisite_repo;
pub mod semester_repo;
pub mod student_repo;
pub mod traits;

// 重导出核心仓储
pub use course_repo::{SqliteCourseRepository, SqliteCourseSemesterRepository};
pub use discount_repo::SqliteDiscountRepository;
pub use enrollment_repo::SqliteEnrollmentRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use exam_repo::SqliteExamRepository;
pub use prerequisite_repo::SqlitePrerequisiteRepository;
pub use semester_repo::SqliteSemesterRepository;
pub use student_repo::SqliteStudentRepository;
pub use traits::{
    CourseDiscountRepository, CoursePrerequisiteRepository, CourseRepository,
    CourseSemesterRepository, EnrollmentRepository, EntityRepository, ExamRepository,
    SemesterRepository, StudentRepository,
};
