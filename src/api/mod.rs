// ==========================================
// 高校学籍记录系统 - API 层
// ==========================================
// 职责: 提供记录管理与学籍政策操作的业务 API，错误统一转换为 ApiError
// ==========================================

pub mod course_api;
pub mod enrollment_api;
pub mod error;
pub mod exam_api;
pub mod semester_api;
pub mod student_api;

// 重导出核心类型
pub use course_api::CourseApi;
pub use enrollment_api::EnrollmentApi;
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use exam_api::ExamApi;
pub use semester_api::SemesterApi;
pub use student_api::StudentApi;
