// ==========================================
// 高校学籍记录系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、纯计算规则
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod course;
pub mod discount;
pub mod enrollment;
pub mod exam;
pub mod prerequisite;
pub mod semester;
pub mod student;
pub mod types;

// 重导出核心类型
pub use course::{Course, CourseSemester};
pub use discount::CourseDiscount;
pub use enrollment::Enrollment;
pub use exam::{Exam, ExamHistory};
pub use prerequisite::CoursePrerequisite;
pub use semester::Semester;
pub use student::Student;
pub use types::{EntityKind, MAX_GRADE, MIN_GRADE, PASSING_GRADE};
