// ==========================================
// 高校学籍记录系统 - 仓储 Trait 定义
// ==========================================
// 职责: 定义规则引擎所需的数据访问接口（不包含实现）
// 红线: Repository 不含业务规则，只做数据 CRUD 与定向查询
// 实现者: repository::*_repo（rusqlite）；测试中可替换为内存实现
// ==========================================

use crate::domain::{
    Course, CourseDiscount, CoursePrerequisite, CourseSemester, Enrollment, Exam, Semester,
    Student,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// EntityRepository - 通用 CRUD 接口
// ==========================================
#[async_trait]
pub trait EntityRepository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// 按主键查询
    ///
    /// # 返回
    /// - Ok(Some(T)): 找到记录
    /// - Ok(None): 未找到
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<T>>;

    /// 查询全部记录（按主键升序）
    async fn get_all(&self) -> RepositoryResult<Vec<T>>;

    /// 插入记录（忽略传入的 id）
    ///
    /// # 返回
    /// - Ok(i64): 数据库分配的主键
    async fn add(&self, entity: &T) -> RepositoryResult<i64>;

    /// 按主键更新记录
    ///
    /// # 错误
    /// - RepositoryError::NotFound: 记录不存在
    async fn update(&self, entity: &T) -> RepositoryResult<()>;

    /// 按主键删除记录（不存在时仅告警）
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

// ==========================================
// 各实体仓储接口
// ==========================================

pub trait StudentRepository: EntityRepository<Student> {}

pub trait CourseRepository: EntityRepository<Course> {}

#[async_trait]
pub trait SemesterRepository: EntityRepository<Semester> {
    /// 按学期序号查询
    async fn get_by_number(&self, number: i32) -> RepositoryResult<Option<Semester>>;
}

#[async_trait]
pub trait CourseSemesterRepository: EntityRepository<CourseSemester> {
    /// 查询课程的全部开设记录
    async fn get_by_course(&self, course_id: i64) -> RepositoryResult<Vec<CourseSemester>>;
}

pub trait CoursePrerequisiteRepository: EntityRepository<CoursePrerequisite> {}

#[async_trait]
pub trait EnrollmentRepository: EntityRepository<Enrollment> {
    /// 查询学生的全部选课（按主键升序）
    async fn get_by_student(&self, student_id: i64) -> RepositoryResult<Vec<Enrollment>>;
}

#[async_trait]
pub trait ExamRepository: EntityRepository<Exam> {
    /// 查询学生的全部考试（按日期升序）
    async fn get_by_student(&self, student_id: i64) -> RepositoryResult<Vec<Exam>>;
}

#[async_trait]
pub trait CourseDiscountRepository: EntityRepository<CourseDiscount> {
    /// 折扣组是否已存在
    async fn exists_group_id(&self, group_id: i64) -> RepositoryResult<bool>;

    /// 查询折扣组内的全部课程ID
    async fn get_course_ids_by_group_id(&self, group_id: i64) -> RepositoryResult<Vec<i64>>;
}
