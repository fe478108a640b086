// ==========================================
// 高校学籍记录系统 - 课程管理 API
// ==========================================
// 职责: 课程 CRUD、开设学期、先修关系、组合折扣维护
// 红线: 先修关系必须经 PrerequisiteValidator 校验通过后才能写库
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::api::student_api::require_id;
use crate::domain::{Course, CourseDiscount, CoursePrerequisite, CourseSemester};
use crate::engine::{PolicyRepositories, PrerequisiteValidator, RecordValidator};
use std::collections::BTreeSet;

// ==========================================
// CourseApi - 课程管理 API
// ==========================================

/// 课程管理API
///
/// 职责：
/// 1. 课程维护（费用区间校验）
/// 2. 课程开设学期维护
/// 3. 先修关系维护（图校验）
/// 4. 组合折扣组维护
pub struct CourseApi {
    repos: PolicyRepositories,
    validator: RecordValidator,
    prerequisites: PrerequisiteValidator,
}

impl CourseApi {
    /// 创建新的CourseApi实例
    pub fn new(repos: PolicyRepositories) -> Self {
        Self {
            validator: RecordValidator::new(repos.clone()),
            prerequisites: PrerequisiteValidator::new(repos.clone()),
            repos,
        }
    }

    // ==========================================
    // 课程
    // ==========================================

    pub async fn create_course(&self, mut course: Course) -> ApiResult<Course> {
        self.validator.validate_course(&course).await?;
        course.id = self.repos.courses.add(&course).await?;
        tracing::info!(course_id = course.id, name = %course.name, "课程已创建");
        Ok(course)
    }

    pub async fn get_course(&self, course_id: i64) -> ApiResult<Option<Course>> {
        Ok(self.repos.courses.get_by_id(course_id).await?)
    }

    pub async fn list_courses(&self) -> ApiResult<Vec<Course>> {
        Ok(self.repos.courses.get_all().await?)
    }

    pub async fn update_course(&self, course: &Course) -> ApiResult<()> {
        require_id(course.id, "课程")?;
        self.validator.validate_course(course).await?;
        self.repos.courses.update(course).await?;
        tracing::info!(course_id = course.id, cost = course.cost, "课程已更新");
        Ok(())
    }

    pub async fn delete_course(&self, course_id: i64) -> ApiResult<()> {
        self.repos.courses.delete(course_id).await?;
        tracing::info!(course_id, "课程已删除");
        Ok(())
    }

    // ==========================================
    // 开设学期
    // ==========================================

    /// 在某学期开设课程
    pub async fn offer_in_semester(
        &self,
        course_id: i64,
        semester_id: i64,
    ) -> ApiResult<CourseSemester> {
        let mut offering = CourseSemester {
            id: 0,
            course_id,
            semester_id,
        };
        self.validator.validate_course_semester(&offering).await?;
        offering.id = self.repos.course_semesters.add(&offering).await?;
        tracing::info!(course_id, semester_id, offering_id = offering.id, "课程已开设");
        Ok(offering)
    }

    pub async fn list_offerings(&self, course_id: i64) -> ApiResult<Vec<CourseSemester>> {
        Ok(self.repos.course_semesters.get_by_course(course_id).await?)
    }

    /// 撤销开设记录
    pub async fn withdraw_offering(&self, offering_id: i64) -> ApiResult<()> {
        self.repos.course_semesters.delete(offering_id).await?;
        tracing::info!(offering_id, "开设记录已撤销");
        Ok(())
    }

    // ==========================================
    // 先修关系
    // ==========================================

    /// 新增先修关系 course_id → prereq_id
    pub async fn add_prerequisite(
        &self,
        course_id: i64,
        prereq_id: i64,
        min_grade: i32,
    ) -> ApiResult<CoursePrerequisite> {
        let mut edge = CoursePrerequisite::new(course_id, prereq_id, min_grade);
        self.prerequisites.validate(&edge).await?;
        edge.id = self.repos.prerequisites.add(&edge).await?;
        tracing::info!(edge_id = edge.id, course_id, prereq_id, "先修关系已添加");
        Ok(edge)
    }

    /// 修改先修关系（环检测时以新边替换原边）
    pub async fn update_prerequisite(&self, edge: &CoursePrerequisite) -> ApiResult<()> {
        require_id(edge.id, "先修关系")?;
        self.prerequisites.validate(edge).await?;
        self.repos.prerequisites.update(edge).await?;
        tracing::info!(edge_id = edge.id, "先修关系已更新");
        Ok(())
    }

    pub async fn list_prerequisites(&self) -> ApiResult<Vec<CoursePrerequisite>> {
        Ok(self.repos.prerequisites.get_all().await?)
    }

    pub async fn remove_prerequisite(&self, edge_id: i64) -> ApiResult<()> {
        self.repos.prerequisites.delete(edge_id).await?;
        tracing::info!(edge_id, "先修关系已删除");
        Ok(())
    }

    // ==========================================
    // 组合折扣
    // ==========================================

    /// 新建折扣组（组内每门课程一条记录，共享同一折扣百分比）
    ///
    /// # 说明
    /// - group_id 必须尚未使用
    /// - 重复的课程ID只保留一条，记录按课程ID升序
    /// - 全部记录先校验，任一失败则不写入
    pub async fn create_discount(
        &self,
        group_id: i64,
        course_ids: &[i64],
        discount_percentage: f64,
    ) -> ApiResult<Vec<CourseDiscount>> {
        if course_ids.is_empty() {
            return Err(ApiError::InvalidInput("折扣组至少包含一门课程".to_string()));
        }

        let distinct: BTreeSet<i64> = course_ids.iter().copied().collect();
        let mut records: Vec<CourseDiscount> = distinct
            .into_iter()
            .map(|course_id| CourseDiscount::new(group_id, course_id, discount_percentage))
            .collect();
        for record in &records {
            self.validator.validate_discount(record, true).await?;
        }

        for record in records.iter_mut() {
            record.id = self.repos.discounts.add(record).await?;
        }
        tracing::info!(
            group_id,
            courses = records.len(),
            discount_percentage,
            "折扣组已创建"
        );
        Ok(records)
    }

    pub async fn list_discounts(&self) -> ApiResult<Vec<CourseDiscount>> {
        Ok(self.repos.discounts.get_all().await?)
    }

    pub async fn remove_discount(&self, discount_id: i64) -> ApiResult<()> {
        self.repos.discounts.delete(discount_id).await?;
        tracing::info!(discount_id, "折扣记录已删除");
        Ok(())
    }
}
