// ==========================================
// 高校学籍记录系统 - 选课管理 API
// ==========================================
// 职责: 选课准入（经 EnrollmentEngine）与选课记录维护
// 红线: update 不得改动已缴金额；换课/换学期重新检查开设与重复选课
// ==========================================

use crate::api::error::ApiResult;
use crate::api::student_api::require_id;
use crate::domain::Enrollment;
use crate::engine::{EnrollmentEngine, PolicyRepositories};

/// 选课管理API
pub struct EnrollmentApi {
    repos: PolicyRepositories,
    engine: EnrollmentEngine,
}

impl EnrollmentApi {
    pub fn new(repos: PolicyRepositories) -> Self {
        Self {
            engine: EnrollmentEngine::new(repos.clone()),
            repos,
        }
    }

    /// 选课（完整准入规则）
    pub async fn enroll(
        &self,
        student_id: i64,
        course_id: i64,
        semester_id: i64,
        initial_payment: f64,
    ) -> ApiResult<Enrollment> {
        Ok(self
            .engine
            .enroll(student_id, course_id, semester_id, initial_payment)
            .await?)
    }

    pub async fn get_enrollment(&self, enrollment_id: i64) -> ApiResult<Option<Enrollment>> {
        Ok(self.repos.enrollments.get_by_id(enrollment_id).await?)
    }

    pub async fn list_enrollments(&self) -> ApiResult<Vec<Enrollment>> {
        Ok(self.repos.enrollments.get_all().await?)
    }

    pub async fn list_by_student(&self, student_id: i64) -> ApiResult<Vec<Enrollment>> {
        Ok(self.repos.enrollments.get_by_student(student_id).await?)
    }

    /// 修改选课记录（已缴金额只读）
    pub async fn update_enrollment(&self, enrollment: &Enrollment) -> ApiResult<()> {
        require_id(enrollment.id, "选课")?;
        self.engine.validate_update(enrollment).await?;
        self.repos.enrollments.update(enrollment).await?;
        tracing::info!(enrollment_id = enrollment.id, "选课记录已更新");
        Ok(())
    }

    pub async fn delete_enrollment(&self, enrollment_id: i64) -> ApiResult<()> {
        self.repos.enrollments.delete(enrollment_id).await?;
        tracing::info!(enrollment_id, "选课记录已删除");
        Ok(())
    }
}
