// ==========================================
// 高校学籍记录系统 - 学期管理 API
// ==========================================

use crate::api::error::ApiResult;
use crate::api::student_api::require_id;
use crate::domain::Semester;
use crate::engine::{PolicyRepositories, RecordValidator};

/// 学期管理API（序号唯一）
pub struct SemesterApi {
    repos: PolicyRepositories,
    validator: RecordValidator,
}

impl SemesterApi {
    pub fn new(repos: PolicyRepositories) -> Self {
        Self {
            validator: RecordValidator::new(repos.clone()),
            repos,
        }
    }

    pub async fn create_semester(&self, mut semester: Semester) -> ApiResult<Semester> {
        self.validator.validate_semester(&semester).await?;
        semester.id = self.repos.semesters.add(&semester).await?;
        tracing::info!(
            semester_id = semester.id,
            number = semester.number,
            min_credits = semester.min_credits,
            "学期已创建"
        );
        Ok(semester)
    }

    pub async fn get_semester(&self, semester_id: i64) -> ApiResult<Option<Semester>> {
        Ok(self.repos.semesters.get_by_id(semester_id).await?)
    }

    pub async fn get_by_number(&self, number: i32) -> ApiResult<Option<Semester>> {
        Ok(self.repos.semesters.get_by_number(number).await?)
    }

    pub async fn list_semesters(&self) -> ApiResult<Vec<Semester>> {
        Ok(self.repos.semesters.get_all().await?)
    }

    pub async fn update_semester(&self, semester: &Semester) -> ApiResult<()> {
        require_id(semester.id, "学期")?;
        self.validator.validate_semester(semester).await?;
        self.repos.semesters.update(semester).await?;
        tracing::info!(semester_id = semester.id, "学期已更新");
        Ok(())
    }

    pub async fn delete_semester(&self, semester_id: i64) -> ApiResult<()> {
        self.repos.semesters.delete(semester_id).await?;
        tracing::info!(semester_id, "学期已删除");
        Ok(())
    }
}
