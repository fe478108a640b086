// ==========================================
// 高校学籍记录系统 - 考试管理 API
// ==========================================
// 职责: 参加考试（经 ExamAttemptEngine，含重修与退费规则）与考试记录维护
// ==========================================

use crate::api::error::ApiResult;
use crate::api::student_api::require_id;
use crate::config::PolicyConfigReader;
use crate::domain::Exam;
use crate::engine::{ExamAttemptEngine, PolicyRepositories};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// 考试管理API
pub struct ExamApi<C>
where
    C: PolicyConfigReader,
{
    repos: PolicyRepositories,
    engine: ExamAttemptEngine<C>,
}

impl<C> ExamApi<C>
where
    C: PolicyConfigReader,
{
    pub fn new(repos: PolicyRepositories, config: Arc<C>) -> Self {
        Self {
            engine: ExamAttemptEngine::new(repos.clone(), config),
            repos,
        }
    }

    /// 参加考试（重修规则 + 不及格退费）
    pub async fn take_exam(
        &self,
        student_id: i64,
        course_id: i64,
        grade: i32,
        date: NaiveDateTime,
    ) -> ApiResult<Exam> {
        Ok(self
            .engine
            .take_exam(student_id, course_id, grade, date)
            .await?)
    }

    /// 直接登记考试记录（复核重修规则，不退费）
    pub async fn schedule_exam(&self, mut exam: Exam) -> ApiResult<Exam> {
        self.engine.validate_recorded(&exam).await?;
        exam.id = self.repos.exams.add(&exam).await?;
        tracing::info!(exam_id = exam.id, student_id = exam.student_id, "考试记录已登记");
        Ok(exam)
    }

    pub async fn get_exam(&self, exam_id: i64) -> ApiResult<Option<Exam>> {
        Ok(self.repos.exams.get_by_id(exam_id).await?)
    }

    pub async fn list_exams(&self) -> ApiResult<Vec<Exam>> {
        Ok(self.repos.exams.get_all().await?)
    }

    pub async fn list_by_student(&self, student_id: i64) -> ApiResult<Vec<Exam>> {
        Ok(self.repos.exams.get_by_student(student_id).await?)
    }

    pub async fn update_exam(&self, exam: &Exam) -> ApiResult<()> {
        require_id(exam.id, "考试")?;
        self.engine.validate_recorded(exam).await?;
        self.repos.exams.update(exam).await?;
        tracing::info!(exam_id = exam.id, "考试记录已更新");
        Ok(())
    }

    pub async fn delete_exam(&self, exam_id: i64) -> ApiResult<()> {
        self.repos.exams.delete(exam_id).await?;
        tracing::info!(exam_id, "考试记录已删除");
        Ok(())
    }
}
