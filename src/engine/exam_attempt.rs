// ==========================================
// 高校学籍记录系统 - 考试重修引擎
// ==========================================
// 红线: 已通过的课程不得再考；不及格次数达到上限后不得再考
// 红线: 同一学生同一自然日最多一场考试
// ==========================================
// 职责: 判定能否参加考试 → 记录考试 → 不及格时按比例退费
// 职责: 直接登记/改动考试记录时复核重修规则（不退费）
// 输入: (学生, 课程) 历史考试（按日期升序）+ 配置（最大不及格次数、退费比例）
// ==========================================

use crate::config::PolicyConfigReader;
use crate::domain::types::is_passing_grade;
use crate::domain::{Exam, ExamHistory};
use crate::engine::error::{PolicyError, PolicyResult, RejectionCode};
use crate::engine::record_validator::RecordValidator;
use crate::engine::repositories::PolicyRepositories;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// ExamAttemptEngine - 考试重修引擎
// ==========================================
pub struct ExamAttemptEngine<C>
where
    C: PolicyConfigReader,
{
    repos: PolicyRepositories,
    validator: RecordValidator,
    config: Arc<C>,
}

impl<C> ExamAttemptEngine<C>
where
    C: PolicyConfigReader,
{
    /// 创建新的 ExamAttemptEngine 实例
    ///
    /// # 参数
    /// - repos: 仓储集合
    /// - config: 配置读取器
    pub fn new(repos: PolicyRepositories, config: Arc<C>) -> Self {
        let validator = RecordValidator::new(repos.clone());
        Self {
            repos,
            validator,
            config,
        }
    }

    /// 参加考试
    ///
    /// # 参数
    /// - student_id / course_id: 考试对象
    /// - grade: 成绩 (1-10)
    /// - date: 考试时间
    ///
    /// # 返回
    /// - Ok(Exam): 已持久化的考试记录
    ///
    /// # 副作用
    /// - 不及格时: enrollment.amount_paid -= amount_paid × 退费比例
    #[instrument(skip(self))]
    pub async fn take_exam(
        &self,
        student_id: i64,
        course_id: i64,
        grade: i32,
        date: NaiveDateTime,
    ) -> PolicyResult<Exam> {
        tracing::info!("开始考试资格判定");

        // === 步骤 1: 必须已选课 ===
        let enrollment = self
            .repos
            .enrollments
            .get_by_student(student_id)
            .await?
            .into_iter()
            .find(|e| e.course_id == course_id);
        let Some(mut enrollment) = enrollment else {
            let err = PolicyError::illegal_state(
                RejectionCode::NotEnrolled,
                format!("学生 {} 未选修课程 {}", student_id, course_id),
            );
            tracing::warn!(code = err.code(), "考试被拒绝");
            return Err(err);
        };

        // === 步骤 2: 历史考试（按日期升序）===
        let exams = self.repos.exams.get_by_student(student_id).await?;
        let history = ExamHistory::for_course(&exams, student_id, course_id);

        // === 步骤 3: 已通过 ===
        if history.passed() {
            return Err(reject(
                RejectionCode::AlreadyPassed,
                format!("学生 {} 已通过课程 {}", student_id, course_id),
            ));
        }

        // === 步骤 4: 不及格次数上限 ===
        let max_failed = self.config.get_max_failed_attempts().await?;
        let failed_count = history.failed_count();
        if failed_count >= max_failed as usize {
            return Err(reject(
                RejectionCode::MaxAttemptsReached,
                format!(
                    "学生 {} 课程 {} 已不及格 {} 次（上限 {}）",
                    student_id, course_id, failed_count, max_failed
                ),
            ));
        }

        // === 步骤 5: 结构校验（成绩范围、实体存在、同日考试）===
        let mut exam = Exam::new(student_id, course_id, grade, date);
        self.validator.validate_exam(&exam).await?;

        // === 步骤 6: 持久化考试 ===
        exam.id = self.repos.exams.add(&exam).await?;
        tracing::info!(
            exam_id = exam.id,
            attempt = history.grades().len() + 1,
            passed = exam.is_passed(),
            "考试已记录"
        );

        // === 步骤 7: 不及格退费 ===
        if !is_passing_grade(grade) {
            let ratio = self.config.get_failed_exam_refund_ratio().await?;
            let before = enrollment.amount_paid;
            let refund = enrollment.apply_refund(ratio);
            self.repos.enrollments.update(&enrollment).await?;
            tracing::info!(
                enrollment_id = enrollment.id,
                refund,
                amount_before = before,
                amount_after = enrollment.amount_paid,
                "不及格退费已入账"
            );
        }

        Ok(exam)
    }

    /// 复核一条将要写库的考试记录（登记或修改）
    ///
    /// # 说明
    /// - 以写库后的 (学生, 课程) 历史为准：修改时用新记录替换旧记录
    /// - 按日期回放，历史必须能由 take_exam 逐次产生：
    ///   通过之后不得再有考试，挂科达到上限之后不得再有考试
    /// - 结构校验（成绩范围、实体存在、同日考试）先于重修规则
    /// - 不涉及退费
    #[instrument(skip(self, exam), fields(
        exam_id = exam.id,
        student_id = exam.student_id,
        course_id = exam.course_id
    ))]
    pub async fn validate_recorded(&self, exam: &Exam) -> PolicyResult<()> {
        self.validator.validate_exam(exam).await?;

        let mut exams: Vec<Exam> = self
            .repos
            .exams
            .get_by_student(exam.student_id)
            .await?
            .into_iter()
            .filter(|e| exam.id <= 0 || e.id != exam.id)
            .collect();
        exams.push(exam.clone());
        let history = ExamHistory::for_course(&exams, exam.student_id, exam.course_id);

        // 按日期回放：每次考试之前既未通过，挂科次数也未达上限
        let max_failed = self.config.get_max_failed_attempts().await? as usize;
        let mut failed = 0usize;
        let mut passed = false;
        for &grade in history.grades() {
            if passed {
                return Err(reject(
                    RejectionCode::AlreadyPassed,
                    format!(
                        "学生 {} 课程 {} 通过后不能再有考试记录",
                        exam.student_id, exam.course_id
                    ),
                ));
            }
            if failed >= max_failed {
                return Err(reject(
                    RejectionCode::MaxAttemptsReached,
                    format!(
                        "学生 {} 课程 {} 已挂科 {} 次（上限 {}），之后不能再有考试记录",
                        exam.student_id, exam.course_id, failed, max_failed
                    ),
                ));
            }
            if is_passing_grade(grade) {
                passed = true;
            } else {
                failed += 1;
            }
        }

        Ok(())
    }
}

fn reject(code: RejectionCode, message: String) -> PolicyError {
    tracing::warn!(code = %code, reason = %message, "考试被拒绝");
    PolicyError::rejected(code, message)
}
