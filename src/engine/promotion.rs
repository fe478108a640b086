// ==========================================
// 高校学籍记录系统 - 升学期引擎
// ==========================================
// 职责: 统计当前学期已获学分，满足学期最低学分则整体升入下一学期
// 附带: 学分报表（学期序号 → 已获学分，只读）
// 红线: 任何拒绝路径都不得写库
// ==========================================

use crate::domain::types::{is_passing_grade, EntityKind};
use crate::domain::{Enrollment, Exam, Semester};
use crate::engine::error::{PolicyError, PolicyResult, RejectionCode};
use crate::engine::repositories::PolicyRepositories;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

/// 学分报表: 学期序号 → 已获学分
pub type CreditReport = BTreeMap<i32, i32>;

/// 升学期结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionOutcome {
    pub student_id: i64,
    pub from_semester: i32,
    pub to_semester: i32,
    pub earned_credits: i32,
    pub moved_enrollments: usize,
}

/// 课程是否存在及格成绩（任一次考试 ≥ 5 即视为通过）
pub fn has_passed_course(exams: &[Exam], course_id: i64) -> bool {
    exams
        .iter()
        .any(|e| e.course_id == course_id && is_passing_grade(e.grade))
}

// ==========================================
// PromotionEngine - 升学期引擎
// ==========================================
pub struct PromotionEngine {
    repos: PolicyRepositories,
}

impl PromotionEngine {
    pub fn new(repos: PolicyRepositories) -> Self {
        Self { repos }
    }

    /// 升学期（当前学期取按主键升序的第一条选课记录所在学期）
    ///
    /// # 返回
    /// - Ok(PromotionOutcome): 升入的学期序号等信息
    #[instrument(skip(self))]
    pub async fn promote(&self, student_id: i64) -> PolicyResult<PromotionOutcome> {
        let enrollments = self.load_enrollments(student_id).await?;
        // load_enrollments 保证非空
        let current_semester_id = enrollments[0].semester_id;
        self.promote_within(student_id, current_semester_id, enrollments)
            .await
    }

    /// 升学期（显式指定当前学期）
    #[instrument(skip(self))]
    pub async fn promote_from(
        &self,
        student_id: i64,
        semester_id: i64,
    ) -> PolicyResult<PromotionOutcome> {
        let enrollments = self.load_enrollments(student_id).await?;
        self.promote_within(student_id, semester_id, enrollments)
            .await
    }

    /// 学分报表（只读）
    ///
    /// # 说明
    /// - 仅包含有及格课程的学期
    /// - 学期无法解析的选课记录被跳过
    #[instrument(skip(self))]
    pub async fn credit_report(&self, student_id: i64) -> PolicyResult<CreditReport> {
        let enrollments = self.load_enrollments(student_id).await?;
        let exams = self.repos.exams.get_by_student(student_id).await?;

        let mut report = CreditReport::new();
        for enrollment in &enrollments {
            let Some(semester) = self.repos.semesters.get_by_id(enrollment.semester_id).await?
            else {
                tracing::warn!(
                    enrollment_id = enrollment.id,
                    semester_id = enrollment.semester_id,
                    "选课记录的学期不存在，报表跳过"
                );
                continue;
            };
            if !has_passed_course(&exams, enrollment.course_id) {
                continue;
            }
            let credits = self.course_credits(enrollment).await?;
            *report.entry(semester.number).or_insert(0) += credits;
        }

        tracing::debug!(semesters = report.len(), "学分报表已生成");
        Ok(report)
    }

    // ==========================================
    // 内部步骤
    // ==========================================

    /// 学生存在且至少有一条选课记录
    async fn load_enrollments(&self, student_id: i64) -> PolicyResult<Vec<Enrollment>> {
        if self.repos.students.get_by_id(student_id).await?.is_none() {
            tracing::warn!(student_id, "学生不存在");
            return Err(PolicyError::not_found(EntityKind::Student, student_id));
        }

        let enrollments = self.repos.enrollments.get_by_student(student_id).await?;
        if enrollments.is_empty() {
            let err = PolicyError::illegal_state(
                RejectionCode::NoEnrollments,
                format!("学生 {} 没有任何选课记录", student_id),
            );
            tracing::warn!(code = err.code(), "升学期被拒绝");
            return Err(err);
        }
        Ok(enrollments)
    }

    async fn promote_within(
        &self,
        student_id: i64,
        current_semester_id: i64,
        enrollments: Vec<Enrollment>,
    ) -> PolicyResult<PromotionOutcome> {
        let current = self
            .repos
            .semesters
            .get_by_id(current_semester_id)
            .await?
            .ok_or_else(|| PolicyError::not_found(EntityKind::Semester, current_semester_id))?;

        let in_current: Vec<Enrollment> = enrollments
            .into_iter()
            .filter(|e| e.semester_id == current.id)
            .collect();

        // === 已获学分 ===
        let exams = self.repos.exams.get_by_student(student_id).await?;
        let mut earned_credits = 0;
        for enrollment in &in_current {
            if has_passed_course(&exams, enrollment.course_id) {
                earned_credits += self.course_credits(enrollment).await?;
            }
        }

        tracing::info!(
            semester = current.number,
            earned_credits,
            required = current.min_credits,
            "当前学期学分统计"
        );

        if earned_credits < current.min_credits {
            let err = PolicyError::rejected(
                RejectionCode::InsufficientCredits,
                format!("{}/{}", earned_credits, current.min_credits),
            );
            tracing::warn!(code = err.code(), "升学期被拒绝");
            return Err(err);
        }

        // === 下一学期 ===
        let next = self.next_semester(&current).await?;

        // === 迁移当前学期的全部选课 ===
        let moved = in_current.len();
        for mut enrollment in in_current {
            enrollment.semester_id = next.id;
            self.repos.enrollments.update(&enrollment).await?;
        }

        tracing::info!(
            from = current.number,
            to = next.number,
            moved_enrollments = moved,
            "升学期成功"
        );

        Ok(PromotionOutcome {
            student_id,
            from_semester: current.number,
            to_semester: next.number,
            earned_credits,
            moved_enrollments: moved,
        })
    }

    async fn next_semester(&self, current: &Semester) -> PolicyResult<Semester> {
        match self
            .repos
            .semesters
            .get_by_number(current.next_number())
            .await?
        {
            Some(next) => Ok(next),
            None => {
                let err = PolicyError::illegal_state(
                    RejectionCode::NoNextSemester,
                    format!("第 {} 学期之后没有可升入的学期", current.number),
                );
                tracing::warn!(code = err.code(), "升学期被拒绝");
                Err(err)
            }
        }
    }

    async fn course_credits(&self, enrollment: &Enrollment) -> PolicyResult<i32> {
        match self.repos.courses.get_by_id(enrollment.course_id).await? {
            Some(course) => Ok(course.credits),
            None => {
                tracing::warn!(
                    enrollment_id = enrollment.id,
                    course_id = enrollment.course_id,
                    "选课记录引用的课程不存在，学分按 0 计"
                );
                Ok(0)
            }
        }
    }
}
