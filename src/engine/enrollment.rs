// ==========================================
// 高校学籍记录系统 - 选课准入引擎
// ==========================================
// 红线: 同一学生同一课程只能选一次
// 红线: 已缴金额只能由考试引擎退费时修改
// ==========================================
// 职责: 判定学生能否在某学期选某门课，合法则创建选课记录；复核选课记录的修改
// 顺序: 实体存在 → 课程在该学期开设 → 费用区间 → 重复选课 → 学期学分下限 → 结构校验
// ==========================================

use crate::domain::types::EntityKind;
use crate::domain::{Enrollment, Semester};
use crate::engine::entity_rules;
use crate::engine::error::{PolicyError, PolicyResult, RejectionCode};
use crate::engine::record_validator::RecordValidator;
use crate::engine::repositories::PolicyRepositories;
use tracing::instrument;

/// 比较已缴金额时允许的浮点误差
const AMOUNT_TOLERANCE: f64 = 1e-9;

// ==========================================
// EnrollmentEngine - 选课准入引擎
// ==========================================
pub struct EnrollmentEngine {
    repos: PolicyRepositories,
    validator: RecordValidator,
}

impl EnrollmentEngine {
    pub fn new(repos: PolicyRepositories) -> Self {
        let validator = RecordValidator::new(repos.clone());
        Self { repos, validator }
    }

    /// 选课
    ///
    /// # 参数
    /// - student_id / course_id / semester_id: 选课三元组
    /// - initial_payment: 初始缴费金额
    ///
    /// # 返回
    /// - Ok(Enrollment): 已持久化的选课记录（含分配的 id）
    #[instrument(skip(self))]
    pub async fn enroll(
        &self,
        student_id: i64,
        course_id: i64,
        semester_id: i64,
        initial_payment: f64,
    ) -> PolicyResult<Enrollment> {
        tracing::info!("开始选课准入判定");

        // === 步骤 1: 实体存在 ===
        if self.repos.students.get_by_id(student_id).await?.is_none() {
            return Err(not_found(EntityKind::Student, student_id));
        }
        let course = self
            .repos
            .courses
            .get_by_id(course_id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Course, course_id))?;
        let semester = self
            .repos
            .semesters
            .get_by_id(semester_id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Semester, semester_id))?;

        // === 步骤 2: 课程在该学期开设 ===
        self.ensure_offered(course_id, &semester).await?;

        // === 步骤 3: 费用区间（费用可能因折扣变化，需重新校验）===
        if let Some(rejection) = entity_rules::check_cost_range(&course) {
            tracing::warn!(code = %rejection.code, cost = course.cost, "选课被拒绝");
            return Err(PolicyError::Rejected(rejection));
        }

        // === 步骤 4: 重复选课 ===
        let existing = self.repos.enrollments.get_by_student(student_id).await?;
        if let Some(dup) = existing.iter().find(|e| e.course_id == course_id) {
            return Err(reject(
                RejectionCode::AlreadyEnrolled,
                format!(
                    "学生 {} 已选课程 {} (enrollment_id={})",
                    student_id, course_id, dup.id
                ),
            ));
        }

        // === 步骤 5: 学期学分下限 ===
        let mut enrolled_credits = 0;
        for enrollment in existing.iter().filter(|e| e.semester_id == semester_id) {
            match self.repos.courses.get_by_id(enrollment.course_id).await? {
                Some(c) => enrolled_credits += c.credits,
                None => tracing::warn!(
                    enrollment_id = enrollment.id,
                    course_id = enrollment.course_id,
                    "选课记录引用的课程不存在，学分不计入"
                ),
            }
        }
        let total_credits = enrolled_credits + course.credits;
        if total_credits < semester.min_credits {
            return Err(reject(
                RejectionCode::InsufficientSemesterCredits,
                format!(
                    "本学期学分 {} 低于最低要求 {}",
                    total_credits, semester.min_credits
                ),
            ));
        }

        // === 步骤 6: 结构校验 + 持久化 ===
        let mut enrollment = Enrollment::new(student_id, course_id, semester_id, initial_payment);
        self.validator.validate_enrollment(&enrollment).await?;

        enrollment.id = self.repos.enrollments.add(&enrollment).await?;
        tracing::info!(
            enrollment_id = enrollment.id,
            semester_credits = total_credits,
            "选课成功"
        );
        Ok(enrollment)
    }

    /// 复核选课记录的修改
    ///
    /// # 说明
    /// - 已缴金额不得改动（退费只经考试引擎）
    /// - 学生、课程或学期变化时重新检查实体存在、开设学期与重复选课
    ///
    /// # 返回
    /// - Ok(()): 可以写库
    #[instrument(skip(self, enrollment), fields(enrollment_id = enrollment.id))]
    pub async fn validate_update(&self, enrollment: &Enrollment) -> PolicyResult<()> {
        let stored = self
            .repos
            .enrollments
            .get_by_id(enrollment.id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Enrollment, enrollment.id))?;

        if (stored.amount_paid - enrollment.amount_paid).abs() > AMOUNT_TOLERANCE {
            return Err(reject(
                RejectionCode::AmountPaidReadOnly,
                format!(
                    "选课 {} 的已缴金额 {} 不能直接修改为 {}",
                    enrollment.id, stored.amount_paid, enrollment.amount_paid
                ),
            ));
        }

        let moved = stored.student_id != enrollment.student_id
            || stored.course_id != enrollment.course_id
            || stored.semester_id != enrollment.semester_id;
        if moved {
            if self
                .repos
                .students
                .get_by_id(enrollment.student_id)
                .await?
                .is_none()
            {
                return Err(not_found(EntityKind::Student, enrollment.student_id));
            }
            if self
                .repos
                .courses
                .get_by_id(enrollment.course_id)
                .await?
                .is_none()
            {
                return Err(not_found(EntityKind::Course, enrollment.course_id));
            }
            let semester = self
                .repos
                .semesters
                .get_by_id(enrollment.semester_id)
                .await?
                .ok_or_else(|| not_found(EntityKind::Semester, enrollment.semester_id))?;

            self.ensure_offered(enrollment.course_id, &semester).await?;

            let duplicate = self
                .repos
                .enrollments
                .get_by_student(enrollment.student_id)
                .await?
                .into_iter()
                .find(|e| e.id != enrollment.id && e.course_id == enrollment.course_id);
            if let Some(dup) = duplicate {
                return Err(reject(
                    RejectionCode::AlreadyEnrolled,
                    format!(
                        "学生 {} 已选课程 {} (enrollment_id={})",
                        enrollment.student_id, enrollment.course_id, dup.id
                    ),
                ));
            }
        }

        self.validator.validate_enrollment(enrollment).await
    }

    /// 课程必须在该学期开设
    async fn ensure_offered(&self, course_id: i64, semester: &Semester) -> PolicyResult<()> {
        let offered = self
            .repos
            .course_semesters
            .get_by_course(course_id)
            .await?
            .iter()
            .any(|o| o.semester_id == semester.id);
        if !offered {
            let err = PolicyError::illegal_state(
                RejectionCode::CourseNotInSemester,
                format!("课程 {} 未在第 {} 学期开设", course_id, semester.number),
            );
            tracing::warn!(code = err.code(), "选课被拒绝");
            return Err(err);
        }
        Ok(())
    }
}

fn not_found(entity: EntityKind, id: i64) -> PolicyError {
    tracing::warn!(entity = %entity, id, "选课前置实体不存在");
    PolicyError::not_found(entity, id)
}

fn reject(code: RejectionCode, message: String) -> PolicyError {
    tracing::warn!(code = %code, reason = %message, "选课被拒绝");
    PolicyError::rejected(code, message)
}
