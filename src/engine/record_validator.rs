// ==========================================
// 高校学籍记录系统 - 记录校验器
// ==========================================
// 职责: 结构校验 + 需要查库的跨实体校验（存在性、唯一性、同日考试）
// 输出: 全部违规收集后以 PolicyError::Invalid 返回
// 红线: 只读，不写库
// ==========================================

use crate::domain::types::EntityKind;
use crate::domain::{Course, CourseDiscount, CourseSemester, Enrollment, Exam, Semester, Student};
use crate::engine::entity_rules;
use crate::engine::error::{PolicyError, PolicyResult, Rejection, RejectionCode};
use crate::engine::repositories::PolicyRepositories;

// ==========================================
// RecordValidator
// ==========================================
#[derive(Clone)]
pub struct RecordValidator {
    repos: PolicyRepositories,
}

impl RecordValidator {
    pub fn new(repos: PolicyRepositories) -> Self {
        Self { repos }
    }

    pub async fn validate_student(&self, student: &Student) -> PolicyResult<()> {
        finish(EntityKind::Student, entity_rules::check_student(student))
    }

    pub async fn validate_course(&self, course: &Course) -> PolicyResult<()> {
        finish(EntityKind::Course, entity_rules::check_course(course))
    }

    /// 学期校验（序号唯一，允许与自身相同）
    pub async fn validate_semester(&self, semester: &Semester) -> PolicyResult<()> {
        let mut violations = entity_rules::check_semester(semester);

        if let Some(existing) = self.repos.semesters.get_by_number(semester.number).await? {
            if existing.id != semester.id {
                violations.push(
                    Rejection::new(
                        RejectionCode::DuplicateSemesterNumber,
                        format!("学期序号 {} 已存在 (id={})", semester.number, existing.id),
                    )
                    .with_field("number"),
                );
            }
        }

        finish(EntityKind::Semester, violations)
    }

    pub async fn validate_course_semester(&self, offering: &CourseSemester) -> PolicyResult<()> {
        let mut violations = Vec::new();
        self.require_course(&mut violations, offering.course_id).await?;
        self.require_semester(&mut violations, offering.semester_id).await?;
        finish(EntityKind::CourseSemester, violations)
    }

    pub async fn validate_enrollment(&self, enrollment: &Enrollment) -> PolicyResult<()> {
        let mut violations = entity_rules::check_enrollment(enrollment);
        self.require_student(&mut violations, enrollment.student_id).await?;
        self.require_course(&mut violations, enrollment.course_id).await?;
        self.require_semester(&mut violations, enrollment.semester_id).await?;
        finish(EntityKind::Enrollment, violations)
    }

    /// 考试校验（成绩范围、学生/课程存在、同一学生同一自然日仅一场考试）
    pub async fn validate_exam(&self, exam: &Exam) -> PolicyResult<()> {
        let mut violations = Vec::new();
        violations.extend(entity_rules::check_exam_grade(exam.grade));
        self.require_student(&mut violations, exam.student_id).await?;
        self.require_course(&mut violations, exam.course_id).await?;

        let day = exam.calendar_day();
        let clash = self
            .repos
            .exams
            .get_by_student(exam.student_id)
            .await?
            .into_iter()
            .find(|other| other.id != exam.id && other.calendar_day() == day);
        if let Some(other) = clash {
            violations.push(
                Rejection::new(
                    RejectionCode::MultipleExamsSameDay,
                    format!(
                        "学生 {} 在 {} 已有考试 (exam_id={})",
                        exam.student_id, day, other.id
                    ),
                )
                .with_field("date"),
            );
        }

        finish(EntityKind::Exam, violations)
    }

    /// 折扣校验
    ///
    /// # 参数
    /// - require_unique_group: 新建折扣组时要求 group_id 尚未使用
    pub async fn validate_discount(
        &self,
        discount: &CourseDiscount,
        require_unique_group: bool,
    ) -> PolicyResult<()> {
        let mut violations = entity_rules::check_discount(discount);

        if require_unique_group
            && discount.group_id > 0
            && self.repos.discounts.exists_group_id(discount.group_id).await?
        {
            violations.push(
                Rejection::new(
                    RejectionCode::DuplicateGroupId,
                    format!("折扣组 {} 已存在", discount.group_id),
                )
                .with_field("group_id"),
            );
        }

        if discount.course_id > 0 {
            self.require_course(&mut violations, discount.course_id).await?;
        }

        finish(EntityKind::CourseDiscount, violations)
    }

    // ==========================================
    // 存在性检查
    // ==========================================

    async fn require_student(&self, out: &mut Vec<Rejection>, id: i64) -> PolicyResult<()> {
        if self.repos.students.get_by_id(id).await?.is_none() {
            out.push(missing(EntityKind::Student, "student_id", id));
        }
        Ok(())
    }

    async fn require_course(&self, out: &mut Vec<Rejection>, id: i64) -> PolicyResult<()> {
        if self.repos.courses.get_by_id(id).await?.is_none() {
            out.push(missing(EntityKind::Course, "course_id", id));
        }
        Ok(())
    }

    async fn require_semester(&self, out: &mut Vec<Rejection>, id: i64) -> PolicyResult<()> {
        if self.repos.semesters.get_by_id(id).await?.is_none() {
            out.push(missing(EntityKind::Semester, "semester_id", id));
        }
        Ok(())
    }
}

fn missing(entity: EntityKind, field: &str, id: i64) -> Rejection {
    Rejection::new(RejectionCode::NotFound, format!("{}(id={})不存在", entity, id)).with_field(field)
}

/// 有违规则返回 Invalid
fn finish(entity: EntityKind, violations: Vec<Rejection>) -> PolicyResult<()> {
    if violations.is_empty() {
        return Ok(());
    }
    tracing::warn!(
        entity = %entity,
        violation_count = violations.len(),
        first_code = %violations[0].code,
        "结构校验失败"
    );
    Err(PolicyError::Invalid { entity, violations })
}
