// ==========================================
// 高校学籍记录系统 - 实体结构校验规则（纯函数）
// ==========================================
// 职责: 单实体字段级校验，不访问存储
// 输出: 违规列表（全部收集，不短路）
// 需要查库的校验（存在性/唯一性/同日考试）见 record_validator
// ==========================================

use crate::domain::types::{is_valid_grade, MAX_GRADE, MIN_GRADE};
use crate::domain::{Course, CourseDiscount, Enrollment, Semester, Student};
use crate::engine::error::{Rejection, RejectionCode};
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_PERSON_NAME_LEN: usize = 50;
pub const MAX_UNIV_CODE_LEN: usize = 20;
pub const MAX_COURSE_NAME_LEN: usize = 100;
pub const MAX_COURSE_DESCRIPTION_LEN: usize = 500;
pub const CNP_LEN: usize = 13;

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
const PHONE_PATTERN: &str = r"^07\d{2}\s?\d{6}$";
const CNP_PATTERN: &str = r"^\d{13}$";

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PHONE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static CNP_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// 正则只编译一次；编译失败时视为不匹配
fn pattern_matches(cell: &'static OnceLock<Option<Regex>>, pattern: &str, value: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

// ==========================================
// 通用字段检查
// ==========================================

fn require_text(out: &mut Vec<Rejection>, field: &str, value: &str, max_len: Option<usize>) {
    if value.trim().is_empty() {
        out.push(Rejection::new(RejectionCode::Required, format!("{} 不能为空", field)).with_field(field));
        return;
    }
    if let Some(max) = max_len {
        if value.chars().count() > max {
            out.push(
                Rejection::new(RejectionCode::TooLong, format!("{} 长度不能超过 {}", field, max))
                    .with_field(field),
            );
        }
    }
}

fn require_positive_id(out: &mut Vec<Rejection>, field: &str, id: i64) {
    if id <= 0 {
        out.push(
            Rejection::new(RejectionCode::OutOfRange, format!("{} 必须为正数", field))
                .with_field(field),
        );
    }
}

// ==========================================
// Student
// ==========================================
pub fn check_student(student: &Student) -> Vec<Rejection> {
    let mut out = Vec::new();

    require_text(&mut out, "first_name", &student.first_name, Some(MAX_PERSON_NAME_LEN));
    require_text(&mut out, "last_name", &student.last_name, Some(MAX_PERSON_NAME_LEN));

    if student.cnp.chars().count() != CNP_LEN || !pattern_matches(&CNP_RE, CNP_PATTERN, &student.cnp) {
        out.push(
            Rejection::new(RejectionCode::InvalidFormat, "CNP 必须为 13 位数字").with_field("cnp"),
        );
    }

    require_text(&mut out, "address", &student.address, None);
    require_text(&mut out, "univ_code", &student.univ_code, Some(MAX_UNIV_CODE_LEN));

    for (idx, email) in student.emails.iter().enumerate() {
        if !pattern_matches(&EMAIL_RE, EMAIL_PATTERN, email) {
            out.push(
                Rejection::new(RejectionCode::InvalidFormat, format!("邮箱格式非法: {}", email))
                    .with_field(format!("emails[{}]", idx)),
            );
        }
    }

    for (idx, phone) in student.phone_numbers.iter().enumerate() {
        if !pattern_matches(&PHONE_RE, PHONE_PATTERN, phone) {
            out.push(
                Rejection::new(
                    RejectionCode::InvalidFormat,
                    format!("手机号须为 07 开头的 10 位号码: {}", phone),
                )
                .with_field(format!("phone_numbers[{}]", idx)),
            );
        }
    }

    if !student.has_contact_point() {
        out.push(Rejection::new(
            RejectionCode::MissingContact,
            "至少需要一个邮箱或手机号",
        ));
    }

    out
}

// ==========================================
// Course
// ==========================================
pub fn check_course(course: &Course) -> Vec<Rejection> {
    let mut out = Vec::new();

    require_text(&mut out, "name", &course.name, Some(MAX_COURSE_NAME_LEN));
    require_text(&mut out, "description", &course.description, Some(MAX_COURSE_DESCRIPTION_LEN));

    if course.credits <= 0 {
        out.push(Rejection::new(RejectionCode::OutOfRange, "学分必须为正整数").with_field("credits"));
    }
    if course.cost <= 0.0 {
        out.push(Rejection::new(RejectionCode::OutOfRange, "费用必须为正数").with_field("cost"));
    }
    if course.min_cost_per_credit <= 0.0 {
        out.push(
            Rejection::new(RejectionCode::OutOfRange, "每学分最低单价必须为正数")
                .with_field("min_cost_per_credit"),
        );
    }
    if course.max_cost_per_credit <= 0.0 {
        out.push(
            Rejection::new(RejectionCode::OutOfRange, "每学分最高单价必须为正数")
                .with_field("max_cost_per_credit"),
        );
    }

    if course.min_cost_per_credit > course.max_cost_per_credit {
        out.push(Rejection::new(
            RejectionCode::InvalidRange,
            format!(
                "每学分最低单价 {} 大于最高单价 {}",
                course.min_cost_per_credit, course.max_cost_per_credit
            ),
        ));
    } else if let Some(r) = check_cost_range(course) {
        out.push(r);
    }

    out
}

/// 费用区间检查（选课时也会复用）
pub fn check_cost_range(course: &Course) -> Option<Rejection> {
    if course.is_cost_within_range() {
        return None;
    }
    let (min_cost, max_cost) = course.allowed_cost_range();
    Some(
        Rejection::new(
            RejectionCode::CostOutOfRange,
            format!("费用 {} 不在区间 [{}, {}] 内", course.cost, min_cost, max_cost),
        )
        .with_field("cost"),
    )
}

// ==========================================
// Semester
// ==========================================
pub fn check_semester(semester: &Semester) -> Vec<Rejection> {
    let mut out = Vec::new();
    if semester.number < 1 {
        out.push(Rejection::new(RejectionCode::OutOfRange, "学期序号必须 ≥ 1").with_field("number"));
    }
    if semester.min_credits < 0 {
        out.push(
            Rejection::new(RejectionCode::OutOfRange, "最低学分要求不能为负").with_field("min_credits"),
        );
    }
    out
}

// ==========================================
// Enrollment
// ==========================================
pub fn check_enrollment(enrollment: &Enrollment) -> Vec<Rejection> {
    let mut out = Vec::new();
    require_positive_id(&mut out, "student_id", enrollment.student_id);
    require_positive_id(&mut out, "course_id", enrollment.course_id);
    require_positive_id(&mut out, "semester_id", enrollment.semester_id);
    if !(enrollment.amount_paid >= 0.0) {
        out.push(
            Rejection::new(RejectionCode::OutOfRange, "已缴金额不能为负").with_field("amount_paid"),
        );
    }
    out
}

// ==========================================
// Exam
// ==========================================
pub fn check_exam_grade(grade: i32) -> Option<Rejection> {
    if is_valid_grade(grade) {
        return None;
    }
    Some(
        Rejection::new(
            RejectionCode::GradeOutOfRange,
            format!("成绩 {} 不在 [{}, {}] 内", grade, MIN_GRADE, MAX_GRADE),
        )
        .with_field("grade"),
    )
}

// ==========================================
// CoursePrerequisite
// ==========================================
pub fn check_prerequisite_min_grade(min_grade: i32) -> Option<Rejection> {
    if is_valid_grade(min_grade) {
        return None;
    }
    Some(
        Rejection::new(
            RejectionCode::OutOfRange,
            format!("先修最低成绩 {} 不在 [{}, {}] 内", min_grade, MIN_GRADE, MAX_GRADE),
        )
        .with_field("min_grade"),
    )
}

// ==========================================
// CourseDiscount
// ==========================================
pub fn check_discount(discount: &CourseDiscount) -> Vec<Rejection> {
    let mut out = Vec::new();
    require_positive_id(&mut out, "group_id", discount.group_id);
    require_positive_id(&mut out, "course_id", discount.course_id);
    if !(0.0..=100.0).contains(&discount.discount_percentage) {
        out.push(
            Rejection::new(
                RejectionCode::OutOfRange,
                format!("折扣百分比 {} 不在 [0, 100] 内", discount.discount_percentage),
            )
            .with_field("discount_percentage"),
        );
    }
    out
}
