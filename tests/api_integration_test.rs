// ==========================================
// API 层集成测试
// ==========================================
// 测试目标: 经 AppState 组装的 API 完成校验、写库与错误码转换
// ==========================================

mod helpers;

use chrono::NaiveDate;
use helpers::api_test_helper::{assert_api_code, ApiTestEnv};
use helpers::test_data_builder::{CourseBuilder, StudentBuilder};
use university_records::api::ApiError;
use university_records::config::config_keys;
use university_records::domain::{Exam, Semester};

fn day(year: i32, month: u32, d: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, d)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn semester(number: i32, min_credits: i32) -> Semester {
    Semester {
        id: 0,
        number,
        min_credits,
    }
}

// ==========================================
// 学生 / 学期维护
// ==========================================

#[tokio::test]
async fn test_create_student_without_contact_rejected() {
    let env = ApiTestEnv::new();
    let student = StudentBuilder::new("1990101123456").emails(&[]).build();

    let err = env.state.student_api.create_student(student).await.unwrap_err();
    match &err {
        ApiError::ValidationFailed { violations, .. } => {
            assert!(violations.iter().any(|v| v.violation_type == "MISSING_CONTACT"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(env.state.student_api.list_students().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_and_update_student() {
    let env = ApiTestEnv::new();
    let mut student = env
        .state
        .student_api
        .create_student(StudentBuilder::new("1990101123456").phones(&["0722 123456"]).build())
        .await
        .unwrap();
    assert!(student.id > 0);

    student.address = "Str. Lapusneanu 5".to_string();
    env.state.student_api.update_student(&student).await.unwrap();

    let stored = env
        .state
        .student_api
        .get_student(student.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.address, "Str. Lapusneanu 5");
}

#[tokio::test]
async fn test_update_requires_persisted_id() {
    let env = ApiTestEnv::new();
    let student = StudentBuilder::new("1990101123456").build();

    let err = env.state.student_api.update_student(&student).await.unwrap_err();
    assert_api_code(&err, "INVALID_INPUT");
}

#[tokio::test]
async fn test_duplicate_semester_number_rejected() {
    let env = ApiTestEnv::new();
    env.state
        .semester_api
        .create_semester(semester(1, 0))
        .await
        .unwrap();

    let err = env
        .state
        .semester_api
        .create_semester(semester(1, 10))
        .await
        .unwrap_err();
    assert_api_code(&err, "DUPLICATE_SEMESTER_NUMBER");
}

#[tokio::test]
async fn test_course_cost_outside_range_rejected() {
    let env = ApiTestEnv::new();
    let course = CourseBuilder::new("Physics").credits(5).cost(1000.0).build();

    let err = env.state.course_api.create_course(course).await.unwrap_err();
    assert_api_code(&err, "COST_OUT_OF_RANGE");
}

// ==========================================
// 先修关系 / 折扣组维护
// ==========================================

#[tokio::test]
async fn test_prerequisite_cycle_surfaces_rule_violation() {
    let env = ApiTestEnv::new();
    let api = &env.state.course_api;
    let s2 = env.state.semester_api.create_semester(semester(2, 0)).await.unwrap();
    let s3 = env.state.semester_api.create_semester(semester(3, 0)).await.unwrap();
    let x = api.create_course(CourseBuilder::new("X").build()).await.unwrap();
    let y = api.create_course(CourseBuilder::new("Y").build()).await.unwrap();
    for course_id in [x.id, y.id] {
        api.offer_in_semester(course_id, s2.id).await.unwrap();
        api.offer_in_semester(course_id, s3.id).await.unwrap();
    }

    api.add_prerequisite(x.id, y.id, 5).await.unwrap();
    let err = api.add_prerequisite(y.id, x.id, 5).await.unwrap_err();

    assert!(matches!(err, ApiError::RuleViolation { .. }));
    assert_api_code(&err, "CIRCULAR_DEPENDENCY");
    assert_eq!(api.list_prerequisites().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_offering_is_constraint_violation() {
    let env = ApiTestEnv::new();
    let s1 = env.state.semester_api.create_semester(semester(1, 0)).await.unwrap();
    let course = env
        .state
        .course_api
        .create_course(CourseBuilder::new("Logic").build())
        .await
        .unwrap();

    env.state.course_api.offer_in_semester(course.id, s1.id).await.unwrap();
    let err = env
        .state
        .course_api
        .offer_in_semester(course.id, s1.id)
        .await
        .unwrap_err();
    assert_api_code(&err, "CONSTRAINT_VIOLATION");
}

#[tokio::test]
async fn test_discount_group_ignores_repeated_course_ids() {
    let env = ApiTestEnv::new();
    let api = &env.state.course_api;
    let a = api.create_course(CourseBuilder::new("A").build()).await.unwrap();
    let b = api.create_course(CourseBuilder::new("B").build()).await.unwrap();

    let created = api
        .create_discount(3, &[b.id, a.id, b.id, a.id], 15.0)
        .await
        .unwrap();

    let course_ids: Vec<i64> = created.iter().map(|d| d.course_id).collect();
    assert_eq!(course_ids, vec![a.id, b.id]);
    assert_eq!(api.list_discounts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_discount_group_id_must_be_new() {
    let env = ApiTestEnv::new();
    let api = &env.state.course_api;
    let a = api.create_course(CourseBuilder::new("A").build()).await.unwrap();
    let b = api.create_course(CourseBuilder::new("B").build()).await.unwrap();

    let created = api.create_discount(1, &[a.id, b.id], 10.0).await.unwrap();
    assert_eq!(created.len(), 2);

    let err = api.create_discount(1, &[a.id], 20.0).await.unwrap_err();
    assert_api_code(&err, "DUPLICATE_GROUP_ID");

    let err = api.create_discount(2, &[], 20.0).await.unwrap_err();
    assert_api_code(&err, "INVALID_INPUT");
    assert_eq!(api.list_discounts().await.unwrap().len(), 2);
}

// ==========================================
// 完整学期流程
// ==========================================

#[tokio::test]
async fn test_full_semester_flow() {
    let env = ApiTestEnv::new();
    let state = &env.state;
    state
        .config_manager
        .set_global_config_value(config_keys::FAILED_EXAM_REFUND_RATIO, "0.5")
        .unwrap();

    let s1 = state.semester_api.create_semester(semester(1, 10)).await.unwrap();
    let s2 = state.semester_api.create_semester(semester(2, 5)).await.unwrap();
    let a = state
        .course_api
        .create_course(CourseBuilder::new("Algorithms").build())
        .await
        .unwrap();
    let b = state
        .course_api
        .create_course(CourseBuilder::new("Biology").build())
        .await
        .unwrap();
    for course_id in [a.id, b.id] {
        state.course_api.offer_in_semester(course_id, s1.id).await.unwrap();
    }
    state
        .course_api
        .create_discount(1, &[a.id, b.id], 10.0)
        .await
        .unwrap();
    let student = state
        .student_api
        .create_student(StudentBuilder::new("5010101123456").build())
        .await
        .unwrap();

    // 单门 5 学分低于第 1 学期下限 10
    let err = state
        .enrollment_api
        .enroll(student.id, a.id, s1.id, 500.0)
        .await
        .unwrap_err();
    assert_api_code(&err, "INSUFFICIENT_SEMESTER_CREDITS");

    // 下限临时放宽，选完后恢复
    let mut relaxed = s1;
    relaxed.min_credits = 0;
    state.semester_api.update_semester(&relaxed).await.unwrap();
    state.enrollment_api.enroll(student.id, a.id, s1.id, 500.0).await.unwrap();
    state.enrollment_api.enroll(student.id, b.id, s1.id, 500.0).await.unwrap();
    state.semester_api.update_semester(&s1).await.unwrap();

    // 考试：A 先挂后过，B 直接通过
    state.exam_api.take_exam(student.id, a.id, 3, day(2025, 1, 10)).await.unwrap();
    state.exam_api.take_exam(student.id, a.id, 7, day(2025, 2, 10)).await.unwrap();
    state.exam_api.take_exam(student.id, b.id, 8, day(2025, 1, 12)).await.unwrap();

    let enrollments = state.enrollment_api.list_by_student(student.id).await.unwrap();
    let for_a = enrollments.iter().find(|e| e.course_id == a.id).unwrap();
    assert!((for_a.amount_paid - 250.0).abs() < 1e-6);

    let applied = state.student_api.apply_discounts(student.id).await.unwrap();
    assert_eq!(applied.len(), 2);

    let report = state.student_api.credit_report(student.id).await.unwrap();
    assert_eq!(report.get(&1), Some(&10));

    let outcome = state.student_api.promote(student.id).await.unwrap();
    assert_eq!(outcome.to_semester, 2);
    let moved = state.enrollment_api.list_by_student(student.id).await.unwrap();
    assert!(moved.iter().all(|e| e.semester_id == s2.id));
}

#[tokio::test]
async fn test_apply_discounts_for_missing_student() {
    let env = ApiTestEnv::new();
    let err = env.state.student_api.apply_discounts(404).await.unwrap_err();
    assert_api_code(&err, "NOT_FOUND");
}

#[tokio::test]
async fn test_take_exam_without_enrollment_is_precondition_failure() {
    let env = ApiTestEnv::new();
    let course = env
        .state
        .course_api
        .create_course(CourseBuilder::new("Music").build())
        .await
        .unwrap();
    let student = env
        .state
        .student_api
        .create_student(StudentBuilder::new("1990101123456").build())
        .await
        .unwrap();

    let err = env
        .state
        .exam_api
        .take_exam(student.id, course.id, 9, day(2025, 1, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::PreconditionFailed { .. }));
    assert_api_code(&err, "NOT_ENROLLED");
}

// ==========================================
// 记录维护不能绕过核心规则
// ==========================================

#[tokio::test]
async fn test_update_enrollment_keeps_amount_and_offering_rules() {
    let env = ApiTestEnv::new();
    let state = &env.state;
    let s1 = state.semester_api.create_semester(semester(1, 0)).await.unwrap();
    let s2 = state.semester_api.create_semester(semester(2, 0)).await.unwrap();
    let course = state
        .course_api
        .create_course(CourseBuilder::new("Chemistry").build())
        .await
        .unwrap();
    state.course_api.offer_in_semester(course.id, s1.id).await.unwrap();
    let student = state
        .student_api
        .create_student(StudentBuilder::new("1990101123456").build())
        .await
        .unwrap();
    let enrollment = state
        .enrollment_api
        .enroll(student.id, course.id, s1.id, 100.0)
        .await
        .unwrap();

    let mut tampered = enrollment.clone();
    tampered.amount_paid = 9999.0;
    tampered.semester_id = s2.id;
    let err = state
        .enrollment_api
        .update_enrollment(&tampered)
        .await
        .unwrap_err();
    assert_api_code(&err, "AMOUNT_PAID_READ_ONLY");

    tampered.amount_paid = enrollment.amount_paid;
    let err = state
        .enrollment_api
        .update_enrollment(&tampered)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::PreconditionFailed { .. }));
    assert_api_code(&err, "COURSE_NOT_IN_SEMESTER");

    let stored = state
        .enrollment_api
        .get_enrollment(enrollment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, enrollment);
}

#[tokio::test]
async fn test_schedule_exam_enforces_retake_rules() {
    let env = ApiTestEnv::new();
    let state = &env.state;
    let course = state
        .course_api
        .create_course(CourseBuilder::new("Statistics").build())
        .await
        .unwrap();
    let other = state
        .course_api
        .create_course(CourseBuilder::new("Geometry").build())
        .await
        .unwrap();
    let student = state
        .student_api
        .create_student(StudentBuilder::new("1990101123456").build())
        .await
        .unwrap();

    // 默认上限 3 次挂科
    for d in 1..=3 {
        state
            .exam_api
            .schedule_exam(Exam::new(student.id, course.id, 2, day(2025, 3, d)))
            .await
            .unwrap();
    }
    let err = state
        .exam_api
        .schedule_exam(Exam::new(student.id, course.id, 2, day(2025, 3, 4)))
        .await
        .unwrap_err();
    assert_api_code(&err, "MAX_ATTEMPTS_REACHED");

    state
        .exam_api
        .schedule_exam(Exam::new(student.id, other.id, 8, day(2025, 3, 10)))
        .await
        .unwrap();
    let err = state
        .exam_api
        .schedule_exam(Exam::new(student.id, other.id, 9, day(2025, 3, 11)))
        .await
        .unwrap_err();
    assert_api_code(&err, "ALREADY_PASSED");

    assert_eq!(state.exam_api.list_by_student(student.id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_update_exam_cannot_add_pass_before_existing_pass() {
    let env = ApiTestEnv::new();
    let state = &env.state;
    let course = state
        .course_api
        .create_course(CourseBuilder::new("Economics").build())
        .await
        .unwrap();
    let student = state
        .student_api
        .create_student(StudentBuilder::new("1990101123456").build())
        .await
        .unwrap();
    let failed = state
        .exam_api
        .schedule_exam(Exam::new(student.id, course.id, 4, day(2025, 4, 1)))
        .await
        .unwrap();
    state
        .exam_api
        .schedule_exam(Exam::new(student.id, course.id, 7, day(2025, 4, 8)))
        .await
        .unwrap();

    let mut regraded = failed.clone();
    regraded.grade = 10;
    let err = state.exam_api.update_exam(&regraded).await.unwrap_err();
    assert_api_code(&err, "ALREADY_PASSED");

    regraded.grade = 3;
    state.exam_api.update_exam(&regraded).await.unwrap();
    let stored = state.exam_api.get_exam(failed.id).await.unwrap().unwrap();
    assert_eq!(stored.grade, 3);
}
