// ==========================================
// 先修关系图校验集成测试
// ==========================================
// 测试目标: 自引用、开设学期约束、环检测，以及校验失败不写库
// ==========================================


use university_records::domain::CoursePrerequisite;
use university_records::engine::prerequisite_graph::build_graph;
use university_records::engine::{
    has_cycle, ErrorCategory, PolicyError, PrerequisiteValidator, RejectionCode,
};
use test_helpers::TestDb;

/// 第 1/2/3 学期 + 课程 A(第1学期) B(第2学期) C(第2、3学期)
async fn setup_catalogue(db: &TestDb) -> (i64, i64, i64) {
    let s1 = db.seed_semester(1, 0).await;
    let s2 = db.seed_semester(2, 0).await;
    let s3 = db.seed_semester(3, 0).await;

    let a = db.seed_course("Algebra", 5, 500.0).await;
    let b = db.seed_course("Analysis", 5, 500.0).await;
    let c = db.seed_course("Topology", 5, 500.0).await;

    db.seed_offering(a.id, s1.id).await;
    db.seed_offering(b.id, s2.id).await;
    db.seed_offering(c.id, s2.id).await;
    db.seed_offering(c.id, s3.id).await;

    (a.id, b.id, c.id)
}

fn code_of(err: &PolicyError) -> &'static str {
    err.code()
}

#[tokio::test]
async fn test_valid_prerequisite_accepted() {
    let db = TestDb::new();
    let (a, b, _) = setup_catalogue(&db).await;
    let validator = PrerequisiteValidator::new(db.repos.clone());

    let edge = CoursePrerequisite::new(b, a, 5);
    assert!(validator.validate(&edge).await.is_ok());
}

#[tokio::test]
async fn test_self_prerequisite_rejected() {
    let db = TestDb::new();
    let (_, b, _) = setup_catalogue(&db).await;
    let validator = PrerequisiteValidator::new(db.repos.clone());

    let err = validator
        .validate(&CoursePrerequisite::new(b, b, 5))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), "SELF_PREREQUISITE");
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[tokio::test]
async fn test_missing_course_rejected() {
    let db = TestDb::new();
    let (a, _, _) = setup_catalogue(&db).await;
    let validator = PrerequisiteValidator::new(db.repos.clone());

    let err = validator
        .validate(&CoursePrerequisite::new(999, a, 5))
        .await
        .unwrap_err();
    assert!(err.has_code(RejectionCode::CourseMustExist));
}

#[tokio::test]
async fn test_existence_checked_before_offerings() {
    let db = TestDb::new();
    setup_catalogue(&db).await;
    let orphan = db.seed_course("Orphan", 5, 500.0).await;
    let validator = PrerequisiteValidator::new(db.repos.clone());

    // 课程存在但未开设，先修课程不存在：先报不存在
    let err = validator
        .validate(&CoursePrerequisite::new(orphan.id, 999, 5))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), "COURSE_MUST_EXIST");
}

#[tokio::test]
async fn test_unscheduled_course_rejected() {
    let db = TestDb::new();
    let (a, _, _) = setup_catalogue(&db).await;
    let orphan = db.seed_course("Orphan", 5, 500.0).await;
    let validator = PrerequisiteValidator::new(db.repos.clone());

    let err = validator
        .validate(&CoursePrerequisite::new(orphan.id, a, 5))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), "UNSCHEDULED_COURSE");
}

#[tokio::test]
async fn test_first_semester_course_cannot_have_prerequisite() {
    let db = TestDb::new();
    let (a, b, _) = setup_catalogue(&db).await;
    let validator = PrerequisiteValidator::new(db.repos.clone());

    // A 只开设在第 1 学期
    let err = validator
        .validate(&CoursePrerequisite::new(a, b, 5))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), "MINIMUM_SEMESTER_NOT_MET");
}

#[tokio::test]
async fn test_prerequisite_must_be_offered_earlier() {
    let db = TestDb::new();
    let (_, b, c) = setup_catalogue(&db).await;
    let s4 = db.seed_semester(4, 0).await;
    let late = db.seed_course("Late", 5, 500.0).await;
    db.seed_offering(late.id, s4.id).await;
    let validator = PrerequisiteValidator::new(db.repos.clone());

    // B(第2学期) 依赖 Late(第4学期)：没有更早的开设
    let err = validator
        .validate(&CoursePrerequisite::new(b, late.id, 5))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), "PREREQUISITE_NOT_EARLIER");

    // C(第2、3学期) 依赖 B(第2学期)：2 < 3 即可
    assert!(validator
        .validate(&CoursePrerequisite::new(c, b, 5))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_min_grade_out_of_range_is_structural() {
    let db = TestDb::new();
    let (a, b, _) = setup_catalogue(&db).await;
    let validator = PrerequisiteValidator::new(db.repos.clone());

    let err = validator
        .validate(&CoursePrerequisite::new(b, a, 11))
        .await
        .unwrap_err();
    assert!(matches!(err, PolicyError::Invalid { .. }));
    assert_eq!(code_of(&err), "OUT_OF_RANGE");
}

#[tokio::test]
async fn test_cycle_rejected_and_not_persisted() {
    let db = TestDb::new();
    let s2 = db.seed_semester(2, 0).await;
    let s3 = db.seed_semester(3, 0).await;
    let x = db.seed_course("X", 5, 500.0).await;
    let y = db.seed_course("Y", 5, 500.0).await;
    for course in [&x, &y] {
        db.seed_offering(course.id, s2.id).await;
        db.seed_offering(course.id, s3.id).await;
    }
    let validator = PrerequisiteValidator::new(db.repos.clone());

    let first = CoursePrerequisite::new(x.id, y.id, 5);
    validator.validate(&first).await.unwrap();
    db.repos.prerequisites.add(&first).await.unwrap();

    let err = validator
        .validate(&CoursePrerequisite::new(y.id, x.id, 5))
        .await
        .unwrap_err();
    assert_eq!(code_of(&err), "CIRCULAR_DEPENDENCY");
    assert_eq!(db.count_rows("course_prerequisite"), 1);
}

#[tokio::test]
async fn test_transitive_cycle_rejected() {
    let db = TestDb::new();
    let s2 = db.seed_semester(2, 0).await;
    let s3 = db.seed_semester(3, 0).await;
    let mut ids = Vec::new();
    for name in ["P", "Q", "R"] {
        let course = db.seed_course(name, 5, 500.0).await;
        db.seed_offering(course.id, s2.id).await;
        db.seed_offering(course.id, s3.id).await;
        ids.push(course.id);
    }
    db.seed_prerequisite(ids[0], ids[1], 5).await;
    db.seed_prerequisite(ids[1], ids[2], 5).await;
    let validator = PrerequisiteValidator::new(db.repos.clone());

    let err = validator
        .validate(&CoursePrerequisite::new(ids[2], ids[0], 5))
        .await
        .unwrap_err();
    assert!(err.has_code(RejectionCode::CircularDependency));
}

#[tokio::test]
async fn test_update_replaces_existing_edge_in_cycle_check() {
    let db = TestDb::new();
    let s2 = db.seed_semester(2, 0).await;
    let s3 = db.seed_semester(3, 0).await;
    let x = db.seed_course("X", 5, 500.0).await;
    let y = db.seed_course("Y", 5, 500.0).await;
    for course in [&x, &y] {
        db.seed_offering(course.id, s2.id).await;
        db.seed_offering(course.id, s3.id).await;
    }
    let existing = db.seed_prerequisite(x.id, y.id, 5).await;
    let validator = PrerequisiteValidator::new(db.repos.clone());

    // 反转同一条边：原边被替换，不构成环
    let reversed = CoursePrerequisite {
        id: existing.id,
        course_id: y.id,
        prereq_id: x.id,
        min_grade: 6,
    };
    assert!(validator.validate(&reversed).await.is_ok());
}

#[tokio::test]
async fn test_accepted_edges_never_form_cycle() {
    let db = TestDb::new();
    let semesters = [
        db.seed_semester(2, 0).await,
        db.seed_semester(3, 0).await,
        db.seed_semester(4, 0).await,
    ];
    let mut ids = Vec::new();
    for name in ["C1", "C2", "C3", "C4", "C5", "C6"] {
        let course = db.seed_course(name, 5, 500.0).await;
        for semester in &semesters {
            db.seed_offering(course.id, semester.id).await;
        }
        ids.push(course.id);
    }
    let validator = PrerequisiteValidator::new(db.repos.clone());

    // 所有有序对都满足学期约束，是否接受只取决于环检测
    let mut accepted = Vec::new();
    let mut cycle_rejections = 0;
    for &course_id in &ids {
        for &prereq_id in &ids {
            if course_id == prereq_id {
                continue;
            }
            let edge = CoursePrerequisite::new(course_id, prereq_id, 5);
            match validator.validate(&edge).await {
                Ok(()) => {
                    db.repos.prerequisites.add(&edge).await.unwrap();
                    accepted.push((course_id, prereq_id));
                }
                Err(err) => {
                    assert_eq!(code_of(&err), "CIRCULAR_DEPENDENCY");
                    cycle_rejections += 1;
                }
            }
        }
    }

    assert!(!accepted.is_empty());
    assert!(cycle_rejections > 0);
    assert!(!has_cycle(&build_graph(accepted.iter().copied())));

    let stored = db.repos.prerequisites.get_all().await.unwrap();
    assert_eq!(stored.len(), accepted.len());
    assert!(!has_cycle(&build_graph(
        stored.iter().map(|e| (e.course_id, e.prereq_id))
    )));
}
