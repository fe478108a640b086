// ==========================================
// 组合折扣引擎集成测试
// ==========================================
// 测试目标: 组生效判定、同课程取最大折扣、折扣写回课程费用、重复调用叠加
// ==========================================


use test_helpers::TestDb;
use university_records::domain::Student;
use university_records::engine::DiscountEngine;

const EPSILON: f64 = 1e-6;

async fn cost_of(db: &TestDb, course_id: i64) -> f64 {
    db.repos
        .courses
        .get_by_id(course_id)
        .await
        .unwrap()
        .unwrap()
        .cost
}

/// 学生选修 A、B（各 5 学分、费用 500），C 未选
async fn setup(db: &TestDb) -> (Student, i64, i64, i64) {
    let sem = db.seed_semester(1, 0).await;
    let a = db.seed_course("Anatomy", 5, 500.0).await;
    let b = db.seed_course("Botany", 5, 500.0).await;
    let c = db.seed_course("Chemistry", 5, 500.0).await;
    let student = db.seed_student("2990101123456").await;
    db.seed_enrollment(student.id, a.id, sem.id, 500.0).await;
    db.seed_enrollment(student.id, b.id, sem.id, 500.0).await;
    (student, a.id, b.id, c.id)
}

#[tokio::test]
async fn test_largest_discount_wins_per_course() {
    let db = TestDb::new();
    let (student, a, b, _c) = setup(&db).await;
    db.seed_discount(1, a, 10.0).await;
    db.seed_discount(1, b, 10.0).await;
    db.seed_discount(2, a, 20.0).await;

    let engine = DiscountEngine::new(db.repos.clone());
    let applied = engine.apply_discounts(&student).await.unwrap();

    assert_eq!(applied.len(), 2);
    assert!((cost_of(&db, a).await - 400.0).abs() < EPSILON);
    assert!((cost_of(&db, b).await - 450.0).abs() < EPSILON);

    let for_a = applied.iter().find(|d| d.course_id == a).unwrap();
    assert!((for_a.percentage - 20.0).abs() < EPSILON);
    assert!((for_a.cost_before - 500.0).abs() < EPSILON);
}

#[tokio::test]
async fn test_single_course_group() {
    let db = TestDb::new();
    let sem = db.seed_semester(1, 0).await;
    let course = db.seed_course("Ethics", 2, 200.0).await;
    let student = db.seed_student("2990101123456").await;
    db.seed_enrollment(student.id, course.id, sem.id, 200.0).await;
    db.seed_discount(7, course.id, 25.0).await;

    let engine = DiscountEngine::new(db.repos.clone());
    engine.apply_discounts(&student).await.unwrap();

    assert!((cost_of(&db, course.id).await - 150.0).abs() < EPSILON);
}

#[tokio::test]
async fn test_group_requires_every_course_enrolled() {
    let db = TestDb::new();
    let (student, a, _b, c) = setup(&db).await;
    db.seed_discount(3, a, 30.0).await;
    db.seed_discount(3, c, 30.0).await;

    let engine = DiscountEngine::new(db.repos.clone());
    let applied = engine.apply_discounts(&student).await.unwrap();

    assert!(applied.is_empty());
    assert!((cost_of(&db, a).await - 500.0).abs() < EPSILON);
}

#[tokio::test]
async fn test_repeated_application_compounds() {
    let db = TestDb::new();
    let (student, a, b, _c) = setup(&db).await;
    db.seed_discount(1, a, 10.0).await;
    db.seed_discount(1, b, 10.0).await;

    let engine = DiscountEngine::new(db.repos.clone());
    engine.apply_discounts(&student).await.unwrap();
    engine.apply_discounts(&student).await.unwrap();

    assert!((cost_of(&db, a).await - 405.0).abs() < EPSILON);
}

#[tokio::test]
async fn test_no_enrollments_is_noop() {
    let db = TestDb::new();
    let course = db.seed_course("Anatomy", 5, 500.0).await;
    let student = db.seed_student("2990101123456").await;
    db.seed_discount(1, course.id, 50.0).await;

    let engine = DiscountEngine::new(db.repos.clone());
    let applied = engine.apply_discounts(&student).await.unwrap();

    assert!(applied.is_empty());
    assert!((cost_of(&db, course.id).await - 500.0).abs() < EPSILON);
}

#[tokio::test]
async fn test_invalid_group_is_skipped() {
    let db = TestDb::new();
    let (student, a, b, _c) = setup(&db).await;
    // 百分比越界的组跳过，其他组照常生效
    db.seed_discount(4, a, 150.0).await;
    db.seed_discount(5, b, 10.0).await;

    let engine = DiscountEngine::new(db.repos.clone());
    let applied = engine.apply_discounts(&student).await.unwrap();

    assert_eq!(applied.len(), 1);
    assert!((cost_of(&db, a).await - 500.0).abs() < EPSILON);
    assert!((cost_of(&db, b).await - 450.0).abs() < EPSILON);
}
