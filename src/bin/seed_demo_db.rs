use chrono::{Local, NaiveDate, NaiveDateTime};
use std::error::Error;
use std::fs;
use std::path::Path;

use university_records::app::{get_default_db_path, AppState};
use university_records::config::config_keys;
use university_records::db::open_sqlite_connection;
use university_records::domain::{Course, Semester, Student};
use university_records::logging;

// 演示政策参数
const DEMO_MAX_FAILED_ATTEMPTS: &str = "3";
const DEMO_REFUND_RATIO: &str = "0.5";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let state = AppState::new(db_path.clone())?;
    state
        .config_manager
        .set_global_config_value(config_keys::MAX_FAILED_ATTEMPTS, DEMO_MAX_FAILED_ATTEMPTS)?;
    state
        .config_manager
        .set_global_config_value(config_keys::FAILED_EXAM_REFUND_RATIO, DEMO_REFUND_RATIO)?;

    seed_demo_scenario(&state).await?;
    print_quick_counts(&db_path)?;

    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

/// 演示场景：两学期课程目录、一名学生完成第一学期并升入第二学期
async fn seed_demo_scenario(state: &AppState) -> Result<(), Box<dyn Error>> {
    // ===== 学期 =====
    let sem1 = state
        .semester_api
        .create_semester(Semester { id: 0, number: 1, min_credits: 5 })
        .await?;
    let sem2 = state
        .semester_api
        .create_semester(Semester { id: 0, number: 2, min_credits: 5 })
        .await?;
    state
        .semester_api
        .create_semester(Semester { id: 0, number: 3, min_credits: 0 })
        .await?;

    // ===== 课程 =====
    let programming_1 = state
        .course_api
        .create_course(demo_course("Programming I", 5, 500.0))
        .await?;
    let mathematics = state
        .course_api
        .create_course(demo_course("Mathematics", 5, 500.0))
        .await?;
    let programming_2 = state
        .course_api
        .create_course(demo_course("Programming II", 6, 600.0))
        .await?;

    state.course_api.offer_in_semester(programming_1.id, sem1.id).await?;
    state.course_api.offer_in_semester(mathematics.id, sem1.id).await?;
    state.course_api.offer_in_semester(programming_2.id, sem2.id).await?;

    state
        .course_api
        .add_prerequisite(programming_2.id, programming_1.id, 5)
        .await?;
    state
        .course_api
        .create_discount(1, &[programming_1.id, mathematics.id], 10.0)
        .await?;

    // ===== 学生 =====
    let student = state
        .student_api
        .create_student(Student {
            id: 0,
            first_name: "Ana".to_string(),
            last_name: "Popescu".to_string(),
            cnp: "2990101123456".to_string(),
            address: "Str. Universitatii 1, Iasi".to_string(),
            univ_code: "UAIC".to_string(),
            emails: vec!["ana.popescu@example.com".to_string()],
            phone_numbers: vec![],
        })
        .await?;

    state
        .enrollment_api
        .enroll(student.id, programming_1.id, sem1.id, 500.0)
        .await?;
    state
        .enrollment_api
        .enroll(student.id, mathematics.id, sem1.id, 500.0)
        .await?;

    // 第一次不及格（触发退费），第二次通过
    state
        .exam_api
        .take_exam(student.id, programming_1.id, 4, demo_date(2025, 1, 20)?)
        .await?;
    state
        .exam_api
        .take_exam(student.id, programming_1.id, 8, demo_date(2025, 2, 10)?)
        .await?;
    state
        .exam_api
        .take_exam(student.id, mathematics.id, 9, demo_date(2025, 1, 24)?)
        .await?;

    let applied = state.student_api.apply_discounts(student.id).await?;
    eprintln!("Applied discounts: {}", applied.len());

    let outcome = state.student_api.promote(student.id).await?;
    eprintln!(
        "Promoted student {} from semester {} to {} ({} credits)",
        outcome.student_id, outcome.from_semester, outcome.to_semester, outcome.earned_credits
    );

    let report = state.student_api.credit_report(student.id).await?;
    for (number, credits) in &report {
        eprintln!("  semester {:<3} credits {}", number, credits);
    }

    Ok(())
}

fn demo_course(name: &str, credits: i32, cost: f64) -> Course {
    Course {
        id: 0,
        name: name.to_string(),
        description: format!("{} (demo)", name),
        credits,
        cost,
        min_cost_per_credit: 80.0,
        max_cost_per_credit: 120.0,
    }
}

fn demo_date(year: i32, month: u32, day: u32) -> Result<NaiveDateTime, Box<dyn Error>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .ok_or_else(|| format!("非法日期 {}-{}-{}", year, month, day).into())
}

fn print_quick_counts(db_path: &str) -> Result<(), Box<dyn Error>> {
    let conn = open_sqlite_connection(db_path)?;
    let tables = [
        "config_kv",
        "student",
        "course",
        "semester",
        "course_semester",
        "course_prerequisite",
        "enrollment",
        "exam",
        "course_discount",
    ];

    eprintln!("Row counts:");
    for t in tables {
        let sql = format!("SELECT COUNT(*) FROM {}", t);
        let c: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        eprintln!("  {:<28} {}", t, c);
    }
    Ok(())
}
