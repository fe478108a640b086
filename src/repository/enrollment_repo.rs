// ==========================================
// 高校学籍记录系统 - 选课数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: (student_id, course_id) 唯一约束由数据库兜底
// ==========================================

use crate::domain::Enrollment;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::{EnrollmentRepository, EntityRepository};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteEnrollmentRepository - 选课仓储
// ==========================================
pub struct SqliteEnrollmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEnrollmentRepository {
    /// 创建新的仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

fn map_enrollment(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        id: row.get(0)?,
        student_id: row.get(1)?,
        course_id: row.get(2)?,
        semester_id: row.get(3)?,
        amount_paid: row.get(4)?,
    })
}

#[async_trait]
impl EntityRepository<Enrollment> for SqliteEnrollmentRepository {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Enrollment>> {
        let conn = self.get_conn()?;
        let enrollment = conn
            .query_row(
                r#"
                SELECT id, student_id, course_id, semester_id, amount_paid
                FROM enrollment WHERE id = ?1
                "#,
                params![id],
                map_enrollment,
            )
            .optional()?;
        Ok(enrollment)
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Enrollment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, student_id, course_id, semester_id, amount_paid
            FROM enrollment ORDER BY id ASC
            "#,
        )?;
        let enrollments = stmt
            .query_map([], map_enrollment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(enrollments)
    }

    async fn add(&self, enrollment: &Enrollment) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO enrollment (student_id, course_id, semester_id, amount_paid)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                enrollment.student_id,
                enrollment.course_id,
                enrollment.semester_id,
                enrollment.amount_paid,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, enrollment: &Enrollment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE enrollment SET
                student_id = ?2, course_id = ?3, semester_id = ?4, amount_paid = ?5
            WHERE id = ?1
            "#,
            params![
                enrollment.id,
                enrollment.student_id,
                enrollment.course_id,
                enrollment.semester_id,
                enrollment.amount_paid,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Enrollment".to_string(),
                id: enrollment.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM enrollment WHERE id = ?1", params![id])?;
        if affected == 0 {
            tracing::warn!(enrollment_id = id, "删除选课: 记录不存在");
        }
        Ok(())
    }
}

#[async_trait]
impl EnrollmentRepository for SqliteEnrollmentRepository {
    async fn get_by_student(&self, student_id: i64) -> RepositoryResult<Vec<Enrollment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, student_id, course_id, semester_id, amount_paid
            FROM enrollment WHERE student_id = ?1 ORDER BY id ASC
            "#,
        )?;
        let enrollments = stmt
            .query_map(params![student_id], map_enrollment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(enrollments)
    }
}
