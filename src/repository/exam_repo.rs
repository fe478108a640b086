// ==========================================
// 高校学籍记录系统 - 考试数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: exam_date 经 rusqlite chrono 特性读写 (YYYY-MM-DD HH:MM:SS)
// ==========================================

use crate::domain::Exam;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::{EntityRepository, ExamRepository};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteExamRepository - 考试仓储
// ==========================================
pub struct SqliteExamRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteExamRepository {
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

fn map_exam(row: &Row<'_>) -> rusqlite::Result<Exam> {
    Ok(Exam {
        id: row.get(0)?,
        student_id: row.get(1)?,
        course_id: row.get(2)?,
        date: row.get(3)?,
        grade: row.get(4)?,
    })
}

#[async_trait]
impl EntityRepository<Exam> for SqliteExamRepository {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Exam>> {
        let conn = self.get_conn()?;
        let exam = conn
            .query_row(
                "SELECT id, student_id, course_id, exam_date, grade FROM exam WHERE id = ?1",
                params![id],
                map_exam,
            )
            .optional()?;
        Ok(exam)
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Exam>> {
        let conn = self.get_conn()?;
        let mut stmt = conn
            .prepare("SELECT id, student_id, course_id, exam_date, grade FROM exam ORDER BY id ASC")?;
        let exams = stmt
            .query_map([], map_exam)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(exams)
    }

    async fn add(&self, exam: &Exam) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO exam (student_id, course_id, exam_date, grade) VALUES (?1, ?2, ?3, ?4)",
            params![exam.student_id, exam.course_id, exam.date, exam.grade],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, exam: &Exam) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE exam SET student_id = ?2, course_id = ?3, exam_date = ?4, grade = ?5
            WHERE id = ?1
            "#,
            params![exam.id, exam.student_id, exam.course_id, exam.date, exam.grade],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Exam".to_string(),
                id: exam.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM exam WHERE id = ?1", params![id])?;
        if affected == 0 {
            tracing::warn!(exam_id = id, "删除考试: 记录不存在");
        }
        Ok(())
    }
}

#[async_trait]
impl ExamRepository for SqliteExamRepository {
    async fn get_by_student(&self, student_id: i64) -> RepositoryResult<Vec<Exam>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, student_id, course_id, exam_date, grade
            FROM exam WHERE student_id = ?1
            ORDER BY exam_date ASC, id ASC
            "#,
        )?;
        let exams = stmt
            .query_map(params![student_id], map_exam)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(exams)
    }
}
