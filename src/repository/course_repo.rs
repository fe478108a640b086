// ==========================================
// 高校学籍记录系统 - 课程与开设学期数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 管理 course / course_semester 表的 CRUD 操作
// ==========================================

use crate::domain::{Course, CourseSemester};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::{CourseRepository, CourseSemesterRepository, EntityRepository};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteCourseRepository - 课程仓储
// ==========================================
pub struct SqliteCourseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCourseRepository {
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

fn map_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        credits: row.get(3)?,
        cost: row.get(4)?,
        min_cost_per_credit: row.get(5)?,
        max_cost_per_credit: row.get(6)?,
    })
}

#[async_trait]
impl EntityRepository<Course> for SqliteCourseRepository {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Course>> {
        let conn = self.get_conn()?;
        let course = conn
            .query_row(
                r#"
                SELECT id, name, description, credits, cost, min_cost_per_credit, max_cost_per_credit
                FROM course WHERE id = ?1
                "#,
                params![id],
                map_course,
            )
            .optional()?;
        Ok(course)
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Course>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, name, description, credits, cost, min_cost_per_credit, max_cost_per_credit
            FROM course ORDER BY id ASC
            "#,
        )?;
        let courses = stmt
            .query_map([], map_course)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(courses)
    }

    async fn add(&self, course: &Course) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO course (
                name, description, credits, cost, min_cost_per_credit, max_cost_per_credit
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                course.name,
                course.description,
                course.credits,
                course.cost,
                course.min_cost_per_credit,
                course.max_cost_per_credit,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, course: &Course) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE course SET
                name = ?2, description = ?3, credits = ?4, cost = ?5,
                min_cost_per_credit = ?6, max_cost_per_credit = ?7
            WHERE id = ?1
            "#,
            params![
                course.id,
                course.name,
                course.description,
                course.credits,
                course.cost,
                course.min_cost_per_credit,
                course.max_cost_per_credit,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Course".to_string(),
                id: course.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM course WHERE id = ?1", params![id])?;
        if affected == 0 {
            tracing::warn!(course_id = id, "删除课程: 记录不存在");
        }
        Ok(())
    }
}

impl CourseRepository for SqliteCourseRepository {}

// ==========================================
// SqliteCourseSemesterRepository - 课程开设学期仓储
// ==========================================
pub struct SqliteCourseSemesterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCourseSemesterRepository {
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

fn map_offering(row: &Row<'_>) -> rusqlite::Result<CourseSemester> {
    Ok(CourseSemester {
        id: row.get(0)?,
        course_id: row.get(1)?,
        semester_id: row.get(2)?,
    })
}

#[async_trait]
impl EntityRepository<CourseSemester> for SqliteCourseSemesterRepository {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<CourseSemester>> {
        let conn = self.get_conn()?;
        let offering = conn
            .query_row(
                "SELECT id, course_id, semester_id FROM course_semester WHERE id = ?1",
                params![id],
                map_offering,
            )
            .optional()?;
        Ok(offering)
    }

    async fn get_all(&self) -> RepositoryResult<Vec<CourseSemester>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT id, course_id, semester_id FROM course_semester ORDER BY id ASC")?;
        let offerings = stmt
            .query_map([], map_offering)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(offerings)
    }

    async fn add(&self, offering: &CourseSemester) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO course_semester (course_id, semester_id) VALUES (?1, ?2)",
            params![offering.course_id, offering.semester_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, offering: &CourseSemester) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE course_semester SET course_id = ?2, semester_id = ?3 WHERE id = ?1",
            params![offering.id, offering.course_id, offering.semester_id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "CourseSemester".to_string(),
                id: offering.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM course_semester WHERE id = ?1", params![id])?;
        if affected == 0 {
            tracing::warn!(course_semester_id = id, "删除开设记录: 记录不存在");
        }
        Ok(())
    }
}

#[async_trait]
impl CourseSemesterRepository for SqliteCourseSemesterRepository {
    async fn get_by_course(&self, course_id: i64) -> RepositoryResult<Vec<CourseSemester>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, course_id, semester_id FROM course_semester WHERE course_id = ?1 ORDER BY id ASC",
        )?;
        let offerings = stmt
            .query_map(params![course_id], map_offering)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(offerings)
    }
}
