// ==========================================
// 高校学籍记录系统 - 学期数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::Semester;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::{EntityRepository, SemesterRepository};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteSemesterRepository - 学期仓储
// ==========================================
pub struct SqliteSemesterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSemesterRepository {
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

fn map_semester(row: &Row<'_>) -> rusqlite::Result<Semester> {
    Ok(Semester {
        id: row.get(0)?,
        number: row.get(1)?,
        min_credits: row.get(2)?,
    })
}

#[async_trait]
impl EntityRepository<Semester> for SqliteSemesterRepository {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Semester>> {
        let conn = self.get_conn()?;
        let semester = conn
            .query_row(
                "SELECT id, number, min_credits FROM semester WHERE id = ?1",
                params![id],
                map_semester,
            )
            .optional()?;
        Ok(semester)
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Semester>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, number, min_credits FROM semester ORDER BY id ASC")?;
        let semesters = stmt
            .query_map([], map_semester)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(semesters)
    }

    async fn add(&self, semester: &Semester) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO semester (number, min_credits) VALUES (?1, ?2)",
            params![semester.number, semester.min_credits],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, semester: &Semester) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE semester SET number = ?2, min_credits = ?3 WHERE id = ?1",
            params![semester.id, semester.number, semester.min_credits],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Semester".to_string(),
                id: semester.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM semester WHERE id = ?1", params![id])?;
        if affected == 0 {
            tracing::warn!(semester_id = id, "删除学期: 记录不存在");
        }
        Ok(())
    }
}

#[async_trait]
impl SemesterRepository for SqliteSemesterRepository {
    async fn get_by_number(&self, number: i32) -> RepositoryResult<Option<Semester>> {
        let conn = self.get_conn()?;
        let semester = conn
            .query_row(
                "SELECT id, number, min_credits FROM semester WHERE number = ?1",
                params![number],
                map_semester,
            )
            .optional()?;
        Ok(semester)
    }
}
