// ==========================================
// 高校学籍记录系统 - 先修关系数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（环检测在引擎层完成）
// ==========================================

use crate::domain::CoursePrerequisite;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::{CoursePrerequisiteRepository, EntityRepository};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SqlitePrerequisiteRepository - 先修关系仓储
// ==========================================
pub struct SqlitePrerequisiteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePrerequisiteRepository {
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

fn map_edge(row: &Row<'_>) -> rusqlite::Result<CoursePrerequisite> {
    Ok(CoursePrerequisite {
        id: row.get(0)?,
        course_id: row.get(1)?,
        prereq_id: row.get(2)?,
        min_grade: row.get(3)?,
    })
}

#[async_trait]
impl EntityRepository<CoursePrerequisite> for SqlitePrerequisiteRepository {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<CoursePrerequisite>> {
        let conn = self.get_conn()?;
        let edge = conn
            .query_row(
                "SELECT id, course_id, prereq_id, min_grade FROM course_prerequisite WHERE id = ?1",
                params![id],
                map_edge,
            )
            .optional()?;
        Ok(edge)
    }

    async fn get_all(&self) -> RepositoryResult<Vec<CoursePrerequisite>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, course_id, prereq_id, min_grade FROM course_prerequisite ORDER BY id ASC",
        )?;
        let edges = stmt
            .query_map([], map_edge)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    async fn add(&self, edge: &CoursePrerequisite) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO course_prerequisite (course_id, prereq_id, min_grade) VALUES (?1, ?2, ?3)",
            params![edge.course_id, edge.prereq_id, edge.min_grade],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, edge: &CoursePrerequisite) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE course_prerequisite SET course_id = ?2, prereq_id = ?3, min_grade = ?4
            WHERE id = ?1
            "#,
            params![edge.id, edge.course_id, edge.prereq_id, edge.min_grade],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "CoursePrerequisite".to_string(),
                id: edge.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM course_prerequisite WHERE id = ?1", params![id])?;
        if affected == 0 {
            tracing::warn!(prerequisite_id = id, "删除先修关系: 记录不存在");
        }
        Ok(())
    }
}

impl CoursePrerequisiteRepository for SqlitePrerequisiteRepository {}
