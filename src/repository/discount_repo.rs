// ==========================================
// 高校学籍记录系统 - 课程组合折扣数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（折扣择优在引擎层完成）
// ==========================================

use crate::domain::CourseDiscount;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::{CourseDiscountRepository, EntityRepository};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteDiscountRepository - 折扣仓储
// ==========================================
pub struct SqliteDiscountRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDiscountRepository {
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

fn map_discount(row: &Row<'_>) -> rusqlite::Result<CourseDiscount> {
    Ok(CourseDiscount {
        id: row.get(0)?,
        group_id: row.get(1)?,
        course_id: row.get(2)?,
        discount_percentage: row.get(3)?,
    })
}

#[async_trait]
impl EntityRepository<CourseDiscount> for SqliteDiscountRepository {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<CourseDiscount>> {
        let conn = self.get_conn()?;
        let discount = conn
            .query_row(
                r#"
                SELECT id, group_id, course_id, discount_percentage
                FROM course_discount WHERE id = ?1
                "#,
                params![id],
                map_discount,
            )
            .optional()?;
        Ok(discount)
    }

    async fn get_all(&self) -> RepositoryResult<Vec<CourseDiscount>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, group_id, course_id, discount_percentage
            FROM course_discount ORDER BY id ASC
            "#,
        )?;
        let discounts = stmt
            .query_map([], map_discount)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(discounts)
    }

    async fn add(&self, discount: &CourseDiscount) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO course_discount (group_id, course_id, discount_percentage)
            VALUES (?1, ?2, ?3)
            "#,
            params![discount.group_id, discount.course_id, discount.discount_percentage],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, discount: &CourseDiscount) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE course_discount SET group_id = ?2, course_id = ?3, discount_percentage = ?4
            WHERE id = ?1
            "#,
            params![
                discount.id,
                discount.group_id,
                discount.course_id,
                discount.discount_percentage,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "CourseDiscount".to_string(),
                id: discount.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM course_discount WHERE id = ?1", params![id])?;
        if affected == 0 {
            tracing::warn!(discount_id = id, "删除折扣: 记录不存在");
        }
        Ok(())
    }
}

#[async_trait]
impl CourseDiscountRepository for SqliteDiscountRepository {
    async fn exists_group_id(&self, group_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM course_discount WHERE group_id = ?1)",
            params![group_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    async fn get_course_ids_by_group_id(&self, group_id: i64) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT course_id FROM course_discount WHERE group_id = ?1 ORDER BY id ASC",
        )?;
        let ids = stmt
            .query_map(params![group_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }
}
