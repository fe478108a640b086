// ==========================================
// 高校学籍记录系统 - 学生数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: emails / phone_numbers 以 JSON 数组文本存储
// ==========================================

use crate::domain::Student;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traits::{EntityRepository, StudentRepository};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT id, first_name, last_name, cnp, address, univ_code, emails_json, phone_numbers_json
    FROM student
"#;

// ==========================================
// SqliteStudentRepository - 学生仓储
// ==========================================
pub struct SqliteStudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStudentRepository {
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

/// 行映射（JSON 列先取原始文本，解析在外层完成）
fn map_row(row: &Row<'_>) -> rusqlite::Result<(Student, String, String)> {
    Ok((
        Student {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            cnp: row.get(3)?,
            address: row.get(4)?,
            univ_code: row.get(5)?,
            emails: Vec::new(),
            phone_numbers: Vec::new(),
        },
        row.get(6)?,
        row.get(7)?,
    ))
}

fn hydrate(raw: (Student, String, String)) -> RepositoryResult<Student> {
    let (mut student, emails_json, phones_json) = raw;
    student.emails = serde_json::from_str(&emails_json)?;
    student.phone_numbers = serde_json::from_str(&phones_json)?;
    Ok(student)
}

#[async_trait]
impl EntityRepository<Student> for SqliteStudentRepository {
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let raw = conn.query_row(&sql, params![id], map_row).optional()?;
        raw.map(hydrate).transpose()
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY id ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let raws = stmt
            .query_map([], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(hydrate).collect()
    }

    async fn add(&self, student: &Student) -> RepositoryResult<i64> {
        let emails_json = serde_json::to_string(&student.emails)?;
        let phones_json = serde_json::to_string(&student.phone_numbers)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO student (
                first_name, last_name, cnp, address, univ_code, emails_json, phone_numbers_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                student.first_name,
                student.last_name,
                student.cnp,
                student.address,
                student.univ_code,
                emails_json,
                phones_json,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    async fn update(&self, student: &Student) -> RepositoryResult<()> {
        let emails_json = serde_json::to_string(&student.emails)?;
        let phones_json = serde_json::to_string(&student.phone_numbers)?;

        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE student SET
                first_name = ?2, last_name = ?3, cnp = ?4, address = ?5,
                univ_code = ?6, emails_json = ?7, phone_numbers_json = ?8
            WHERE id = ?1
            "#,
            params![
                student.id,
                student.first_name,
                student.last_name,
                student.cnp,
                student.address,
                student.univ_code,
                emails_json,
                phones_json,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Student".to_string(),
                id: student.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM student WHERE id = ?1", params![id])?;
        if affected == 0 {
            tracing::warn!(student_id = id, "删除学生: 记录不存在");
        }
        Ok(())
    }
}

impl StudentRepository for SqliteStudentRepository {}
