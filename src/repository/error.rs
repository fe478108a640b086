// ==========================================
// 高校学籍记录系统 - 仓储层错误类型
// ==========================================
// 职责: 把 SQLite 失败归类为学籍库可理解的存储错误
// 约定: 约束类失败单独成型，由 API 层映射为 CONSTRAINT_VIOLATION
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 按主键更新时记录不存在
    #[error("{entity}(id={id})不存在")]
    NotFound { entity: String, id: String },

    /// 共享连接的互斥锁已中毒
    #[error("学籍库连接不可用: {0}")]
    LockError(String),

    #[error("SQL 执行失败: {0}")]
    DatabaseQueryError(String),

    /// 重复的学期序号 / 开设记录 / 折扣条目
    #[error("唯一约束冲突: {0}")]
    UniqueConstraintViolation(String),

    /// 引用的学生、课程或学期不存在
    #[error("引用的记录不存在: {0}")]
    ForeignKeyViolation(String),

    /// 学生 emails / phone_numbers 列的 JSON 无法读写
    #[error("学生联系方式列表损坏: {0}")]
    ContactListCorrupt(String),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "记录".to_string(),
                id: "?".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::ContactListCorrupt(err.to_string())
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
