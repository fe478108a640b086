// ==========================================
// 高校学籍记录系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::policy_config_trait::PolicyConfigReader;
use crate::db::open_sqlite_connection;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// 配置作用域（当前仅使用 global）
pub const GLOBAL_SCOPE: &str = "global";

/// 默认最大不及格次数
pub const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 3;
/// 默认不及格退费比例
pub const DEFAULT_FAILED_EXAM_REFUND_RATIO: f64 = 0.5;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')
            "#,
            params![GLOBAL_SCOPE, key, value],
        )?;
        tracing::info!(config_key = key, config_value = value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 返回
    /// - Ok(String): 配置快照的JSON字符串（键有序）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖同名的 global 配置，快照中没有的键保持不变
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> RepositoryResult<usize> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                r#"
                INSERT INTO config_kv (scope_id, key, value, updated_at)
                VALUES (?1, ?2, ?3, datetime('now'))
                ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')
                "#,
                params![GLOBAL_SCOPE, key, value],
            )?;
        }

        tx.commit()?;
        tracing::info!(restored = count, "配置快照已恢复");
        Ok(count)
    }
}

// ==========================================
// 配置值解析（纯函数，便于单测）
// ==========================================

/// 解析最大不及格次数，非法值返回 None
pub(crate) fn parse_max_failed_attempts(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// 解析退费比例，超出 [0, 1] 的值被截断，非数值返回 None
pub(crate) fn parse_refund_ratio(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 1.0))
}

#[async_trait]
impl PolicyConfigReader for ConfigManager {
    async fn get_max_failed_attempts(&self) -> RepositoryResult<u32> {
        let Some(raw) = self.get_config_value(config_keys::MAX_FAILED_ATTEMPTS)? else {
            return Ok(DEFAULT_MAX_FAILED_ATTEMPTS);
        };

        match parse_max_failed_attempts(&raw) {
            Some(v) => Ok(v),
            None => {
                tracing::warn!(
                    config_key = config_keys::MAX_FAILED_ATTEMPTS,
                    raw_value = %raw,
                    default = DEFAULT_MAX_FAILED_ATTEMPTS,
                    "配置值非法，使用默认值"
                );
                Ok(DEFAULT_MAX_FAILED_ATTEMPTS)
            }
        }
    }

    async fn get_failed_exam_refund_ratio(&self) -> RepositoryResult<f64> {
        let Some(raw) = self.get_config_value(config_keys::FAILED_EXAM_REFUND_RATIO)? else {
            return Ok(DEFAULT_FAILED_EXAM_REFUND_RATIO);
        };

        match parse_refund_ratio(&raw) {
            Some(v) => Ok(v),
            None => {
                tracing::warn!(
                    config_key = config_keys::FAILED_EXAM_REFUND_RATIO,
                    raw_value = %raw,
                    default = DEFAULT_FAILED_EXAM_REFUND_RATIO,
                    "配置值非法，使用默认值"
                );
                Ok(DEFAULT_FAILED_EXAM_REFUND_RATIO)
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 考试重修
    pub const MAX_FAILED_ATTEMPTS: &str = "max_failed_attempts";

    // 不及格退费
    pub const FAILED_EXAM_REFUND_RATIO: &str = "failed_exam_refund_ratio";
}
