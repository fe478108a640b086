// ==========================================
// 高校学籍记录系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{CourseApi, EnrollmentApi, ExamApi, SemesterApi, StudentApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::PolicyRepositories;

/// 应用状态
///
/// 包含所有API实例和共享资源，所有仓储共用同一个数据库连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 学生管理API
    pub student_api: Arc<StudentApi>,

    /// 课程管理API
    pub course_api: Arc<CourseApi>,

    /// 学期管理API
    pub semester_api: Arc<SemesterApi>,

    /// 选课管理API
    pub enrollment_api: Arc<EnrollmentApi>,

    /// 考试管理API（政策参数来自 config_kv）
    pub exam_api: Arc<ExamApi<ConfigManager>>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开共享连接并确保表结构存在
    /// 2. 初始化所有Repository
    /// 3. 创建所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn =
            open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("无法初始化表结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let repos = PolicyRepositories::sqlite(conn.clone());
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let student_api = Arc::new(StudentApi::new(repos.clone()));
        let course_api = Arc::new(CourseApi::new(repos.clone()));
        let semester_api = Arc::new(SemesterApi::new(repos.clone()));
        let enrollment_api = Arc::new(EnrollmentApi::new(repos.clone()));
        let exam_api = Arc::new(ExamApi::new(repos, config_manager.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            student_api,
            course_api,
            semester_api,
            enrollment_api,
            exam_api,
            config_manager,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 环境变量 UNIVERSITY_RECORDS_DB_PATH 非空时直接使用
/// - 否则: 用户数据目录/university-records/university_records.db
/// - 拿不到用户数据目录时回退到 ./university_records.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("UNIVERSITY_RECORDS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./university_records.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("university-records");
        // 目录创建失败时沿用当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("university_records.db");
        }
    }

    path.to_string_lossy().to_string()
}
