// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

use tempfile::NamedTempFile;

use university_records::api::ApiError;
use university_records::app::AppState;

// ==========================================
// API测试环境
// ==========================================

/// API测试环境
///
/// 通过 AppState 组装，与应用启动路径一致
pub struct ApiTestEnv {
    pub _temp_file: NamedTempFile,
    pub db_path: String,
    pub state: AppState,
}

impl ApiTestEnv {
    pub fn new() -> Self {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_str().unwrap().to_string();
        let state = AppState::new(db_path.clone()).expect("Failed to create AppState");
        Self {
            _temp_file: temp_file,
            db_path,
            state,
        }
    }
}

/// 断言错误携带指定稳定码
pub fn assert_api_code(err: &ApiError, expected: &str) {
    assert_eq!(err.code(), expected, "unexpected error: {}", err);
}
