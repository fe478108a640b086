// ==========================================
// 高校学籍记录系统 - 配置层
// ==========================================
// 职责: 学籍政策参数管理（最大不及格次数、退费比例）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod policy_config_trait;

// 重导出核心配置管理器
pub use config_manager::{
    config_keys, ConfigManager, DEFAULT_FAILED_EXAM_REFUND_RATIO, DEFAULT_MAX_FAILED_ATTEMPTS,
};
pub use policy_config_trait::PolicyConfigReader;
