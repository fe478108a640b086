// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use university_records::config::{
    PolicyConfigReader, DEFAULT_FAILED_EXAM_REFUND_RATIO, DEFAULT_MAX_FAILED_ATTEMPTS,
};
use university_records::repository::RepositoryResult;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub max_failed_attempts: u32,
    pub failed_exam_refund_ratio: f64,
}

impl MockConfig {
    /// 创建默认配置（3 次 / 50%）
    pub fn default() -> Self {
        Self {
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            failed_exam_refund_ratio: DEFAULT_FAILED_EXAM_REFUND_RATIO,
        }
    }

    /// 自定义最大不及格次数
    pub fn with_max_failed_attempts(max: u32) -> Self {
        let mut config = Self::default();
        config.max_failed_attempts = max;
        config
    }

    /// 自定义退费比例
    pub fn with_refund_ratio(ratio: f64) -> Self {
        let mut config = Self::default();
        config.failed_exam_refund_ratio = ratio;
        config
    }
}

#[async_trait]
impl PolicyConfigReader for MockConfig {
    async fn get_max_failed_attempts(&self) -> RepositoryResult<u32> {
        Ok(self.max_failed_attempts)
    }

    async fn get_failed_exam_refund_ratio(&self) -> RepositoryResult<f64> {
        Ok(self.failed_exam_refund_ratio)
    }
}
