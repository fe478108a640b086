// ==========================================
// 高校学籍记录系统 - 学籍政策配置读取 Trait
// ==========================================
// 职责: 定义规则引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// PolicyConfigReader Trait
// ==========================================
// 用途: 考试重修/退费规则所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）；测试中使用 MockConfig
#[async_trait]
pub trait PolicyConfigReader: Send + Sync {
    /// 获取同一课程允许的最大不及格次数
    ///
    /// # 返回
    /// - u32: 达到该次数后不得再次参加考试
    ///
    /// # 默认值
    /// - 3
    async fn get_max_failed_attempts(&self) -> RepositoryResult<u32>;

    /// 获取考试不及格时的退费比例
    ///
    /// # 返回
    /// - f64: 退费额 = 已缴金额 × 比例，取值 [0, 1]
    ///
    /// # 默认值
    /// - 0.5
    async fn get_failed_exam_refund_ratio(&self) -> RepositoryResult<f64>;
}
