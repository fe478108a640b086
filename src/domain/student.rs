// ==========================================
// 高校学籍记录系统 - 学生领域模型
// ==========================================
// 对齐: student 表
// 说明: 邮箱/电话以 JSON 文本存储
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Student - 学生
// ==========================================
// 约束: 至少提供一个联系方式（邮箱或电话）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64, // 0 表示尚未持久化

    // ===== 身份信息 =====
    pub first_name: String,
    pub last_name: String,
    pub cnp: String,       // 个人识别码（13 位数字）
    pub address: String,
    pub univ_code: String, // 学校编码

    // ===== 联系方式 =====
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phone_numbers: Vec<String>,
}

impl Student {
    /// 全名（用于日志）
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// 是否至少有一个联系方式
    pub fn has_contact_point(&self) -> bool {
        !self.emails.is_empty() || !self.phone_numbers.is_empty()
    }
}
