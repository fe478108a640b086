// ==========================================
// 高校学籍记录系统 - 学期领域模型
// ==========================================
// 对齐: semester 表 (number 唯一)
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Semester - 学期
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: i64,
    pub number: i32,      // 学期序号（唯一、正整数）
    pub min_credits: i32, // 升学期所需最低学分
}

impl Semester {
    /// 下一学期序号
    pub fn next_number(&self) -> i32 {
        self.number + 1
    }
}
