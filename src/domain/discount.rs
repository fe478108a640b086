// ==========================================
// 高校学籍记录系统 - 课程组合折扣领域模型
// ==========================================
// 对齐: course_discount 表
// 说明: 同一 group_id 的多条记录组成一个课程组合；
//       学生选齐组合内全部课程才享受折扣
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// CourseDiscount - 课程组合折扣
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourseDiscount {
    pub id: i64,
    pub group_id: i64,
    pub course_id: i64,
    pub discount_percentage: f64, // 0-100
}

impl CourseDiscount {
    pub fn new(group_id: i64, course_id: i64, discount_percentage: f64) -> Self {
        Self {
            id: 0,
            group_id,
            course_id,
            discount_percentage,
        }
    }
}
