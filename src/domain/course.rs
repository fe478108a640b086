// ==========================================
// 高校学籍记录系统 - 课程领域模型
// ==========================================
// 对齐: course / course_semester 表
// 红线: 课程费用必须位于 [min_cost_per_credit*credits, max_cost_per_credit*credits]
// ==========================================

use crate::domain::types::MONEY_EPSILON;
use serde::{Deserialize, Serialize};

// ==========================================
// Course - 课程
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub credits: i32,

    // ===== 费用 =====
    pub cost: f64,                // 当前费用（折扣直接作用于此字段）
    pub min_cost_per_credit: f64, // 每学分最低单价
    pub max_cost_per_credit: f64, // 每学分最高单价
}

impl Course {
    /// 允许的费用区间 (min, max)
    pub fn allowed_cost_range(&self) -> (f64, f64) {
        let credits = f64::from(self.credits);
        (
            self.min_cost_per_credit * credits,
            self.max_cost_per_credit * credits,
        )
    }

    /// 当前费用是否位于允许区间内
    pub fn is_cost_within_range(&self) -> bool {
        let (min_cost, max_cost) = self.allowed_cost_range();
        self.cost >= min_cost - MONEY_EPSILON && self.cost <= max_cost + MONEY_EPSILON
    }

    /// 按折扣百分比计算折后费用
    ///
    /// # 参数
    /// - discount_pct: 折扣百分比 (0-100)
    pub fn discounted_cost(&self, discount_pct: f64) -> f64 {
        self.cost * (1.0 - discount_pct / 100.0)
    }
}

// ==========================================
// CourseSemester - 课程开设学期（关联实体）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSemester {
    pub id: i64,
    pub course_id: i64,
    pub semester_id: i64,
}
