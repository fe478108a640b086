// ==========================================
// 高校学籍记录系统 - 选课领域模型
// ==========================================
// 对齐: enrollment 表 (student_id, course_id) 唯一
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Enrollment - 选课记录
// ==========================================
// 红线: amount_paid 只能由考试引擎（退费）修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub semester_id: i64,
    pub amount_paid: f64, // 已缴费用
}

impl Enrollment {
    /// 创建尚未持久化的选课记录
    pub fn new(student_id: i64, course_id: i64, semester_id: i64, amount_paid: f64) -> Self {
        Self {
            id: 0,
            student_id,
            course_id,
            semester_id,
            amount_paid,
        }
    }

    /// 按比例退费，返回退费金额
    ///
    /// 说明: 以当前余额为基数计算，多次挂科退费按几何级数递减；不做下限截断
    pub fn apply_refund(&mut self, ratio: f64) -> f64 {
        let refund = self.amount_paid * ratio;
        self.amount_paid -= refund;
        refund
    }
}
