// ==========================================
// 高校学籍记录系统 - 先修关系领域模型
// ==========================================
// 对齐: course_prerequisite 表
// 红线: course_id != prereq_id；全图无环
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// CoursePrerequisite - 先修关系（有向边 course -> prereq）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoursePrerequisite {
    pub id: i64,
    pub course_id: i64, // 依赖方课程
    pub prereq_id: i64, // 先修课程
    pub min_grade: i32, // 先修课程最低成绩要求
}

impl CoursePrerequisite {
    pub fn new(course_id: i64, prereq_id: i64, min_grade: i32) -> Self {
        Self {
            id: 0,
            course_id,
            prereq_id,
            min_grade,
        }
    }

    pub fn is_self_reference(&self) -> bool {
        self.course_id == self.prereq_id
    }
}
