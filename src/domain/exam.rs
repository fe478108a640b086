// ==========================================
// 高校学籍记录系统 - 考试领域模型
// ==========================================
// 对齐: exam 表
// 红线: 同一学生同一自然日最多一场考试（跨课程）
// ==========================================

use crate::domain::types::is_passing_grade;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Exam - 考试记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub date: NaiveDateTime,
    pub grade: i32, // 1-10
}

impl Exam {
    /// 创建尚未持久化的考试记录
    pub fn new(student_id: i64, course_id: i64, grade: i32, date: NaiveDateTime) -> Self {
        Self {
            id: 0,
            student_id,
            course_id,
            date,
            grade,
        }
    }

    /// 考试所在自然日
    pub fn calendar_day(&self) -> NaiveDate {
        self.date.date()
    }

    pub fn is_passed(&self) -> bool {
        is_passing_grade(self.grade)
    }
}

// ==========================================
// ExamHistory - (学生, 课程) 的历史考试
// ==========================================
// 由历史考试按日期升序派生
#[derive(Debug, Clone, Default)]
pub struct ExamHistory {
    grades: Vec<i32>,
}

impl ExamHistory {
    /// 从某学生的全部考试中筛出指定课程，并按日期升序排列
    pub fn for_course(exams: &[Exam], student_id: i64, course_id: i64) -> Self {
        let mut attempts: Vec<&Exam> = exams
            .iter()
            .filter(|e| e.student_id == student_id && e.course_id == course_id)
            .collect();
        attempts.sort_by_key(|e| e.date);

        Self {
            grades: attempts.into_iter().map(|e| e.grade).collect(),
        }
    }

    /// 历次成绩（按日期升序）
    pub fn grades(&self) -> &[i32] {
        &self.grades
    }

    /// 是否已通过
    pub fn passed(&self) -> bool {
        self.grades.iter().any(|g| is_passing_grade(*g))
    }

    /// 挂科次数
    pub fn failed_count(&self) -> usize {
        self.grades.iter().filter(|g| !is_passing_grade(**g)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_history_filters_and_orders_by_date() {
        let exams = vec![
            Exam { id: 1, student_id: 1, course_id: 10, date: at(20, 9), grade: 6 },
            Exam { id: 2, student_id: 1, course_id: 10, date: at(5, 9), grade: 3 },
            Exam { id: 3, student_id: 1, course_id: 11, date: at(7, 9), grade: 2 },
            Exam { id: 4, student_id: 2, course_id: 10, date: at(8, 9), grade: 1 },
        ];

        let history = ExamHistory::for_course(&exams, 1, 10);
        assert_eq!(history.grades(), &[3, 6]);
        assert!(history.passed());
        assert_eq!(history.failed_count(), 1);
    }

    #[test]
    fn test_empty_history() {
        let history = ExamHistory::for_course(&[], 1, 10);
        assert!(!history.passed());
        assert_eq!(history.failed_count(), 0);
    }

    #[test]
    fn test_calendar_day_ignores_time() {
        let morning = Exam::new(1, 1, 7, at(3, 8));
        let evening = Exam::new(1, 2, 7, at(3, 20));
        assert_eq!(morning.calendar_day(), evening.calendar_day());
    }
}
