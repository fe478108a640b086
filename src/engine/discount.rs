// ==========================================
// 高校学籍记录系统 - 组合折扣引擎
// ==========================================
// 职责: 按学生选课集合找出满足条件的折扣组，对每门课取最大折扣并写回课程费用
// 规则: 折扣组内全部课程都已选 → 该组生效；同一课程多组生效取最大百分比
// 注意: 直接修改 course.cost，重复调用会叠加折扣；中途写库失败不回滚已写入的课程
// ==========================================

use crate::domain::{CourseDiscount, Student};
use crate::engine::error::{ErrorCategory, PolicyResult};
use crate::engine::record_validator::RecordValidator;
use crate::engine::repositories::PolicyRepositories;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::instrument;

// ==========================================
// DiscountGroup - 折扣组
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountGroup {
    pub group_id: i64,
    pub percentage: f64,
    pub course_ids: Vec<i64>,
}

impl DiscountGroup {
    /// 组非空且全部课程都在已选集合中
    pub fn qualifies(&self, enrolled: &BTreeSet<i64>) -> bool {
        !self.course_ids.is_empty() && self.course_ids.iter().all(|id| enrolled.contains(id))
    }

    /// 用于结构校验的代表记录（组ID、首门课程、组折扣）
    pub fn representative(&self) -> Option<CourseDiscount> {
        self.course_ids
            .first()
            .map(|&course_id| CourseDiscount::new(self.group_id, course_id, self.percentage))
    }
}

/// 每门课程取生效折扣组中的最大百分比
pub fn best_discount_per_course<'a, I>(groups: I) -> BTreeMap<i64, f64>
where
    I: IntoIterator<Item = &'a DiscountGroup>,
{
    let mut best: BTreeMap<i64, f64> = BTreeMap::new();
    for group in groups {
        for &course_id in &group.course_ids {
            best.entry(course_id)
                .and_modify(|pct| {
                    if group.percentage > *pct {
                        *pct = group.percentage;
                    }
                })
                .or_insert(group.percentage);
        }
    }
    best
}

/// 单门课程的折扣结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    pub course_id: i64,
    pub percentage: f64,
    pub cost_before: f64,
    pub cost_after: f64,
}

// ==========================================
// DiscountEngine - 组合折扣引擎
// ==========================================
pub struct DiscountEngine {
    repos: PolicyRepositories,
    validator: RecordValidator,
}

impl DiscountEngine {
    pub fn new(repos: PolicyRepositories) -> Self {
        let validator = RecordValidator::new(repos.clone());
        Self { repos, validator }
    }

    /// 为学生应用组合折扣
    ///
    /// # 返回
    /// - Ok(Vec<AppliedDiscount>): 已写回的课程折扣（无选课时为空）
    #[instrument(skip(self, student), fields(student_id = student.id))]
    pub async fn apply_discounts(&self, student: &Student) -> PolicyResult<Vec<AppliedDiscount>> {
        tracing::info!("开始计算组合折扣");

        // === 步骤 1-2: 已选课程集合 ===
        let enrollments = self.repos.enrollments.get_by_student(student.id).await?;
        if enrollments.is_empty() {
            tracing::warn!("学生没有选课记录，不应用折扣");
            return Ok(Vec::new());
        }
        let enrolled: BTreeSet<i64> = enrollments.iter().map(|e| e.course_id).collect();

        // === 步骤 3-5: 折扣组 → 生效判定 → 代表记录校验 ===
        let groups = self.load_groups().await?;
        let mut qualifying = Vec::new();
        for group in groups.into_iter().filter(|g| g.qualifies(&enrolled)) {
            let Some(representative) = group.representative() else {
                continue;
            };
            if let Err(err) = self.validator.validate_discount(&representative, false).await {
                if err.category() == ErrorCategory::Storage {
                    return Err(err);
                }
                tracing::warn!(group_id = group.group_id, error = %err, "折扣组校验失败，已跳过");
                continue;
            }
            qualifying.push(group);
        }

        // === 步骤 6: 每门课程取最大折扣 ===
        let best = best_discount_per_course(&qualifying);

        // === 步骤 7: 写回课程费用 ===
        let mut applied = Vec::with_capacity(best.len());
        for (course_id, percentage) in best {
            let Some(mut course) = self.repos.courses.get_by_id(course_id).await? else {
                tracing::warn!(course_id, "课程不存在，折扣未应用");
                continue;
            };
            let cost_before = course.cost;
            course.cost = course.discounted_cost(percentage);
            self.repos.courses.update(&course).await?;

            tracing::info!(
                course_id,
                percentage,
                cost_before,
                cost_after = course.cost,
                "折扣已应用"
            );
            applied.push(AppliedDiscount {
                course_id,
                percentage,
                cost_before,
                cost_after: course.cost,
            });
        }

        tracing::info!(applied = applied.len(), "组合折扣计算完成");
        Ok(applied)
    }

    /// 按 group_id 去重读取全部折扣组（组折扣取该组首条记录）
    async fn load_groups(&self) -> PolicyResult<Vec<DiscountGroup>> {
        let records = self.repos.discounts.get_all().await?;

        let mut percentages: BTreeMap<i64, f64> = BTreeMap::new();
        for record in &records {
            percentages
                .entry(record.group_id)
                .or_insert(record.discount_percentage);
        }

        let mut groups = Vec::with_capacity(percentages.len());
        for (group_id, percentage) in percentages {
            let course_ids = self
                .repos
                .discounts
                .get_course_ids_by_group_id(group_id)
                .await?;
            groups.push(DiscountGroup {
                group_id,
                percentage,
                course_ids,
            });
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(group_id: i64, percentage: f64, course_ids: &[i64]) -> DiscountGroup {
        DiscountGroup {
            group_id,
            percentage,
            course_ids: course_ids.to_vec(),
        }
    }

    #[test]
    fn test_group_qualifies_only_when_all_courses_enrolled() {
        let enrolled: BTreeSet<i64> = [1, 2, 3].into_iter().collect();
        assert!(group(1, 10.0, &[1, 2]).qualifies(&enrolled));
        assert!(!group(2, 10.0, &[1, 4]).qualifies(&enrolled));
        assert!(!group(3, 10.0, &[]).qualifies(&enrolled));
    }

    #[test]
    fn test_best_discount_takes_maximum() {
        let groups = vec![group(1, 10.0, &[7, 8]), group(2, 20.0, &[7])];
        let best = best_discount_per_course(&groups);
        assert_eq!(best.get(&7), Some(&20.0));
        assert_eq!(best.get(&8), Some(&10.0));

        let multiplier = 1.0 - best[&7] / 100.0;
        assert!((multiplier - 0.80).abs() < 1e-12);
    }

    #[test]
    fn test_representative_uses_first_course() {
        let rep = group(4, 15.0, &[9, 3]).representative().unwrap();
        assert_eq!((rep.group_id, rep.course_id, rep.discount_percentage), (4, 9, 15.0));
        assert!(group(5, 15.0, &[]).representative().is_none());
    }
}
