// ==========================================
// 高校学籍记录系统 - 先修关系图校验引擎
// ==========================================
// 红线: 先修关系图任何时刻必须无环
// ==========================================
// 职责: 判定一条新增/修改的先修边是否合法
// 顺序: 自引用 → 两门课程存在 → 两门课程已开设 → 学期 ≥ 2 → 先修更早 → 无环（短路）
// 输出: Ok(()) 或拒绝原因；不写库，由调用方在校验通过后持久化
// ==========================================

use crate::domain::types::{EntityKind, MIN_PREREQUISITE_SEMESTER};
use crate::domain::CoursePrerequisite;
use crate::engine::entity_rules;
use crate::engine::error::{PolicyError, PolicyResult, Rejection, RejectionCode};
use crate::engine::repositories::PolicyRepositories;
use std::collections::{BTreeMap, HashMap};
use tracing::instrument;

/// 邻接表: 课程ID → 其先修课程ID列表
pub type PrerequisiteGraph = BTreeMap<i64, Vec<i64>>;

/// 由 (course_id, prereq_id) 边集构建邻接表
pub fn build_graph<I>(edges: I) -> PrerequisiteGraph
where
    I: IntoIterator<Item = (i64, i64)>,
{
    let mut graph = PrerequisiteGraph::new();
    for (course_id, prereq_id) in edges {
        graph.entry(course_id).or_default().push(prereq_id);
    }
    graph
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// 在当前搜索路径上
    InStack,
    /// 已完成
    Done,
}

/// 三色 DFS 环检测（未标记 = 白，InStack = 灰，Done = 黑）
///
/// 回边（指向灰色节点）即存在环。只关心边的存在性，重复边不影响结果。
/// 使用显式栈，长先修链不会耗尽线程栈。
pub fn has_cycle(graph: &PrerequisiteGraph) -> bool {
    let mut marks: HashMap<i64, Mark> = HashMap::new();

    for &root in graph.keys() {
        if marks.contains_key(&root) {
            continue;
        }

        // (节点, 下一个待访问邻居的下标)
        let mut stack: Vec<(i64, usize)> = vec![(root, 0)];
        marks.insert(root, Mark::InStack);

        while let Some(top) = stack.last_mut() {
            let (node, cursor) = *top;
            let neighbors = graph.get(&node).map(Vec::as_slice).unwrap_or(&[]);

            match neighbors.get(cursor) {
                Some(&next) => {
                    top.1 += 1;
                    match marks.get(&next) {
                        Some(Mark::InStack) => return true,
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(next, Mark::InStack);
                            stack.push((next, 0));
                        }
                    }
                }
                None => {
                    marks.insert(node, Mark::Done);
                    stack.pop();
                }
            }
        }
    }

    false
}

// ==========================================
// PrerequisiteValidator - 先修关系校验器
// ==========================================
pub struct PrerequisiteValidator {
    repos: PolicyRepositories,
}

impl PrerequisiteValidator {
    pub fn new(repos: PolicyRepositories) -> Self {
        Self { repos }
    }

    /// 校验候选先修边
    ///
    /// # 参数
    /// - candidate: 候选边；id > 0 表示修改已有边（环检测时以候选替换原边）
    ///
    /// # 返回
    /// - Ok(()): 合法，可持久化
    /// - Err(PolicyError::Rejected): 首个违反的规则
    #[instrument(skip(self, candidate), fields(
        edge_id = candidate.id,
        course_id = candidate.course_id,
        prereq_id = candidate.prereq_id
    ))]
    pub async fn validate(&self, candidate: &CoursePrerequisite) -> PolicyResult<()> {
        tracing::debug!("校验先修关系");

        // === 步骤 1: 自引用 ===
        if candidate.is_self_reference() {
            return Err(self.reject(
                RejectionCode::SelfPrerequisite,
                format!("课程 {} 不能作为自身的先修课程", candidate.course_id),
            ));
        }

        if let Some(violation) = entity_rules::check_prerequisite_min_grade(candidate.min_grade) {
            tracing::warn!(code = %violation.code, "先修关系结构校验失败");
            return Err(PolicyError::Invalid {
                entity: EntityKind::CoursePrerequisite,
                violations: vec![violation],
            });
        }

        // === 步骤 2: 两门课程都存在，然后都已开设 ===
        self.ensure_course_exists(candidate.course_id, "course_id").await?;
        self.ensure_course_exists(candidate.prereq_id, "prereq_id").await?;
        let course_numbers = self.offering_numbers(candidate.course_id, "course_id").await?;
        let prereq_numbers = self.offering_numbers(candidate.prereq_id, "prereq_id").await?;

        // === 步骤 3: 依赖课程只能开设在第 2 学期及以后 ===
        if let Some(&too_early) = course_numbers
            .iter()
            .find(|&&n| n < MIN_PREREQUISITE_SEMESTER)
        {
            return Err(self.reject(
                RejectionCode::MinimumSemesterNotMet,
                format!(
                    "课程 {} 开设于第 {} 学期，只有第 {} 学期及以后的课程可以设置先修",
                    candidate.course_id, too_early, MIN_PREREQUISITE_SEMESTER
                ),
            ));
        }

        // === 步骤 4: 先修课程须存在更早的开设学期 ===
        let earliest_prereq = prereq_numbers.iter().copied().min();
        let latest_course = course_numbers.iter().copied().max();
        let earlier_exists = matches!(
            (earliest_prereq, latest_course),
            (Some(p), Some(c)) if p < c
        );
        if !earlier_exists {
            return Err(self.reject(
                RejectionCode::PrerequisiteNotEarlier,
                format!(
                    "先修课程 {} 没有早于课程 {} 的开设学期",
                    candidate.prereq_id, candidate.course_id
                ),
            ));
        }

        // === 步骤 5: 环检测（每次重新读取边集）===
        let existing = self.repos.prerequisites.get_all().await?;
        let edges = existing
            .iter()
            .filter(|e| candidate.id <= 0 || e.id != candidate.id)
            .map(|e| (e.course_id, e.prereq_id))
            .chain(std::iter::once((candidate.course_id, candidate.prereq_id)));
        let graph = build_graph(edges);

        if has_cycle(&graph) {
            return Err(self.reject(
                RejectionCode::CircularDependency,
                format!(
                    "添加 {} → {} 会形成循环依赖",
                    candidate.course_id, candidate.prereq_id
                ),
            ));
        }

        tracing::debug!(edge_count = existing.len() + 1, "先修关系校验通过");
        Ok(())
    }

    async fn ensure_course_exists(&self, course_id: i64, field: &str) -> PolicyResult<()> {
        if self.repos.courses.get_by_id(course_id).await?.is_none() {
            tracing::warn!(course_id, field, "先修关系引用的课程不存在");
            return Err(PolicyError::Rejected(
                Rejection::new(
                    RejectionCode::CourseMustExist,
                    format!("课程 {} 不存在", course_id),
                )
                .with_field(field),
            ));
        }
        Ok(())
    }

    /// 读取课程全部开设学期的序号；未开设时拒绝
    async fn offering_numbers(&self, course_id: i64, field: &str) -> PolicyResult<Vec<i32>> {
        let offerings = self.repos.course_semesters.get_by_course(course_id).await?;
        let mut numbers = Vec::with_capacity(offerings.len());
        for offering in offerings {
            match self.repos.semesters.get_by_id(offering.semester_id).await? {
                Some(semester) => numbers.push(semester.number),
                None => tracing::warn!(
                    course_id,
                    semester_id = offering.semester_id,
                    "开设记录引用的学期不存在，已忽略"
                ),
            }
        }

        if numbers.is_empty() {
            return Err(PolicyError::Rejected(
                Rejection::new(
                    RejectionCode::UnscheduledCourse,
                    format!("课程 {} 尚未开设于任何学期", course_id),
                )
                .with_field(field),
            ));
        }
        Ok(numbers)
    }

    fn reject(&self, code: RejectionCode, message: String) -> PolicyError {
        tracing::warn!(code = %code, reason = %message, "先修关系被拒绝");
        PolicyError::rejected(code, message)
    }
}
