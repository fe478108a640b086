// ==========================================
// 高校学籍记录系统 - 学生管理 API
// ==========================================
// 职责: 学生 CRUD、升学期、学分报表、组合折扣
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::Student;
use crate::engine::{
    AppliedDiscount, CreditReport, DiscountEngine, PolicyRepositories, PromotionEngine,
    PromotionOutcome, RecordValidator,
};

// ==========================================
// StudentApi - 学生管理 API
// ==========================================

/// 学生管理API
///
/// 职责：
/// 1. 学生档案维护（校验后写库）
/// 2. 升学期与学分报表
/// 3. 组合折扣应用
pub struct StudentApi {
    repos: PolicyRepositories,
    validator: RecordValidator,
    promotion: PromotionEngine,
    discounts: DiscountEngine,
}

impl StudentApi {
    /// 创建新的StudentApi实例
    pub fn new(repos: PolicyRepositories) -> Self {
        Self {
            validator: RecordValidator::new(repos.clone()),
            promotion: PromotionEngine::new(repos.clone()),
            discounts: DiscountEngine::new(repos.clone()),
            repos,
        }
    }

    /// 新建学生
    ///
    /// # 返回
    /// - Ok(Student): 已持久化的学生（含分配的 id）
    pub async fn create_student(&self, mut student: Student) -> ApiResult<Student> {
        self.validator.validate_student(&student).await?;
        student.id = self.repos.students.add(&student).await?;
        tracing::info!(student_id = student.id, name = %student.full_name(), "学生已创建");
        Ok(student)
    }

    pub async fn get_student(&self, student_id: i64) -> ApiResult<Option<Student>> {
        Ok(self.repos.students.get_by_id(student_id).await?)
    }

    pub async fn list_students(&self) -> ApiResult<Vec<Student>> {
        Ok(self.repos.students.get_all().await?)
    }

    /// 更新学生档案
    pub async fn update_student(&self, student: &Student) -> ApiResult<()> {
        require_id(student.id, "学生")?;
        self.validator.validate_student(student).await?;
        self.repos.students.update(student).await?;
        tracing::info!(student_id = student.id, "学生已更新");
        Ok(())
    }

    /// 删除学生（不级联处理选课/考试的业务后果）
    pub async fn delete_student(&self, student_id: i64) -> ApiResult<()> {
        self.repos.students.delete(student_id).await?;
        tracing::info!(student_id, "学生已删除");
        Ok(())
    }

    /// 升学期（当前学期由第一条选课记录推断）
    pub async fn promote(&self, student_id: i64) -> ApiResult<PromotionOutcome> {
        Ok(self.promotion.promote(student_id).await?)
    }

    /// 升学期（显式指定当前学期）
    pub async fn promote_from(
        &self,
        student_id: i64,
        semester_id: i64,
    ) -> ApiResult<PromotionOutcome> {
        Ok(self.promotion.promote_from(student_id, semester_id).await?)
    }

    /// 学分报表: 学期序号 → 已获学分
    pub async fn credit_report(&self, student_id: i64) -> ApiResult<CreditReport> {
        Ok(self.promotion.credit_report(student_id).await?)
    }

    /// 为学生应用组合折扣
    pub async fn apply_discounts(&self, student_id: i64) -> ApiResult<Vec<AppliedDiscount>> {
        let student = self
            .repos
            .students
            .get_by_id(student_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Student(id={})不存在", student_id)))?;
        Ok(self.discounts.apply_discounts(&student).await?)
    }
}

/// 更新操作要求已持久化的 id
pub(crate) fn require_id(id: i64, label: &str) -> ApiResult<()> {
    if id <= 0 {
        return Err(ApiError::InvalidInput(format!("{}ID必须为正数", label)));
    }
    Ok(())
}
