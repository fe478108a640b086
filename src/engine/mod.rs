// ==========================================
// 高校学籍记录系统 - 引擎层（学籍政策引擎）
// ==========================================
// 职责: 实现学籍业务规则，按固定顺序对实时数据求值后再写库
// 红线: Engine 不拼 SQL，只经由仓储 trait 访问数据；所有拒绝必须输出原因码
// ==========================================

pub mod discount;
pub mod enrollment;
pub mod entity_rules;
pub mod error;
pub mod exam_attempt;
pub mod prerequisite_graph;
pub mod promotion;
pub mod record_validator;
pub mod repositories;

// 重导出核心引擎
pub use discount::{AppliedDiscount, DiscountEngine, DiscountGroup};
pub use enrollment::EnrollmentEngine;
pub use error::{ErrorCategory, PolicyError, PolicyResult, Rejection, RejectionCode};
pub use exam_attempt::ExamAttemptEngine;
pub use prerequisite_graph::{has_cycle, PrerequisiteGraph, PrerequisiteValidator};
pub use promotion::{CreditReport, PromotionEngine, PromotionOutcome};
pub use record_validator::RecordValidator;
pub use repositories::PolicyRepositories;
