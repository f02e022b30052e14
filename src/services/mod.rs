//! 业务能力层（Services Layer）
//!
//! 描述"我能做什么"：填充试卷模板、记录失败的试卷

pub mod exam_template;
pub mod failure_log;

pub use exam_template::{ExamTemplate, TemplateOrigin};
pub use failure_log::FailureLog;
