//! 流程层（Workflow Layer）
//!
//! 定义"一张试卷"从题目到 PDF 的完整生成流程

pub mod exam_assembly;
pub mod exam_ctx;

pub use exam_assembly::{AssemblyJob, AssemblyStage, CompiledExam, ExamAssembler};
pub use exam_ctx::ExamCtx;
