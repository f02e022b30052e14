//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量组卷处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载题库与组卷任务（Vec<ExamJob>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `exam_processor` - 单张试卷处理器
//! - 按顺序选题
//! - 委托组卷器生成 PDF
//! - 写入输出文件与失败记录
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ExamJob>)
//!     ↓
//! exam_processor (处理单个 ExamJob)
//!     ↓
//! workflow::ExamAssembler (渲染 → 模板 → 编译)
//!     ↓
//! services (能力层：模板 / 失败记录)
//!     ↓
//! infrastructure (基础设施：LatexCompiler / ScratchSpace)
//! ```

pub mod batch_processor;
pub mod exam_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use exam_processor::process_exam;
