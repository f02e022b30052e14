//! # MaTeX
//!
//! 把题库中的题目（富文本文档树）排版成 LaTeX 试卷并编译为 PDF
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ⓪ 数据与渲染
//! - `models/` - 文档树、题目记录、题库、组卷任务及其 TOML 加载
//! - `latex/` - 文档树 → LaTeX 片段的递归渲染器
//! - `selection` - 选题顺序（按给定顺序排列题目）
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部资源，只暴露能力
//! - `LatexCompiler` - 启动外部编译器并收集 stderr
//! - `ScratchSpace` - 每次组卷独占的临时目录，离开作用域即清理
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `ExamTemplate` - 填充试卷页面模板
//! - `FailureLog` - 写失败记录能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一张试卷"的完整生成流程
//! - `ExamCtx` - 上下文封装（任务序号 + 标题 + 输出路径）
//! - `ExamAssembler` - 流程编排（渲染 → 模板 → 编译 → 读取 PDF）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量组卷处理器，管理资源和并发
//! - `orchestrator/exam_processor` - 单张试卷处理器，选题并写出 PDF
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod latex;
pub mod models;
pub mod orchestrator;
pub mod selection;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AssembleError, ConfigError, DocumentError, TemplateError};
pub use latex::{render, render_label};
pub use models::{DocNode, ExamJob, QuestionBank, QuestionRecord};
pub use orchestrator::{process_exam, App, ProcessingStats};
pub use selection::{order_selection, SelectionOrder};
pub use services::ExamTemplate;
pub use workflow::{CompiledExam, ExamAssembler};
