//! 组卷流水线 - 流程层
//!
//! 核心职责：定义"一张试卷"的完整生成流程
//!
//! 流程顺序：
//! 1. 渲染每道题目的文档树
//! 2. 填充页面模板
//! 3. 写入临时目录并调用外部编译器
//! 4. 读取 PDF 或返回诊断信息
//!
//! 临时目录与源文件由 [`ScratchSpace`] 持有，任何一条返回路径都会清理。

use crate::config::Config;
use crate::error::{AssembleError, TemplateError};
use crate::infrastructure::scratch::{ScratchSpace, SOURCE_FILE_NAME};
use crate::infrastructure::LatexCompiler;
use crate::latex::RenderedFragment;
use crate::models::question::QuestionRecord;
use crate::services::ExamTemplate;
use crate::utils::logging::truncate_text;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// 组卷阶段（用于日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyStage {
    Fetching,
    Rendering,
    TemplateFilling,
    Compiling,
    Succeeded,
    Failed,
}

impl fmt::Display for AssemblyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssemblyStage::Fetching => "选题",
            AssemblyStage::Rendering => "渲染题目",
            AssemblyStage::TemplateFilling => "填充模板",
            AssemblyStage::Compiling => "编译",
            AssemblyStage::Succeeded => "完成",
            AssemblyStage::Failed => "失败",
        };
        f.write_str(name)
    }
}

/// 一次组卷请求：标题 + 按顺序渲染好的题目片段
#[derive(Debug, Clone)]
pub struct AssemblyJob {
    pub title: String,
    pub fragments: Vec<RenderedFragment>,
}

impl AssemblyJob {
    /// 按给定顺序渲染所有题目，不做任何重排
    pub fn render(title: impl Into<String>, records: &[QuestionRecord]) -> Self {
        Self {
            title: title.into(),
            fragments: records.iter().map(RenderedFragment::from_record).collect(),
        }
    }
}

/// 编译产物
#[derive(Debug, Clone)]
pub struct CompiledExam {
    pub pdf: Vec<u8>,
    pub question_count: usize,
}

/// 组卷器
///
/// 不持有可变状态，多个组卷请求可以并发执行，各自使用独立的临时目录
#[derive(Debug)]
pub struct ExamAssembler {
    template: ExamTemplate,
    compiler: LatexCompiler,
    scratch_root: Option<PathBuf>,
}

impl ExamAssembler {
    /// 创建新的组卷器
    pub fn new(template: ExamTemplate, compiler: LatexCompiler) -> Self {
        Self {
            template,
            compiler,
            scratch_root: None,
        }
    }

    /// 按配置创建：查找模板、设置编译器与时限
    pub fn from_config(config: &Config) -> Result<Self, TemplateError> {
        let template = ExamTemplate::resolve(config)?;
        let compiler = LatexCompiler::new(&config.compiler_program).with_timeout(config.compile_timeout());
        Ok(Self::new(template, compiler).with_scratch_root(config.scratch_root.as_ref().map(PathBuf::from)))
    }

    /// 指定临时目录的父目录，为空时使用系统临时目录
    pub fn with_scratch_root(mut self, root: Option<PathBuf>) -> Self {
        self.scratch_root = root;
        self
    }

    pub fn template(&self) -> &ExamTemplate {
        &self.template
    }

    pub fn compiler(&self) -> &LatexCompiler {
        &self.compiler
    }

    /// 只生成 .tex 源码，不编译
    pub fn render_source(&self, title: &str, records: &[QuestionRecord]) -> Result<String, AssembleError> {
        let job = AssemblyJob::render(title, records);
        Ok(self.template.fill(&job.title, &job.fragments)?)
    }

    /// 生成试卷 PDF
    pub async fn assemble(&self, title: &str, records: &[QuestionRecord]) -> Result<CompiledExam, AssembleError> {
        let result = self.run_stages(title, records).await;
        match &result {
            Ok(exam) => info!(
                "[{}] ✓ {}: {} 道题，PDF {} 字节",
                title,
                AssemblyStage::Succeeded,
                exam.question_count,
                exam.pdf.len()
            ),
            Err(e) => warn!(
                "[{}] ❌ {}: {}",
                title,
                AssemblyStage::Failed,
                truncate_text(&e.to_string(), 200)
            ),
        }
        result
    }

    async fn run_stages(&self, title: &str, records: &[QuestionRecord]) -> Result<CompiledExam, AssembleError> {
        debug!("[{}] {} ({} 道题)", title, AssemblyStage::Rendering, records.len());
        let job = AssemblyJob::render(title, records);

        debug!("[{}] {}", title, AssemblyStage::TemplateFilling);
        let source = self.template.fill(&job.title, &job.fragments)?;

        debug!("[{}] {}", title, AssemblyStage::Compiling);
        let scratch = ScratchSpace::create(self.scratch_root.as_deref())?;
        scratch.write_source(&source).await?;

        let outcome = self.compiler.run(scratch.path(), SOURCE_FILE_NAME).await?;

        match outcome.exit_code {
            Some(0) => {
                let path = scratch.path().join(self.compiler.artifact_name());
                let pdf = tokio::fs::read(&path)
                    .await
                    .map_err(|source| AssembleError::ArtifactRead {
                        path: path.clone(),
                        source,
                    })?;
                Ok(CompiledExam {
                    pdf,
                    question_count: job.fragments.len(),
                })
            }
            Some(exit_code) => Err(AssembleError::Compilation {
                exit_code,
                stderr: outcome.stderr,
            }),
            None => Err(AssembleError::Disconnected {
                stderr: outcome.stderr,
            }),
        }
    }
}
