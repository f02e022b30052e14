//! LaTeX 编译器 - 基础设施层
//!
//! 持有外部编译器的调用方式，只暴露"在某个目录里编译一个文件"的能力

use crate::error::AssembleError;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// 默认编译器
pub const DEFAULT_COMPILER: &str = "latexmk";

/// 默认任务名（决定输出文件名 `exam.pdf`）
pub const DEFAULT_JOB_NAME: &str = "exam";

/// 一次编译的结果：退出码与完整的 stderr
///
/// 被信号终止的进程没有退出码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutcome {
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl CompileOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// LaTeX 编译器
///
/// 职责：
/// - 启动外部编译进程并等待退出
/// - 收集 stderr
/// - 不认识题目 / 模板
/// - 不负责临时文件的清理
#[derive(Debug, Clone)]
pub struct LatexCompiler {
    program: String,
    job_name: String,
    timeout: Option<Duration>,
}

impl LatexCompiler {
    /// 创建新的编译器
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            job_name: DEFAULT_JOB_NAME.to_string(),
            timeout: None,
        }
    }

    /// 设置编译时限，超时后终止进程
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// 编译产物文件名
    pub fn artifact_name(&self) -> String {
        format!("{}.pdf", self.job_name)
    }

    /// 命令行参数
    ///
    /// PDF 模式、遇错即停、非交互、显式输出目录、源文件、任务名
    pub fn args(&self, output_dir: &Path, source_name: &str) -> Vec<String> {
        vec![
            "-pdf".to_string(),
            "-halt-on-error".to_string(),
            "-interaction=nonstopmode".to_string(),
            format!("-output-directory={}", output_dir.display()),
            source_name.to_string(),
            format!("-jobname={}", self.job_name),
        ]
    }

    /// 在 `workdir` 中编译 `source_name`
    ///
    /// 进程无法启动时返回 [`AssembleError::CompilerUnavailable`]；
    /// 进程退出（无论退出码）都返回 [`CompileOutcome`]，由调用方判断成败。
    /// 返回的 future 被丢弃时，编译进程会被终止。
    pub async fn run(&self, workdir: &Path, source_name: &str) -> Result<CompileOutcome, AssembleError> {
        let started_at = Instant::now();

        let mut command = Command::new(&self.program);
        command
            .args(self.args(workdir, source_name))
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("启动编译器: {} (目录: {})", self.program, workdir.display());

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, command.output()).await {
                Ok(output) => output,
                Err(_) => {
                    warn!("编译超时 ({:?})，已终止 {}", limit, self.program);
                    return Err(AssembleError::Timeout(limit));
                }
            },
            None => command.output().await,
        }
        .map_err(|source| {
            warn!("无法启动编译器 {}: {}", self.program, source);
            AssembleError::CompilerUnavailable {
                program: self.program.clone(),
                source,
            }
        })?;

        let outcome = CompileOutcome {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            "编译器退出: {:?}，耗时 {} ms，stderr {} 字节",
            outcome.exit_code,
            started_at.elapsed().as_millis(),
            outcome.stderr.len()
        );

        Ok(outcome)
    }
}

impl Default for LatexCompiler {
    fn default() -> Self {
        Self::new(DEFAULT_COMPILER)
    }
}
