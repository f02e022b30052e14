//! 批量组卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量组卷任务的调度和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、加载题库、查找模板、创建组卷器
//! 2. **批量加载**：扫描任务目录，并把 `EXAM_SELECTION` 作为一个额外任务
//! 3. **并发控制**：使用 Semaphore 限制同时运行的编译进程数量
//! 4. **全局统计**：汇总所有任务的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单张试卷的细节
//! - **共享只读资源**：题库与组卷器通过 `Arc` 共享给每个任务
//! - **向下委托**：委托 exam_processor 处理单个任务

use crate::config::Config;
use crate::models::{ExamJob, QuestionBank};
use crate::orchestrator::exam_processor;
use crate::utils::logging::{init_log_file, log_exams_loaded, log_startup, print_final_stats};
use crate::workflow::ExamAssembler;
use anyhow::{Context, Result};
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    bank: Arc<QuestionBank>,
    assembler: Arc<ExamAssembler>,
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法初始化日志文件: {}", config.output_log_file))?;

        log_startup(config.max_concurrent_exams, &config.compiler_program);

        // 加载题库
        info!("\n📁 正在加载题库...");
        let bank = crate::models::load_question_bank(&config.question_bank_folder).await?;
        info!("✓ 题库共 {} 道题目", bank.len());

        // 查找模板并创建组卷器
        let assembler = ExamAssembler::from_config(&config).context("无法加载试卷模板")?;
        info!("✓ 模板来源: {:?}", assembler.template().origin());

        Ok(Self::with_parts(config, bank, assembler))
    }

    /// 使用已准备好的题库和组卷器创建应用
    pub fn with_parts(config: Config, bank: QuestionBank, assembler: ExamAssembler) -> Self {
        Self {
            config,
            bank: Arc::new(bank),
            assembler: Arc::new(assembler),
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let jobs = self.load_jobs().await?;

        if jobs.is_empty() {
            warn!("⚠️ 没有找到组卷任务，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_exams_loaded(jobs.len(), self.config.max_concurrent_exams);

        let stats = self.process_all_exams(jobs).await?;

        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.failure_log_file,
        );

        Ok(stats)
    }

    /// 加载组卷任务：任务目录中的文件 + 环境变量给出的选题
    async fn load_jobs(&self) -> Result<Vec<ExamJob>> {
        let mut jobs = Vec::new();

        if Path::new(&self.config.exam_folder).exists() {
            info!("\n📁 正在扫描组卷任务...");
            jobs = crate::models::load_exam_jobs(&self.config.exam_folder).await?;
        } else {
            warn!("⚠️ 任务目录不存在: {}", self.config.exam_folder);
        }

        if let Some(selection) = &self.config.exam_selection {
            info!(
                "✓ 命令行组卷: {} ({} 道题)",
                self.config.exam_title,
                selection.len()
            );
            jobs.push(ExamJob {
                title: self.config.exam_title.clone(),
                questions: selection.ids().to_vec(),
                output: String::new(),
                file_path: None,
            });
        }

        Ok(jobs)
    }

    /// 并发处理所有任务
    async fn process_all_exams(&self, jobs: Vec<ExamJob>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_exams.max(1)));
        let mut stats = ProcessingStats {
            total: jobs.len(),
            ..Default::default()
        };

        let mut handles = Vec::with_capacity(jobs.len());
        for (idx, job) in jobs.into_iter().enumerate() {
            let exam_index = idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let assembler = Arc::clone(&self.assembler);
            let bank = Arc::clone(&self.bank);
            let config = self.config.clone();

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                exam_processor::process_exam(&assembler, &bank, job, exam_index, &config).await
            }));
        }

        // 等待所有任务完成（结果顺序与任务顺序一致）
        for (idx, result) in join_all(handles).await.into_iter().enumerate() {
            let exam_index = idx + 1;
            match result {
                Ok(Ok(true)) => stats.success += 1,
                Ok(Ok(false)) => stats.failed += 1,
                Ok(Err(e)) => {
                    error!("[试卷 #{}] ❌ 处理过程中发生错误: {:#}", exam_index, e);
                    stats.failed += 1;
                }
                Err(e) => {
                    error!("[试卷 #{}] 任务执行失败: {}", exam_index, e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::LatexCompiler;
    use crate::selection::order_selection;
    use crate::services::ExamTemplate;
    use tempfile::TempDir;

    fn assembler() -> ExamAssembler {
        ExamAssembler::new(ExamTemplate::builtin().unwrap(), LatexCompiler::new("/definitely/not/latexmk"))
    }

    #[tokio::test]
    async fn test_run_without_jobs() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            exam_folder: dir.path().join("missing").to_string_lossy().to_string(),
            ..Config::default()
        };
        let app = App::with_parts(config, QuestionBank::new(), assembler());
        let stats = app.run().await.unwrap();
        assert_eq!(stats, ProcessingStats::default());
    }

    #[tokio::test]
    async fn test_selection_job_is_added() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            exam_folder: dir.path().to_string_lossy().to_string(),
            exam_title: "随堂练习".to_string(),
            exam_selection: Some(order_selection([5, 2, 8])),
            ..Config::default()
        };
        let app = App::with_parts(config, QuestionBank::new(), assembler());
        let jobs = app.load_jobs().await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "随堂练习");
        assert_eq!(jobs[0].questions, vec![5, 2, 8]);
    }
}
