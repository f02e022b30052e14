//! 单张试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责处理一个组卷任务，是试卷级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **选题**：按任务给出的 ID 顺序从题库取题，缺失的 ID 记录警告
//! 2. **组卷**：委托 `ExamAssembler` 生成 PDF
//! 3. **输出**：把 PDF 写入输出目录
//! 4. **失败记录**：失败的任务写入失败记录文件

use crate::config::Config;
use crate::models::{ExamJob, QuestionBank};
use crate::selection::order_selection;
use crate::services::FailureLog;
use crate::workflow::{AssemblyStage, ExamAssembler, ExamCtx};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// 处理单个组卷任务
///
/// # 参数
/// - `assembler`: 组卷器
/// - `bank`: 题库
/// - `job`: 组卷任务
/// - `exam_index`: 任务索引（用于日志）
/// - `config`: 配置
///
/// # 返回
/// 返回是否成功生成 PDF；生成失败不算错误，只有写文件等环境问题才返回 `Err`
pub async fn process_exam(
    assembler: &ExamAssembler,
    bank: &QuestionBank,
    job: ExamJob,
    exam_index: usize,
    config: &Config,
) -> Result<bool> {
    let output = Path::new(&config.output_folder).join(output_file_name(&job));
    let ctx = ExamCtx::new(exam_index, job.title.as_str(), output);

    log_exam_start(&ctx, job.questions.len());

    debug!("{} {}", ctx, AssemblyStage::Fetching);
    let selection = order_selection(job.questions.iter().copied());
    let missing = bank.missing(&selection);
    if !missing.is_empty() {
        warn!("{} ⚠️ 题库中不存在的题目 ID: {:?}", ctx, missing);
    }

    let records = bank.select(&selection);
    if records.is_empty() {
        warn!("{} ⚠️ 没有可用的题目，跳过", ctx);
        record_failure(config, &ctx, "没有可用的题目", None).await;
        return Ok(false);
    }

    match assembler.assemble(&ctx.title, &records).await {
        Ok(exam) => {
            write_pdf(&ctx.output, &exam.pdf).await?;
            info!(
                "{} ✅ 已生成 {} ({} 道题)",
                ctx,
                ctx.output.display(),
                exam.question_count
            );
            Ok(true)
        }
        Err(e) => {
            error!("{} ❌ 组卷失败", ctx);
            record_failure(config, &ctx, &e.to_string(), e.diagnostics()).await;
            Ok(false)
        }
    }
}

/// 输出文件名：任务未指定时使用标题
fn output_file_name(job: &ExamJob) -> String {
    let name = job.output.trim();
    if !name.is_empty() {
        return name.to_string();
    }

    let stem: String = job
        .title
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    let stem = stem.trim();
    format!("{}.pdf", if stem.is_empty() { "exam" } else { stem })
}

async fn write_pdf(path: &Path, pdf: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("无法创建输出目录: {}", parent.display()))?;
    }
    tokio::fs::write(path, pdf)
        .await
        .with_context(|| format!("无法写入PDF: {}", path.display()))
}

/// 写入失败记录，失败只记日志
async fn record_failure(config: &Config, ctx: &ExamCtx, reason: &str, diagnostics: Option<&str>) {
    let log = FailureLog::with_path(&config.failure_log_file);
    if let Err(e) = log.write(&ctx.title, reason, diagnostics).await {
        error!("{} 写入失败记录失败: {:#}", ctx, e);
    }
}

// ========== 日志辅助函数 ==========

fn log_exam_start(ctx: &ExamCtx, question_count: usize) {
    info!("\n{} {}", ctx, "─".repeat(30));
    info!("{} 开始组卷", ctx);
    info!("{} 题目数量: {}", ctx, question_count);
    info!("{} 输出: {}", ctx, ctx.output.display());
}
