//! 失败记录服务 - 业务能力层
//!
//! 只负责"写失败记录文件"能力，不关心流程

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 默认失败记录文件
pub const DEFAULT_FAILURE_LOG: &str = "failed_exams.txt";

/// 失败记录服务
///
/// 职责：
/// - 将生成失败的试卷追加写入记录文件，一行 `标题 | 原因`
/// - 编译器的诊断输出缩进后附在下面
/// - 只处理单张试卷
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    /// 使用默认文件路径创建
    pub fn new() -> Self {
        Self::with_path(DEFAULT_FAILURE_LOG)
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一条失败记录
    ///
    /// # 参数
    /// - `title`: 试卷标题
    /// - `reason`: 失败原因（单行）
    /// - `diagnostics`: 编译器 stderr（可选，原样保留）
    pub async fn write(&self, title: &str, reason: &str, diagnostics: Option<&str>) -> Result<()> {
        debug!("写入失败记录: {} | {}", title, reason);

        let mut entry = format!("{} | {}\n", title, single_line(reason));
        if let Some(diagnostics) = diagnostics.filter(|d| !d.trim().is_empty()) {
            for line in diagnostics.lines() {
                entry.push_str("    ");
                entry.push_str(line);
                entry.push('\n');
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("无法打开失败记录文件: {}", self.path.display()))?;

        file.write_all(entry.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

impl Default for FailureLog {
    fn default() -> Self {
        Self::new()
    }
}

/// 取第一行非空内容作为原因
fn single_line(reason: &str) -> &str {
    reason
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("未知原因")
}
