//! 临时工作目录 - 基础设施层
//!
//! 每次组卷独占一个临时目录和其中的 .tex 源文件，
//! 离开作用域时无论成功失败都会清理

use crate::error::AssembleError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// 固定的源文件名
pub const SOURCE_FILE_NAME: &str = "exam.tex";

const SCRATCH_PREFIX: &str = "MaTeX";

/// 一次组卷的临时工作区
///
/// 析构时先删除源文件，再删除目录；两步互不依赖，前一步失败也会执行后一步
pub struct ScratchSpace {
    source_path: PathBuf,
    dir: Option<TempDir>,
}

impl ScratchSpace {
    /// 创建唯一命名的临时目录
    ///
    /// `root` 为空时使用系统临时目录
    pub fn create(root: Option<&Path>) -> Result<Self, AssembleError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(AssembleError::ScratchDir)?;

        debug!("创建临时目录: {}", dir.path().display());

        Ok(Self {
            source_path: dir.path().join(SOURCE_FILE_NAME),
            dir: Some(dir),
        })
    }

    /// 临时目录路径
    pub fn path(&self) -> &Path {
        self.dir
            .as_ref()
            .map(TempDir::path)
            .unwrap_or_else(|| self.source_path.parent().unwrap_or(Path::new("")))
    }

    /// .tex 源文件路径
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// 写入 .tex 源文件
    pub async fn write_source(&self, source: &str) -> Result<(), AssembleError> {
        tokio::fs::write(&self.source_path, source)
            .await
            .map_err(AssembleError::SourceFile)
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.source_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("删除源文件失败 ({}): {}", self.source_path.display(), e),
        }

        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => debug!("已清理临时目录: {}", path.display()),
                Err(e) => warn!("删除临时目录失败 ({}): {}", path.display(), e),
            }
        }
    }
}
