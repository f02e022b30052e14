//! 组卷上下文
//!
//! 封装"我正在生成第几张试卷、输出到哪里"这一信息

use std::fmt::Display;
use std::path::PathBuf;

/// 组卷上下文
#[derive(Debug, Clone)]
pub struct ExamCtx {
    /// 试卷索引（仅用于日志显示，从1开始）
    pub exam_index: usize,

    /// 试卷标题
    pub title: String,

    /// PDF 输出路径
    pub output: PathBuf,
}

impl ExamCtx {
    /// 创建新的组卷上下文
    pub fn new(exam_index: usize, title: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            exam_index,
            title: title.into(),
            output: output.into(),
        }
    }
}

impl Display for ExamCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[试卷 #{} {}]", self.exam_index, self.title)
    }
}
