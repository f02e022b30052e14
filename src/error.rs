use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 文档树错误
///
/// JSON 格式错误不在渲染器内部处理，原样交给调用方
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 题目正文 JSON 解析失败
    #[error("题目 {id} 的文档 JSON 解析失败: {source}")]
    Parse {
        id: i64,
        #[source]
        source: serde_json::Error,
    },
    /// 单元 / 课时名称 JSON 解析失败
    #[error("{name} 名称的文档 JSON 解析失败: {source}")]
    Label {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 页面模板错误
#[derive(Debug, Error)]
pub enum TemplateError {
    /// 模板文件读取失败
    #[error("读取模板文件失败 ({path}): {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// 模板语法错误
    #[error("模板解析失败: {0}")]
    Parse(#[from] handlebars::TemplateError),
    /// 填充模板失败
    #[error("模板填充失败: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// 组卷流水线错误
///
/// 每一种失败都有独立的变体，方便调用方区分"编译器缺失"与"编译出错"
#[derive(Debug, Error)]
pub enum AssembleError {
    /// 无法创建临时目录
    #[error("something went wrong: can't create temp dir")]
    ScratchDir(#[source] io::Error),
    /// 无法创建或写入 .tex 文件
    #[error("something went wrong: couldn't write to .tex file")]
    SourceFile(#[source] io::Error),
    /// 模板填充失败
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// 编译器无法启动（未安装或不在 PATH 中）
    #[error("something went wrong: latex failed make sure it is installed and on path")]
    CompilerUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },
    /// 编译器非零退出，携带完整的 stderr 输出
    #[error("{stderr}")]
    Compilation { exit_code: i32, stderr: String },
    /// 编译进程没有退出码就结束了（被信号终止）
    #[error("something went wrong: disconnected")]
    Disconnected { stderr: String },
    /// 超过配置的编译时限，进程已被终止
    #[error("something went wrong: latex did not finish within {0:?}")]
    Timeout(Duration),
    /// 编译成功但读取 PDF 失败
    #[error("something went wrong: couldn't read compiled pdf ({path}): {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AssembleError {
    /// 编译器输出的诊断信息（若有）
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            AssembleError::Compilation { stderr, .. } | AssembleError::Disconnected { stderr } => {
                Some(stderr)
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compilation_error_displays_stderr_verbatim() {
        let err = AssembleError::Compilation {
            exit_code: 2,
            stderr: "! Undefined control sequence.\nl.12 \\foo\n".to_string(),
        };
        assert_eq!(err.to_string(), "! Undefined control sequence.\nl.12 \\foo\n");
        assert_eq!(err.diagnostics(), Some("! Undefined control sequence.\nl.12 \\foo\n"));
    }

    #[test]
    fn test_compiler_unavailable_is_distinct_message() {
        let err = AssembleError::CompilerUnavailable {
            program: "latexmk".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("make sure it is installed and on path"));
        assert!(err.diagnostics().is_none());
    }
}
