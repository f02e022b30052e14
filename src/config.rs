use crate::selection::SelectionOrder;
use std::time::Duration;
use tracing::warn;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时生成的试卷数量
    pub max_concurrent_exams: usize,
    /// 题库 TOML 文件存放目录
    pub question_bank_folder: String,
    /// 组卷任务 TOML 文件存放目录
    pub exam_folder: String,
    /// PDF 输出目录
    pub output_folder: String,
    /// 显式指定的模板文件
    pub template_path: Option<String>,
    /// 打包资源目录（其中的 exam.hbs 优先于内置模板）
    pub resources_path: Option<String>,
    /// LaTeX 编译器程序
    pub compiler_program: String,
    /// 编译时限（秒），不设置则不限时
    pub compile_timeout_secs: Option<u64>,
    /// 临时目录的父目录，不设置则使用系统临时目录
    pub scratch_root: Option<String>,
    /// 命令行组卷的标题
    pub exam_title: String,
    /// 命令行组卷的题目顺序
    pub exam_selection: Option<SelectionOrder>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 失败记录文件
    pub failure_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_exams: 4,
            question_bank_folder: "question_bank".to_string(),
            exam_folder: "exams".to_string(),
            output_folder: "output_pdf".to_string(),
            template_path: None,
            resources_path: None,
            compiler_program: "latexmk".to_string(),
            compile_timeout_secs: None,
            scratch_root: None,
            exam_title: "MaTeX".to_string(),
            exam_selection: None,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            failure_log_file: "failed_exams.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_exams: std::env::var("MAX_CONCURRENT_EXAMS").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.max_concurrent_exams),
            question_bank_folder: std::env::var("QUESTION_BANK_FOLDER").unwrap_or(default.question_bank_folder),
            exam_folder: std::env::var("EXAM_FOLDER").unwrap_or(default.exam_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            template_path: std::env::var("TEMPLATE_PATH").ok().or(default.template_path),
            resources_path: std::env::var("RESOURCES_PATH").ok().or(default.resources_path),
            compiler_program: std::env::var("LATEX_COMPILER").unwrap_or(default.compiler_program),
            compile_timeout_secs: std::env::var("COMPILE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).or(default.compile_timeout_secs),
            scratch_root: std::env::var("SCRATCH_ROOT").ok().or(default.scratch_root),
            exam_title: std::env::var("EXAM_TITLE").unwrap_or(default.exam_title),
            exam_selection: std::env::var("EXAM_SELECTION").ok().and_then(|v| parse_selection(&v)).or(default.exam_selection),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            failure_log_file: std::env::var("FAILURE_LOG_FILE").unwrap_or(default.failure_log_file),
        }
    }

    /// 编译时限
    pub fn compile_timeout(&self) -> Option<Duration> {
        self.compile_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// 题目顺序格式错误时给出警告并忽略
fn parse_selection(value: &str) -> Option<SelectionOrder> {
    match value.parse::<SelectionOrder>() {
        Ok(selection) if !selection.is_empty() => Some(selection),
        Ok(_) => None,
        Err(e) => {
            warn!("⚠️ {}", e);
            None
        }
    }
}
