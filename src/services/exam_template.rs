//! 试卷页面模板 - 业务能力层
//!
//! 只负责"把标题和题目片段填进模板"，模板内容本身是外部资源

use crate::config::Config;
use crate::error::TemplateError;
use crate::latex::RenderedFragment;
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 模板文件名（打包资源目录与开发目录中都使用这个名字）
pub const TEMPLATE_FILE_NAME: &str = "exam.hbs";

/// 编译进二进制的默认模板
pub const BUILTIN_TEMPLATE: &str = include_str!("../../assets/exam.hbs");

const TEMPLATE_NAME: &str = "exam";

/// 模板来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    File(PathBuf),
    Builtin,
    Inline,
}

/// 模板上下文：`{ title, questions }`
#[derive(Serialize)]
struct ExamContext<'a> {
    title: &'a str,
    questions: &'a [RenderedFragment],
}

/// 试卷页面模板
///
/// 标记原样输出（不做 HTML 转义），引用不存在的变量会报错，
/// 局部模板的缩进不会传播到多行内容里
pub struct ExamTemplate {
    registry: Handlebars<'static>,
    origin: TemplateOrigin,
}

impl ExamTemplate {
    /// 从模板字符串创建
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        Self::with_origin(source, TemplateOrigin::Inline)
    }

    /// 使用编译进二进制的默认模板
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::with_origin(BUILTIN_TEMPLATE, TemplateOrigin::Builtin)
    }

    /// 从模板文件创建
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_origin(&source, TemplateOrigin::File(path.to_path_buf()))
    }

    /// 按配置查找模板
    ///
    /// 查找顺序：
    /// 1. `TEMPLATE_PATH` 显式指定的文件（不存在则报错）
    /// 2. 打包资源目录 `RESOURCES_PATH/exam.hbs`
    /// 3. 当前目录下的 `exam.hbs`（开发环境）
    /// 4. 内置模板
    pub fn resolve(config: &Config) -> Result<Self, TemplateError> {
        if let Some(path) = &config.template_path {
            return Self::from_file(Path::new(path));
        }

        let packaged = config
            .resources_path
            .as_ref()
            .map(|dir| Path::new(dir).join(TEMPLATE_FILE_NAME));
        let development = PathBuf::from(TEMPLATE_FILE_NAME);

        for candidate in packaged.into_iter().chain(std::iter::once(development)) {
            if candidate.is_file() {
                return Self::from_file(&candidate);
            }
            debug!("模板不存在: {}", candidate.display());
        }

        info!("未找到模板文件，使用内置模板");
        Self::builtin()
    }

    fn with_origin(source: &str, origin: TemplateOrigin) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.set_prevent_indent(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(TEMPLATE_NAME, source)?;
        Ok(Self { registry, origin })
    }

    pub fn origin(&self) -> &TemplateOrigin {
        &self.origin
    }

    /// 填充模板，返回完整的 .tex 源码
    pub fn fill(&self, title: &str, questions: &[RenderedFragment]) -> Result<String, TemplateError> {
        let context = ExamContext { title, questions };
        Ok(self.registry.render(TEMPLATE_NAME, &context)?)
    }
}

impl std::fmt::Debug for ExamTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamTemplate").field("origin", &self.origin).finish()
    }
}
