use crate::error::DocumentError;
use crate::models::document::DocNode;
use serde::{Deserialize, Serialize};

/// 题目记录
///
/// 由持久化层持有，核心逻辑只读
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRecord {
    pub id: i64,
    /// 题目正文的文档树
    pub document: DocNode,
    /// 来源（单元 / 课时名称），同样是文档树
    pub source_label: DocNode,
}

impl QuestionRecord {
    pub fn new(id: i64, document: DocNode, source_label: DocNode) -> Self {
        Self {
            id,
            document,
            source_label,
        }
    }

    /// 从持久化的 JSON 文本构造记录
    pub fn from_stored(id: i64, text: &str, source_label: DocNode) -> Result<Self, DocumentError> {
        let document = DocNode::from_json(text).map_err(|source| DocumentError::Parse { id, source })?;
        Ok(Self::new(id, document, source_label))
    }
}

/// 题库文件中的单道题目（TOML）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredQuestion {
    pub id: i64,
    /// 编辑器文档树的 JSON 字符串
    pub text: String,
}

/// 题库文件：一个课时的所有题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonFile {
    /// 课程名称（纯文本）
    #[serde(default)]
    pub course: String,
    /// 单元名称（文档树 JSON）
    pub unit: String,
    /// 课时名称（文档树 JSON）
    pub lesson: String,
    #[serde(default)]
    pub questions: Vec<StoredQuestion>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl LessonFile {
    /// 解析本文件中的全部题目
    ///
    /// 来源标签取课时名称；课时名称为空时退回单元名称
    pub fn into_records(self) -> Result<Vec<QuestionRecord>, DocumentError> {
        let unit = DocNode::from_json(&self.unit).map_err(|source| DocumentError::Label {
            name: "unit".to_string(),
            source,
        })?;
        let lesson = DocNode::from_json(&self.lesson).map_err(|source| DocumentError::Label {
            name: "lesson".to_string(),
            source,
        })?;
        let source_label = if lesson.plain_text().is_empty() { unit } else { lesson };

        self.questions
            .iter()
            .map(|q| QuestionRecord::from_stored(q.id, &q.text, source_label.clone()))
            .collect()
    }
}

/// 组卷任务文件（TOML）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamJob {
    pub title: String,
    /// 选中的题目 ID，按出现顺序排版
    pub questions: Vec<i64>,
    /// 输出 PDF 文件名（相对输出目录）
    pub output: String,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}
