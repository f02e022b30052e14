use crate::latex::renderer::{render, render_label};
use crate::models::question::QuestionRecord;
use serde::Serialize;

/// 单道题目的渲染结果，只在组卷过程中存在
///
/// 字段名即模板中可用的变量：`{{id}}`、`{{latex}}`、`{{source}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedFragment {
    pub id: i64,
    pub latex: String,
    pub source: String,
}

impl RenderedFragment {
    pub fn from_record(record: &QuestionRecord) -> Self {
        Self {
            id: record.id,
            latex: render(&record.document),
            source: render_label(&record.source_label),
        }
    }
}
