//! 文档树模型
//!
//! 编辑器产出的富文本文档（JSON），渲染前反序列化为 [`DocNode`]。
//! 渲染器只读这棵树，从不修改。

use serde::{Deserialize, Deserializer, Serialize};

/// 文档树节点
///
/// 以 JSON 中的 `type` 字段区分节点类型。编辑器自带的 `doc` / `inlineLatex` /
/// `displayLatex` 写法作为别名接受；不认识的类型落入 [`DocNode::Unknown`]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DocNode {
    /// 根节点
    #[serde(alias = "doc")]
    Document {
        #[serde(default)]
        content: Vec<DocNode>,
    },
    Paragraph {
        #[serde(default)]
        content: Vec<DocNode>,
    },
    Text {
        #[serde(default)]
        text: String,
    },
    /// 行内公式 `$code$`
    #[serde(alias = "inlineLatex")]
    InlineFormula {
        #[serde(default, deserialize_with = "null_as_default")]
        attrs: FormulaAttrs,
    },
    /// 独立公式（equation 环境）
    #[serde(alias = "displayLatex")]
    DisplayFormula {
        #[serde(default, deserialize_with = "null_as_default")]
        attrs: FormulaAttrs,
    },
    OrderedList {
        #[serde(default, deserialize_with = "null_as_default")]
        attrs: ListAttrs,
        #[serde(default)]
        content: Vec<DocNode>,
    },
    ListItem {
        #[serde(default)]
        content: Vec<DocNode>,
    },
    /// 小题的引导语，只允许出现在 listItem 的第一个位置
    ListItemIntro {
        #[serde(default)]
        content: Vec<DocNode>,
    },
    /// 未知节点，渲染为空
    #[serde(other)]
    Unknown,
}

/// 公式节点属性
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaAttrs {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub display: bool,
    /// 仅供编辑器界面使用
    #[serde(default)]
    pub form_open: bool,
}

impl FormulaAttrs {
    /// 公式源码，缺失时视为空串
    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }
}

/// 有序列表属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAttrs {
    #[serde(default, deserialize_with = "null_as_default")]
    pub orientation: Orientation,
    #[serde(default = "default_grid_cols", deserialize_with = "grid_cols_or_default")]
    pub grid_cols: u32,
}

impl Default for ListAttrs {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            grid_cols: default_grid_cols(),
        }
    }
}

fn default_grid_cols() -> u32 {
    2
}

/// 编辑器会把未设置的属性写成 `null`，与缺失同样取默认值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn grid_cols_or_default<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_grid_cols))
}

/// 列表排布方向
///
/// 编辑器默认值拼写为 `horizantal`，任何不认识的取值都按横排处理。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    #[default]
    #[serde(other)]
    Horizontal,
}

impl DocNode {
    /// 从持久化的 JSON 字符串解析文档树
    ///
    /// JSON 格式错误属于数据完整性问题，直接返回解析错误
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 序列化为持久化用的 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// 子节点，叶子节点返回空切片
    pub fn children(&self) -> &[DocNode] {
        match self {
            DocNode::Document { content }
            | DocNode::Paragraph { content }
            | DocNode::OrderedList { content, .. }
            | DocNode::ListItem { content }
            | DocNode::ListItemIntro { content } => content,
            DocNode::Text { .. }
            | DocNode::InlineFormula { .. }
            | DocNode::DisplayFormula { .. }
            | DocNode::Unknown => &[],
        }
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self, DocNode::Paragraph { .. })
    }

    /// 拼接所有文本叶子，公式以源码代替（用于日志预览）
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            DocNode::Text { text } => out.push_str(text),
            DocNode::InlineFormula { attrs } | DocNode::DisplayFormula { attrs } => {
                out.push_str(attrs.code())
            }
            _ => {
                for child in self.children() {
                    if !out.is_empty() && !out.ends_with(' ') && child.is_block() {
                        out.push(' ');
                    }
                    child.collect_text(out);
                }
            }
        }
    }

    fn is_block(&self) -> bool {
        !matches!(
            self,
            DocNode::Text { .. } | DocNode::InlineFormula { .. } | DocNode::Unknown
        )
    }
}

// ========== 构造辅助函数 ==========

impl DocNode {
    pub fn document(content: Vec<DocNode>) -> Self {
        DocNode::Document { content }
    }

    pub fn paragraph(content: Vec<DocNode>) -> Self {
        DocNode::Paragraph { content }
    }

    pub fn text(text: impl Into<String>) -> Self {
        DocNode::Text { text: text.into() }
    }

    pub fn inline_formula(code: impl Into<String>) -> Self {
        DocNode::InlineFormula {
            attrs: FormulaAttrs {
                code: Some(code.into()),
                ..Default::default()
            },
        }
    }

    pub fn display_formula(code: impl Into<String>) -> Self {
        DocNode::DisplayFormula {
            attrs: FormulaAttrs {
                code: Some(code.into()),
                display: true,
                form_open: false,
            },
        }
    }

    /// 横排有序列表
    pub fn ordered_list(content: Vec<DocNode>) -> Self {
        DocNode::OrderedList {
            attrs: ListAttrs::default(),
            content,
        }
    }

    /// 竖排分栏有序列表
    pub fn grid_list(grid_cols: u32, content: Vec<DocNode>) -> Self {
        DocNode::OrderedList {
            attrs: ListAttrs {
                orientation: Orientation::Vertical,
                grid_cols,
            },
            content,
        }
    }

    pub fn list_item(content: Vec<DocNode>) -> Self {
        DocNode::ListItem { content }
    }

    pub fn list_item_intro(content: Vec<DocNode>) -> Self {
        DocNode::ListItemIntro { content }
    }
}
