//! 文档树 → exam 排版标记的递归下降转换器
//!
//! 渲染是纯函数：不修改文档树，也不会因为公式源码有误而失败，
//! 公式是否合法交给组卷时的外部编译器判断。

use crate::models::document::{DocNode, ListAttrs, Orientation};

/// 题目起始标记
pub const QUESTION_MARKER: &str = "\\question ";

/// 这两种写法的独立公式自带对齐环境，不再额外包一层 equation
const ALIGN_MARKERS: [&str; 2] = ["\\begin{align}", "\\begin{align*}"];

/// 列表项缩进
const LIST_INDENT: &str = "  ";

/// 小题层级
///
/// 顶层列表项是 part，更深的嵌套一律是 subpart（不存在第三级）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartLevel {
    #[default]
    Parts,
    Subparts,
}

impl PartLevel {
    /// 进入列表项内部后的层级，已经是 subpart 时保持不变
    fn nested(self) -> Self {
        PartLevel::Subparts
    }

    fn environment(self) -> &'static str {
        match self {
            PartLevel::Parts => "parts",
            PartLevel::Subparts => "subparts",
        }
    }

    fn command(self) -> &'static str {
        match self {
            PartLevel::Parts => "\\part",
            PartLevel::Subparts => "\\subpart",
        }
    }
}

/// 向下传递的渲染上下文
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderCtx<'a> {
    /// 同一层级的下一个节点
    pub right_sibling: Option<&'a DocNode>,
    pub part_level: PartLevel,
}

impl<'a> RenderCtx<'a> {
    fn at_level(part_level: PartLevel) -> Self {
        Self {
            right_sibling: None,
            part_level,
        }
    }

    fn with_sibling(self, right_sibling: Option<&'a DocNode>) -> Self {
        Self {
            right_sibling,
            ..self
        }
    }
}

/// 渲染整道题目
///
/// 根节点之外的节点同样可以渲染，结果等价于在顶层上下文中渲染该节点
pub fn render(doc: &DocNode) -> String {
    match doc {
        DocNode::Document { content } => render_document(content),
        other => render_node(other, RenderCtx::default()),
    }
}

/// 渲染单元 / 课时名称：不加题目标记，顶层内容以空格连接
///
/// 结果总是单行（模板把它放在 `%` 注释里），多行的公式或列表被压成一行
pub fn render_label(doc: &DocNode) -> String {
    doc.children()
        .iter()
        .map(|node| render_node(node, RenderCtx::default()))
        .flat_map(|part| {
            part.lines()
                .map(|line| line.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 按节点类型分派
pub fn render_node(node: &DocNode, ctx: RenderCtx<'_>) -> String {
    match node {
        DocNode::Document { content } => render_document(content),
        DocNode::Paragraph { content } => render_paragraph(content, ctx.right_sibling),
        DocNode::Text { text } => text.clone(),
        DocNode::InlineFormula { attrs } => render_inline_formula(attrs.code()),
        DocNode::DisplayFormula { attrs } => render_display_formula(attrs.code()),
        DocNode::OrderedList { attrs, content } => render_ordered_list(attrs, content, ctx.part_level),
        DocNode::ListItem { content } => render_list_item(content, ctx.part_level),
        // 引导语只由所属的 listItem 单独提取渲染
        DocNode::ListItemIntro { .. } => String::new(),
        DocNode::Unknown => String::new(),
    }
}

/// 逐个渲染子节点（带右侧兄弟节点），以换行连接
fn render_block_stream(children: &[DocNode], part_level: PartLevel) -> String {
    let ctx = RenderCtx::at_level(part_level);
    children
        .iter()
        .enumerate()
        .map(|(index, node)| render_node(node, ctx.with_sibling(children.get(index + 1))))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_document(content: &[DocNode]) -> String {
    format!("{}{}", QUESTION_MARKER, render_block_stream(content, PartLevel::Parts))
}

fn render_paragraph(content: &[DocNode], right_sibling: Option<&DocNode>) -> String {
    let text = content
        .iter()
        .map(|node| render_node(node, RenderCtx::default()))
        .collect::<Vec<_>>()
        .join(" ");

    if text.trim().is_empty() {
        return String::new();
    }

    match right_sibling {
        Some(next) if next.is_paragraph() => format!("{}\n", text),
        _ => text,
    }
}

fn render_inline_formula(code: &str) -> String {
    if code.trim().is_empty() {
        return String::new();
    }
    format!("${}$", code)
}

fn render_display_formula(code: &str) -> String {
    if code.trim().is_empty() {
        return String::new();
    }
    if ALIGN_MARKERS.iter().any(|marker| code.contains(marker)) {
        return code.to_string();
    }
    format!("\\begin{{equation}}\n{}\n\\end{{equation}}", code)
}

fn render_ordered_list(attrs: &ListAttrs, content: &[DocNode], part_level: PartLevel) -> String {
    let ctx = RenderCtx::at_level(part_level);
    let items = content
        .iter()
        .map(|node| format!("{}{}", LIST_INDENT, render_node(node, ctx)))
        .collect::<Vec<_>>()
        .join("\n");

    if items.trim().is_empty() {
        return String::new();
    }

    let layout = match attrs.orientation {
        Orientation::Vertical => format!(
            "\\begin{{multicols}}{{{}}}\n{}\n\\end{{multicols}}",
            attrs.grid_cols, items
        ),
        Orientation::Horizontal => items,
    };

    let env = part_level.environment();
    format!("\\begin{{{env}}}\n{layout}\n\\end{{{env}}}")
}

fn render_list_item(content: &[DocNode], part_level: PartLevel) -> String {
    let (uplevel, body) = match content.split_first() {
        Some((DocNode::ListItemIntro { content: intro }, rest)) => {
            (Some(render_paragraph(intro, None)), rest)
        }
        _ => (None, content),
    };

    let text = render_block_stream(body, part_level.nested());
    if text.trim().is_empty() {
        return String::new();
    }

    let item = format!("{} {}", part_level.command(), text);
    match uplevel {
        Some(label) if !label.is_empty() => format!("\\uplevel{{{}}}\n{}", label, item),
        _ => item,
    }
}
