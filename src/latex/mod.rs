//! exam 文档类标记生成
//!
//! 题目文档树到 `\question` / `\part` / `\subpart` 等标记的转换，
//! 以及组卷时每道题的渲染结果 [`RenderedFragment`]。

pub mod fragment;
pub mod renderer;

pub use fragment::RenderedFragment;
pub use renderer::{render, render_label, render_node, PartLevel, RenderCtx, QUESTION_MARKER};
