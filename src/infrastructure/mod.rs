//! 基础设施层（Infrastructure Layer）
//!
//! 持有外部资源（编译进程、临时目录），只暴露能力

pub mod latex_compiler;
pub mod scratch;

pub use latex_compiler::{CompileOutcome, LatexCompiler};
pub use scratch::ScratchSpace;
