//! 只写导出器: 绘图、外部求解器与代码生成目标。
//!
//! Every exporter renders the full document as a string first, then writes
//! it in one go; failures surface as [`crate::net::NetError`].

pub mod drawio;
pub mod grafcet;
pub mod graphviz;
pub mod julia;
pub mod latex;
pub mod pneditor;
pub mod symfony;

/// Rendering geometry shared with the interactive editor.
pub const PLACE_RADIUS: f32 = 25.0;
pub const TRANS_WIDTH: f32 = 50.0;
pub const TRANS_HEIGHT: f32 = 10.0;
