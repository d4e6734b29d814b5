//! 引擎统一错误类型: 结构、解析、分析与 I/O 四类失败。
use thiserror::Error;

use crate::net::structure::Arc;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("node {0} does not exist")]
    UnknownNode(String),

    #[error("node key '{0}' shall start with 'P' or 'T'")]
    BadNodeKey(String),

    #[error("arc {from} -> {to} already exists")]
    DuplicateArc { from: String, to: String },

    #[error("arc {from} -> {to} does not exist")]
    UnknownArc { from: String, to: String },

    #[error("cannot link {from} -> {to}: nodes are of the same kind")]
    NotBipartite { from: String, to: String },

    #[error("marking holds {got} entries but the net has {expected} places")]
    MarkingMismatch { expected: usize, got: usize },

    #[error("refusing to save an empty net")]
    EmptyNet,

    #[error("the net is not an event graph: {} offending arc(s)", .0.len())]
    NotAnEventGraph(Vec<Arc>),

    #[error("no optimal policy found")]
    NoPolicy,

    #[error("malformed {record} record '{text}': {reason}")]
    Malformed {
        record: &'static str,
        text: String,
        reason: String,
    },

    #[error("duration {0} shall be >= 0")]
    NegativeDuration(f32),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
