//! 存档读写: 三数组 JSON 信封加遗留逗号分隔记录。

pub mod json;
