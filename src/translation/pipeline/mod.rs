//! 翻译管道模块
//!
//! 从树中收集片段并在原位置读写：分类遍历、变量提取、过滤、注册表与读写策略

pub mod filters;
pub mod markers;
pub mod operations;
pub mod registry;
pub mod variables;
pub mod walker;

// 重新导出主要类型
pub use filters::{looks_textual, normalize_whitespace, NormalizedText};
pub use markers::{MarkerTable, Visited};
pub use registry::{ElementBinding, Location, Segment, SegmentRegistry, Strategy};
pub use variables::{Extraction, VariableDetector};
pub use walker::{WalkStats, Walker};
