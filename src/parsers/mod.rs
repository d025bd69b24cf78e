//! # 解析器模块
//!
//! 这个模块包含翻译引擎所依赖的全部标记树操作：
//!
//! - `html` - `MarkupTree` 能力接口、html5ever/rcdom 实现、序列化与片段解析
//!
//! 翻译逻辑不在这里；上层只通过 `MarkupTree` 访问树，因此宿主树实现可以替换。

pub mod html;

pub use html::{html_to_dom, HtmlDocument, MarkupTree, NodeKind, NodeRef};
