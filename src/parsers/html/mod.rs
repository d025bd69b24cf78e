//! HTML标记树模块
//!
//! - `tree`: `MarkupTree` 能力接口与 `HtmlDocument` 实现
//! - `dom`: 基于 rcdom 句柄的基础DOM操作
//! - `serializer`: 子树序列化
//! - `utils`: 基础工具函数和常量

pub mod dom;
pub mod serializer;
pub mod tree;
pub mod utils;

pub use dom::{
    clone_node, create_element, create_text_node, detach_node, fragment_to_nodes,
    get_child_node_by_name, get_node_attr, get_node_name, get_parent_node, html_to_dom,
    set_node_attr,
};
pub use serializer::{serialize_children, serialize_document, serialize_node};
pub use tree::{HtmlDocument, MarkupTree, NodeKind, NodeRef};
pub use utils::{escape_attribute, WHITESPACES};
