//! 读写策略
//!
//! 四种绑定形状（文本、块、属性、片段）共用同一组 `get`/`set` 接口，注册表和公共接口
//! 不需要关心一处出现在树中的物理形式。

use crate::parsers::html::MarkupTree;
use crate::translation::error::{TranslationError, TranslationResult};

use super::filters::pad;
use super::registry::{ElementBinding, Location};
use super::variables::substitute;

/// 片段边界之间的兄弟节点
pub fn run_nodes<T: MarkupTree>(
    tree: &T,
    parent: &T::Node,
    before: Option<&T::Node>,
    after: Option<&T::Node>,
) -> TranslationResult<Vec<T::Node>> {
    let children = tree.children(parent);
    let position = |boundary: &T::Node| {
        children.iter().position(|child| child == boundary).ok_or_else(|| {
            TranslationError::InvalidBoundary(format!("{:?} 不再是 {:?} 的子节点", boundary, parent))
        })
    };

    let start = match before {
        Some(before) => position(before)? + 1,
        None => 0,
    };
    let end = match after {
        Some(after) => position(after)?,
        None => children.len(),
    };

    if start > end {
        return Err(TranslationError::InvalidBoundary(format!(
            "{:?} 中的片段边界顺序颠倒",
            parent
        )));
    }

    Ok(children[start..end].to_vec())
}

fn ensure_connected<T: MarkupTree>(tree: &T, node: &T::Node) -> TranslationResult<()> {
    if tree.is_connected(node) {
        Ok(())
    } else {
        Err(TranslationError::NodeDetached(format!("{:?}", node)))
    }
}

/// 读取绑定位置当前渲染的值
pub fn get<T: MarkupTree>(tree: &T, binding: &ElementBinding<T::Node>) -> TranslationResult<String> {
    match &binding.location {
        Location::Text { node } => tree
            .text(node)
            .ok_or_else(|| TranslationError::NodeDetached(format!("{:?} 不是文本节点", node))),
        Location::Block { node } => Ok(tree.serialize_children(node)),
        Location::Attribute { node, name } => Ok(tree.attribute(node, name).unwrap_or_default()),
        Location::Fragment {
            parent,
            before,
            after,
        } => {
            let container = tree.create_container();
            for node in run_nodes(tree, parent, before.as_ref(), after.as_ref())? {
                tree.append_child(&container, tree.deep_clone(&node));
            }
            Ok(tree.serialize_children(&container))
        }
    }
}

/// 将已经渲染好的原始值写入绑定位置
fn write<T: MarkupTree>(
    tree: &T,
    binding: &ElementBinding<T::Node>,
    rendered: &str,
) -> TranslationResult<()> {
    ensure_connected(tree, binding.location.anchor())?;

    match &binding.location {
        Location::Text { node } => {
            if !tree.set_text(node, rendered) {
                return Err(TranslationError::NodeDetached(format!("{:?} 不是文本节点", node)));
            }
        }
        Location::Block { node } => tree.set_inner_markup(node, rendered),
        Location::Attribute { node, name } => tree.set_attribute(node, name, Some(rendered)),
        Location::Fragment {
            parent,
            before,
            after,
        } => {
            let current = run_nodes(tree, parent, before.as_ref(), after.as_ref())?;
            let replacement = tree.parse_fragment(parent, rendered);
            for node in &current {
                tree.remove(node);
            }
            for node in replacement {
                tree.insert_before(parent, node, after.as_ref());
            }
        }
    }

    Ok(())
}

/// 按策略渲染文本（替换变量、补回首尾空格）并写入
pub fn set<T: MarkupTree>(
    tree: &T,
    binding: &ElementBinding<T::Node>,
    text: &str,
) -> TranslationResult<()> {
    let rendered = match &binding.location {
        Location::Attribute { .. } => text.to_string(),
        Location::Text { .. } => pad(text, binding.head, binding.tail),
        Location::Block { .. } | Location::Fragment { .. } => {
            pad(&substitute(text, &binding.block_args), binding.head, binding.tail)
        }
    };

    write(tree, binding, &rendered)
}

/// 写回注册时捕获的原始值
pub fn revert<T: MarkupTree>(tree: &T, binding: &ElementBinding<T::Node>) -> TranslationResult<()> {
    write(tree, binding, &binding.original)
}
