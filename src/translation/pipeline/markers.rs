//! 节点访问标记
//!
//! 已访问的节点、属性和片段边界记录在以节点身份为键的旁路表中，宿主树不需要支持自定义属性。
//! 重复遍历同一棵树时，这些标记保证同一处出现不会被注册两次。

use std::collections::{BTreeSet, HashMap, HashSet};

use bitflags::bitflags;

use crate::parsers::html::MarkupTree;

bitflags! {
    /// 节点上的访问标记
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Visited: u8 {
        /// 文本节点已注册
        const TEXT          = 0b0000_0001;
        /// 元素已作为块注册
        const BLOCK         = 0b0000_0010;
        /// 紧跟在该节点之后的片段已注册（片段左边界）
        const RUN_AFTER     = 0b0000_0100;
        /// 紧挨在该节点之前的片段已注册（片段右边界）
        const RUN_BEFORE    = 0b0000_1000;
        /// 从该父节点开头开始的片段已注册
        const RUN_AT_START  = 0b0001_0000;
        /// 延伸到该父节点末尾的片段已注册
        const RUN_AT_END    = 0b0010_0000;
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeMarkers {
    pub visited: Visited,
    /// 已注册的属性名
    pub attributes: BTreeSet<String>,
    /// 绑定在此节点上的片段键
    pub segments: BTreeSet<String>,
}

/// 节点身份 → 访问标记
#[derive(Debug, Clone)]
pub struct MarkerTable<N> {
    nodes: HashMap<N, NodeMarkers>,
}

impl<N> Default for MarkerTable<N> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }
}

impl<N: Clone + Eq + std::hash::Hash> MarkerTable<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: &N) -> Option<&NodeMarkers> {
        self.nodes.get(node)
    }

    pub fn has(&self, node: &N, flag: Visited) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|markers| markers.visited.contains(flag))
    }

    pub fn mark(&mut self, node: &N, flag: Visited) {
        self.nodes.entry(node.clone()).or_default().visited |= flag;
    }

    pub fn unmark(&mut self, node: &N, flag: Visited) {
        if let Some(markers) = self.nodes.get_mut(node) {
            markers.visited.remove(flag);
        }
    }

    pub fn attribute_visited(&self, node: &N, name: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|markers| markers.attributes.contains(name))
    }

    pub fn mark_attribute(&mut self, node: &N, name: &str) {
        self.nodes
            .entry(node.clone())
            .or_default()
            .attributes
            .insert(name.to_string());
    }

    /// 片段是否已注册（以左边界判断）
    pub fn fragment_visited(&self, parent: &N, before: Option<&N>) -> bool {
        match before {
            Some(before) => self.has(before, Visited::RUN_AFTER),
            None => self.has(parent, Visited::RUN_AT_START),
        }
    }

    pub fn mark_fragment(&mut self, parent: &N, before: Option<&N>, after: Option<&N>) {
        match before {
            Some(before) => self.mark(before, Visited::RUN_AFTER),
            None => self.mark(parent, Visited::RUN_AT_START),
        }
        match after {
            Some(after) => self.mark(after, Visited::RUN_BEFORE),
            None => self.mark(parent, Visited::RUN_AT_END),
        }
    }

    /// 撤销片段的边界标记，之后遍历父节点时会重新分类这段序列
    pub fn unmark_fragment(&mut self, parent: &N, before: Option<&N>, after: Option<&N>) {
        match before {
            Some(before) => self.unmark(before, Visited::RUN_AFTER),
            None => self.unmark(parent, Visited::RUN_AT_START),
        }
        match after {
            Some(after) => self.unmark(after, Visited::RUN_BEFORE),
            None => self.unmark(parent, Visited::RUN_AT_END),
        }
    }

    /// 记录节点上的片段反向引用
    pub fn link_segment(&mut self, node: &N, key: &str) {
        self.nodes
            .entry(node.clone())
            .or_default()
            .segments
            .insert(key.to_string());
    }

    pub fn segments_at(&self, node: &N) -> Vec<String> {
        self.nodes
            .get(node)
            .map(|markers| markers.segments.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// 递归清除子树的标记，返回子树中的全部节点
    pub fn clear_subtree<T>(&mut self, tree: &T, root: &N, include_shadow: bool) -> HashSet<N>
    where
        T: MarkupTree<Node = N>,
    {
        let mut subtree = HashSet::new();
        let mut stack = vec![root.clone()];

        while let Some(node) = stack.pop() {
            self.nodes.remove(&node);
            stack.extend(tree.children(&node));
            if include_shadow {
                if let Some(shadow) = tree.shadow_root(&node) {
                    stack.push(shadow);
                }
            }
            subtree.insert(node);
        }

        subtree
    }
}
