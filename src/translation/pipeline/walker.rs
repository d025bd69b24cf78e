//! 树遍历与分类
//!
//! 深度优先遍历宿主树，按规则把每处可翻译内容归为文本、块、属性或片段，
//! 并注册到 [`SegmentRegistry`]。遍历只读取树，不修改任何节点。

use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::parsers::html::{MarkupTree, NodeKind};
use crate::translation::config::rules::{is_url_attribute, split_list};
use crate::translation::config::{constants, ParseOptions, Rules};

use super::filters::{looks_textual, normalize_whitespace};
use super::markers::{MarkerTable, Visited};
use super::registry::{ElementBinding, Location, SegmentRegistry};
use super::variables::{extract, Extraction, VariableDetector};

/// 一次遍历的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub nodes_visited: usize,
    pub bindings_added: usize,
    pub segments_created: usize,
    pub skipped_subtrees: usize,
}

/// 分类遍历器
pub struct Walker<'a, T: MarkupTree> {
    tree: &'a T,
    rules: &'a Rules,
    detector: Option<&'a VariableDetector>,
    ignore_databind: bool,
    registry: &'a mut SegmentRegistry<T::Node>,
    markers: &'a mut MarkerTable<T::Node>,
    stats: WalkStats,
}

impl<'a, T: MarkupTree> Walker<'a, T> {
    pub fn new(
        tree: &'a T,
        rules: &'a Rules,
        registry: &'a mut SegmentRegistry<T::Node>,
        markers: &'a mut MarkerTable<T::Node>,
    ) -> Self {
        Self {
            tree,
            rules,
            detector: None,
            ignore_databind: false,
            registry,
            markers,
            stats: WalkStats::default(),
        }
    }

    pub fn with_detector(mut self, detector: Option<&'a VariableDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// 关闭绑定标记检测，行内内容总是合并为片段
    pub fn ignore_databind(mut self, ignore: bool) -> Self {
        self.ignore_databind = ignore;
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// 从 `node` 开始遍历
    pub fn walk(&mut self, node: &T::Node, tags: &BTreeSet<String>, options: ParseOptions) {
        self.stats.nodes_visited += 1;

        match self.tree.kind(node) {
            NodeKind::Text => {
                if options.collects() {
                    self.register_text(node, tags);
                }
            }
            NodeKind::Element => self.walk_element(node, tags, options),
            NodeKind::Document => self.walk_children(node, tags, options),
            NodeKind::Comment | NodeKind::Other => {}
        }
    }

    fn walk_element(&mut self, node: &T::Node, tags: &BTreeSet<String>, options: ParseOptions) {
        let tag = self.tree.tag_name(node).unwrap_or_default();
        if self.rules.is_skip_tag(&tag) || self.rules.has_skip_class(self.tree, node) {
            tracing::trace!("跳过子树: <{}>", tag);
            self.stats.skipped_subtrees += 1;
            return;
        }

        let mut options = options.with_directives(
            &self
                .tree
                .attribute(node, constants::ATTR_CONTENT)
                .unwrap_or_default(),
        );
        if self
            .tree
            .attribute(node, constants::ATTR_TRANSLATE)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("no"))
        {
            options |= ParseOptions::DO_NOT_COLLECT;
        }

        let tags = match self.tree.attribute(node, constants::ATTR_TAGS) {
            Some(local) => {
                let mut merged = tags.clone();
                merged.extend(split_list(&local));
                Cow::Owned(merged)
            }
            None => Cow::Borrowed(tags),
        };

        if options.collects() {
            self.register_attributes(node, &tags, options);
        }

        if self.markers.has(node, Visited::BLOCK) {
            // 已注册为块：子节点可能已被译文替换，不再按当前形状分类
            tracing::trace!("块已注册，跳过: <{}>", tag);
        } else if self.is_block_shaped(node, options) {
            if options.collects() {
                self.register_block(node, &tag, &tags, options);
            }
            let children = self.tree.children(node);
            self.walk_nested(&children, &tags, options);
        } else {
            self.walk_children(node, &tags, options);
        }

        if let Some(shadow) = self.tree.shadow_root(node) {
            self.walk(&shadow, &tags, options);
        }
    }

    /// 子节点只有文本和 `<br>`（或被强制为块、或没有子节点）
    fn is_block_shaped(&self, node: &T::Node, options: ParseOptions) -> bool {
        if options.contains(ParseOptions::FORCE_BLOCK) {
            return true;
        }

        self.tree.children(node).iter().all(|child| match self.tree.kind(child) {
            NodeKind::Text => true,
            NodeKind::Element => self.tree.tag_name(child).as_deref() == Some("br"),
            NodeKind::Comment => self.ignore_databind || !self.is_binding_comment(child),
            _ => false,
        })
    }

    fn is_block_element(&self, node: &T::Node) -> bool {
        self.tree
            .tag_name(node)
            .is_some_and(|tag| self.rules.is_block_tag(&tag))
    }

    /// 按块级子元素把子节点切分成行内序列，序列尽量合并为片段
    fn walk_children(&mut self, node: &T::Node, tags: &BTreeSet<String>, options: ParseOptions) {
        let children = self.tree.children(node);
        let mut i = 0;

        while i < children.len() {
            if self.is_block_element(&children[i]) {
                self.walk(&children[i], tags, options);
                i += 1;
                continue;
            }

            let before = i.checked_sub(1).map(|p| children[p].clone());
            if self.markers.fragment_visited(node, before.as_ref()) {
                // 片段已注册：序列可能已被译文替换，直接跳到记录的右边界
                i = self.recorded_fragment_end(&children, i);
                continue;
            }

            let end = (i..children.len())
                .find(|&j| self.is_block_element(&children[j]))
                .unwrap_or(children.len());
            let run = &children[i..end];

            if !options.collects() || !self.should_merge(run) {
                for child in run {
                    self.walk(child, tags, options);
                }
            } else if run.len() == 1 && self.tree.is_text(&run[0]) {
                self.walk(&run[0], tags, options);
            } else {
                let after = children.get(end).cloned();
                if self.register_fragment(node, before, after, run, tags, options) {
                    self.walk_nested(run, tags, options);
                } else {
                    // 合并后没有可翻译文本（例如只剩占位符）时退回逐个遍历
                    for child in run {
                        self.walk(child, tags, options);
                    }
                }
            }

            i = end;
        }
    }

    /// 已注册片段的右边界：从 `start` 起第一个带有 `RUN_BEFORE` 标记的兄弟节点
    fn recorded_fragment_end(&self, children: &[T::Node], start: usize) -> usize {
        (start..children.len())
            .find(|&j| self.markers.has(&children[j], Visited::RUN_BEFORE))
            .unwrap_or(children.len())
    }

    /// 块或片段内部的子元素单独遍历，各自的文本和属性作为独立的出现注册
    ///
    /// 直接的文本子节点属于外层单元本身，不再单独注册。
    fn walk_nested(&mut self, nodes: &[T::Node], tags: &BTreeSet<String>, options: ParseOptions) {
        let options = options - ParseOptions::FORCE_BLOCK;
        for node in nodes {
            if self.tree.is_element(node) {
                self.walk(node, tags, options);
            }
        }
    }

    /// 行内序列是否作为一个整体翻译
    ///
    /// 需要有可见文本，并且文本不只来自单个子元素；带有框架绑定标记的序列逐个遍历。
    fn should_merge(&self, run: &[T::Node]) -> bool {
        let mut direct_text = false;
        let mut elements_with_text = 0;

        for node in run {
            match self.tree.kind(node) {
                NodeKind::Text => {
                    direct_text |= self
                        .tree
                        .text(node)
                        .is_some_and(|text| !text.trim().is_empty());
                }
                NodeKind::Element => {
                    if !self.tree.text_content(node).trim().is_empty() {
                        elements_with_text += 1;
                    }
                }
                _ => {}
            }
        }

        if !direct_text && elements_with_text < 2 {
            return false;
        }

        self.ignore_databind || !run.iter().any(|node| self.has_binding_marker(node))
    }

    fn is_binding_comment(&self, node: &T::Node) -> bool {
        let Some(text) = self.tree.text(node) else {
            return false;
        };
        let text = text.trim();
        text.is_empty()
            || constants::BINDING_COMMENT_PREFIXES
                .iter()
                .any(|prefix| text.starts_with(prefix))
    }

    /// 节点或其后代是否带有前端框架的绑定标记
    fn has_binding_marker(&self, node: &T::Node) -> bool {
        match self.tree.kind(node) {
            NodeKind::Comment => self.is_binding_comment(node),
            NodeKind::Element => {
                let bound = self.tree.class_list(node).iter().any(|class| {
                    constants::BINDING_CLASS_PREFIXES
                        .iter()
                        .any(|prefix| class.starts_with(prefix))
                });
                bound
                    || self
                        .tree
                        .children(node)
                        .iter()
                        .any(|child| self.has_binding_marker(child))
            }
            _ => false,
        }
    }

    fn add(&mut self, key: String, tags: &BTreeSet<String>, binding: ElementBinding<T::Node>) {
        if !self.registry.contains(&key) {
            self.stats.segments_created += 1;
        }
        self.markers.link_segment(binding.location.anchor(), &key);
        tracing::trace!("注册 {:?} 出现: {:?}", binding.strategy(), key);
        self.registry.register(key, tags.iter().cloned(), binding);
        self.stats.bindings_added += 1;
    }

    fn register_text(&mut self, node: &T::Node, tags: &BTreeSet<String>) {
        if self.markers.has(node, Visited::TEXT) {
            return;
        }
        let Some(raw) = self.tree.text(node) else {
            return;
        };

        let normalized = normalize_whitespace(&raw);
        if normalized.text.is_empty() || !looks_textual(&normalized.text) {
            return;
        }

        self.markers.mark(node, Visited::TEXT);
        let mut binding = ElementBinding::new(Location::Text { node: node.clone() }, raw);
        binding.head = normalized.head;
        binding.tail = normalized.tail;
        self.add(normalized.text, tags, binding);
    }

    fn register_attributes(&mut self, node: &T::Node, tags: &BTreeSet<String>, options: ParseOptions) {
        let forced = self
            .tree
            .attribute(node, constants::ATTR_FORCE_ATTRS)
            .map(|value| split_list(&value))
            .unwrap_or_default();

        let mut names = self.rules.candidate_attributes(self.tree, node);
        for name in &forced {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }

        for name in names {
            let force = forced.contains(&name);
            if is_url_attribute(&name) && options.urls_as_vars() && !force {
                continue;
            }
            if self.markers.attribute_visited(node, &name) {
                continue;
            }
            let Some(value) = self.tree.attribute(node, &name) else {
                continue;
            };

            let normalized = normalize_whitespace(&value);
            if normalized.text.is_empty() || (!force && !looks_textual(&normalized.text)) {
                continue;
            }

            self.markers.mark_attribute(node, &name);
            let binding = ElementBinding::new(
                Location::Attribute {
                    node: node.clone(),
                    name,
                },
                value,
            );
            self.add(normalized.text, tags, binding);
        }
    }

    fn extract_variables(
        &self,
        context: &T::Node,
        tag: &str,
        raw: &str,
        options: ParseOptions,
    ) -> Extraction {
        if self.rules.is_no_variable_tag(tag) {
            Extraction {
                text: raw.to_string(),
                args: Vec::new(),
            }
        } else {
            extract(
                self.tree,
                self.rules,
                context,
                raw,
                self.detector,
                options.urls_as_vars(),
            )
        }
    }

    fn register_block(
        &mut self,
        node: &T::Node,
        tag: &str,
        tags: &BTreeSet<String>,
        options: ParseOptions,
    ) {
        if self.markers.has(node, Visited::BLOCK) {
            return;
        }

        let raw = self.tree.serialize_children(node);
        let extraction = self.extract_variables(node, tag, &raw, options);
        let normalized = normalize_whitespace(&extraction.text);
        if normalized.text.is_empty() || !looks_textual(&normalized.text) {
            return;
        }

        self.markers.mark(node, Visited::BLOCK);
        let mut binding = ElementBinding::new(Location::Block { node: node.clone() }, raw);
        binding.head = normalized.head;
        binding.tail = normalized.tail;
        binding.block_args = extraction.args;
        self.add(normalized.text, tags, binding);
    }

    fn register_fragment(
        &mut self,
        parent: &T::Node,
        before: Option<T::Node>,
        after: Option<T::Node>,
        run: &[T::Node],
        tags: &BTreeSet<String>,
        options: ParseOptions,
    ) -> bool {
        if self.markers.fragment_visited(parent, before.as_ref()) {
            return true;
        }

        let container = self.tree.create_container();
        for node in run {
            self.tree.append_child(&container, self.tree.deep_clone(node));
        }
        let raw = self.tree.serialize_children(&container);

        let tag = self.tree.tag_name(parent).unwrap_or_default();
        let extraction = self.extract_variables(parent, &tag, &raw, options);
        let normalized = normalize_whitespace(&extraction.text);
        if normalized.text.is_empty() || !looks_textual(&normalized.text) {
            return false;
        }

        self.markers
            .mark_fragment(parent, before.as_ref(), after.as_ref());
        let mut binding = ElementBinding::new(
            Location::Fragment {
                parent: parent.clone(),
                before,
                after,
            },
            raw,
        );
        binding.head = normalized.head;
        binding.tail = normalized.tail;
        binding.block_args = extraction.args;
        self.add(normalized.text, tags, binding);
        true
    }
}
