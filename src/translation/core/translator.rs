//! 翻译引擎对外接口
//!
//! [`DomTranslator`] 持有宿主树、合并后的规则、片段注册表和节点标记表，
//! 提供附加/解除附加、切换语言、还原源文本、伪翻译和导出。
//!
//! 所有操作都是同步的，在调用方线程上直接修改树。写回时遇到已失效的节点
//! 只丢弃对应绑定，不会向调用方返回错误。

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::parsers::html::{HtmlDocument, MarkupTree};
use crate::translation::config::rules::split_list;
use crate::translation::config::{constants, text_direction, DomConfig, ParseOptions, Rules};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::{
    operations, ElementBinding, Location, MarkerTable, Segment, SegmentRegistry, VariableDetector,
    Walker,
};

use super::export::{export_entry, ExportParams, StringsExport};
use super::pseudo::pseudo_localize;

/// 一次附加的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttachStats {
    /// 实际遍历的根节点数
    pub roots: usize,
    pub nodes_visited: usize,
    pub segments_created: usize,
    pub bindings_added: usize,
    pub skipped_subtrees: usize,
    /// 附加后注册表中的片段总数
    pub total_segments: usize,
}

/// 一次渲染（切换语言或还原）的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    /// 写入译文的绑定数
    pub translated: usize,
    /// 还原为源文本的绑定数
    pub restored: usize,
    /// 因节点失效被丢弃的绑定数
    pub dropped: usize,
    /// 没有译文的片段数
    pub untranslated_segments: usize,
}

/// 文档根元素上被覆盖前的语言标记
#[derive(Debug, Clone, Default)]
struct RootMarkers {
    lang: Option<String>,
    dir: Option<String>,
}

/// 原地、可逆的标记树翻译引擎
pub struct DomTranslator<T: MarkupTree = HtmlDocument> {
    tree: T,
    config: DomConfig,
    rules: Rules,
    detector: Option<VariableDetector>,
    registry: SegmentRegistry<T::Node>,
    markers: MarkerTable<T::Node>,
    locale: Option<String>,
    root_markers: Option<RootMarkers>,
}

impl<T: MarkupTree> DomTranslator<T> {
    /// 创建引擎；配置在此验证，之后不再变化
    pub fn new(tree: T, config: DomConfig) -> TranslationResult<Self> {
        config.validate()?;
        let rules = Rules::new(&config);
        let detector = config.variable_detector()?;

        Ok(Self {
            tree,
            config,
            rules,
            detector,
            registry: SegmentRegistry::new(),
            markers: MarkerTable::new(),
            locale: None,
            root_markers: None,
        })
    }

    /// 遍历子树并注册片段；`None` 表示文档的 `<head>` 和 `<body>`
    ///
    /// 重复附加同一子树不会产生重复的绑定。
    pub fn attach_dom(&mut self, root: Option<&T::Node>) -> TranslationResult<AttachStats> {
        let roots: Vec<T::Node> = match root {
            Some(root) => vec![root.clone()],
            None => [self.tree.head(), self.tree.body()]
                .into_iter()
                .flatten()
                .collect(),
        };
        if roots.is_empty() {
            return Err(TranslationError::MissingRoot(
                "文档中没有 <head> 或 <body>".to_string(),
            ));
        }

        let mut stats = AttachStats::default();
        for root in &roots {
            let Some((tags, options)) = self.inherited_context(root) else {
                tracing::debug!("根节点位于被跳过的子树中: {:?}", root);
                continue;
            };

            let mut walker = Walker::new(&self.tree, &self.rules, &mut self.registry, &mut self.markers)
                .with_detector(self.detector.as_ref())
                .ignore_databind(self.config.ignore_databind);
            walker.walk(root, &tags, options);

            let walked = walker.stats();
            stats.roots += 1;
            stats.nodes_visited += walked.nodes_visited;
            stats.segments_created += walked.segments_created;
            stats.bindings_added += walked.bindings_added;
            stats.skipped_subtrees += walked.skipped_subtrees;
        }
        stats.total_segments = self.registry.len();

        tracing::info!(
            "附加完成: 新增 {} 个片段、{} 处出现，共 {} 个片段",
            stats.segments_created,
            stats.bindings_added,
            stats.total_segments
        );

        Ok(stats)
    }

    /// 根节点从祖先继承的标签和解析选项；祖先被整体跳过时返回 `None`
    fn inherited_context(&self, root: &T::Node) -> Option<(BTreeSet<String>, ParseOptions)> {
        let mut ancestors = Vec::new();
        let mut current = self.tree.parent(root);
        while let Some(node) = current {
            current = self.tree.parent(&node);
            if self.tree.is_element(&node) {
                ancestors.push(node);
            }
        }

        let mut tags = BTreeSet::new();
        let mut options = ParseOptions::DEFAULT;
        for node in ancestors.iter().rev() {
            let tag = self.tree.tag_name(node).unwrap_or_default();
            if self.rules.is_skip_tag(&tag) || self.rules.has_skip_class(&self.tree, node) {
                return None;
            }

            // 祖先上的强制块只作用于祖先本身
            options = options
                .with_directives(&self.tree.attribute(node, constants::ATTR_CONTENT).unwrap_or_default())
                - ParseOptions::FORCE_BLOCK;
            if self
                .tree
                .attribute(node, constants::ATTR_TRANSLATE)
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("no"))
            {
                options |= ParseOptions::DO_NOT_COLLECT;
            }
            if let Some(local) = self.tree.attribute(node, constants::ATTR_TAGS) {
                tags.extend(split_list(&local));
            }
        }

        Some((tags, options))
    }

    /// 解除附加：清除子树的标记并移除位于其中的绑定；`None` 清空整个注册表
    ///
    /// 不会还原已经写入的译文。返回移除的绑定数。
    pub fn detach_dom(&mut self, root: Option<&T::Node>) -> usize {
        let Some(root) = root else {
            let removed = self.registry.binding_count();
            self.registry.clear();
            self.markers.clear();
            tracing::debug!("清空注册表: 移除 {} 处出现", removed);
            return removed;
        };

        let subtree: HashSet<T::Node> =
            self.markers
                .clear_subtree(&self.tree, root, self.config.detach_shadow_roots);

        let tree = &self.tree;
        let mut fragments = Vec::new();
        let removed = self.registry.retain_bindings(|binding| {
            if !located_in(tree, binding, &subtree) {
                return true;
            }
            if let Location::Fragment {
                parent,
                before,
                after,
            } = &binding.location
            {
                fragments.push((parent.clone(), before.clone(), after.clone()));
            }
            false
        });

        // 序列中的节点被解除附加时，父节点上的边界标记也要撤销
        for (parent, before, after) in &fragments {
            self.markers
                .unmark_fragment(parent, before.as_ref(), after.as_ref());
        }

        tracing::debug!("解除附加子树 {:?}: 移除 {} 处出现", root, removed);
        removed
    }

    /// 切换到目标语言
    ///
    /// 对每个片段调用一次 `translate(key)`；`None` 或空字符串表示没有译文，
    /// 此时已显示译文的位置还原为源文本。
    pub fn to_language<F>(&mut self, locale: &str, mut translate: F) -> RenderStats
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut stats = RenderStats::default();
        let tree = &self.tree;
        let keys = self.registry.keys().to_vec();

        for key in keys {
            let translation = translate(&key).filter(|text| !text.is_empty());
            let Some(segment) = self.registry.get_mut(&key) else {
                continue;
            };

            segment.elements.retain_mut(|binding| {
                let result = match &translation {
                    Some(text) => operations::set(tree, binding, text).map(|()| {
                        binding.modified = true;
                        stats.translated += 1;
                    }),
                    None if binding.modified => operations::revert(tree, binding).map(|()| {
                        binding.modified = false;
                        stats.restored += 1;
                    }),
                    None => Ok(()),
                };

                match result {
                    Ok(()) => true,
                    Err(error) => {
                        tracing::warn!("丢弃失效的绑定 {:?}: {}", key, error);
                        stats.dropped += 1;
                        false
                    }
                }
            });

            if translation.is_none() {
                stats.untranslated_segments += 1;
            }
            segment.translation_string = translation;
        }

        // 丢弃已经没有任何出现的片段
        self.registry.retain_bindings(|_| true);
        self.locale = Some(locale.to_string());
        self.mark_root(locale);

        tracing::info!(
            "切换到 {}: 写入 {} 处，还原 {} 处，丢弃 {} 处",
            locale,
            stats.translated,
            stats.restored,
            stats.dropped
        );
        stats
    }

    /// 把所有显示译文的位置还原为源文本，并还原根元素的语言标记
    pub fn to_source(&mut self) -> RenderStats {
        let mut stats = RenderStats::default();
        let tree = &self.tree;
        let keys = self.registry.keys().to_vec();

        for key in keys {
            let Some(segment) = self.registry.get_mut(&key) else {
                continue;
            };

            segment.elements.retain_mut(|binding| {
                if !binding.modified {
                    return true;
                }
                match operations::revert(tree, binding) {
                    Ok(()) => {
                        binding.modified = false;
                        stats.restored += 1;
                        true
                    }
                    Err(error) => {
                        tracing::warn!("丢弃失效的绑定 {:?}: {}", key, error);
                        stats.dropped += 1;
                        false
                    }
                }
            });
            segment.translation_string = None;
        }

        self.registry.retain_bindings(|_| true);
        self.locale = None;
        self.restore_root();

        tracing::info!("还原源文本: {} 处", stats.restored);
        stats
    }

    /// 使用元音加倍的伪语言渲染，检查布局对变长文本的适应
    pub fn pseudo_translate(&mut self) -> RenderStats {
        self.to_language(constants::PSEUDO_LOCALE, |key| Some(pseudo_localize(key)))
    }

    fn mark_root(&mut self, locale: &str) {
        let Some(html) = self.tree.document_element() else {
            return;
        };

        if self.root_markers.is_none() {
            self.root_markers = Some(RootMarkers {
                lang: self.tree.attribute(&html, "lang"),
                dir: self.tree.attribute(&html, "dir"),
            });
        }
        self.tree.set_attribute(&html, "lang", Some(locale));
        self.tree
            .set_attribute(&html, "dir", Some(text_direction(locale)));
    }

    fn restore_root(&mut self) {
        let (Some(markers), Some(html)) = (self.root_markers.take(), self.tree.document_element())
        else {
            return;
        };

        self.tree.set_attribute(&html, "lang", markers.lang.as_deref());
        self.tree.set_attribute(&html, "dir", markers.dir.as_deref());
    }

    /// 导出所有片段的源字符串
    pub fn get_strings_json(&self, params: &ExportParams) -> StringsExport {
        self.registry
            .iter()
            .map(|segment| (segment.key.clone(), export_entry(segment, params)))
            .collect()
    }

    pub fn get_strings_json_string(&self, params: &ExportParams) -> TranslationResult<String> {
        Ok(serde_json::to_string_pretty(&self.get_strings_json(params))?)
    }

    /// 按发现顺序遍历片段
    pub fn segments(&self) -> impl Iterator<Item = &Segment<T::Node>> {
        self.registry.iter()
    }

    pub fn segment(&self, key: &str) -> Option<&Segment<T::Node>> {
        self.registry.get(key)
    }

    /// 在该节点上注册过出现的片段（文本、块、属性，或作为片段的父节点）
    pub fn segments_at(&self, node: &T::Node) -> Vec<&Segment<T::Node>> {
        self.markers
            .segments_at(node)
            .iter()
            .filter_map(|key| self.registry.get(key))
            .collect()
    }

    pub fn segment_count(&self) -> usize {
        self.registry.len()
    }

    pub fn current_locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn config(&self) -> &DomConfig {
        &self.config
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn into_tree(self) -> T {
        self.tree
    }
}

/// 绑定是否依附于给定子树中的节点（片段还包括两个边界和边界之间的节点）
fn located_in<T: MarkupTree>(
    tree: &T,
    binding: &ElementBinding<T::Node>,
    subtree: &HashSet<T::Node>,
) -> bool {
    match &binding.location {
        Location::Fragment {
            parent,
            before,
            after,
        } => {
            subtree.contains(parent)
                || before.as_ref().is_some_and(|node| subtree.contains(node))
                || after.as_ref().is_some_and(|node| subtree.contains(node))
                || operations::run_nodes(tree, parent, before.as_ref(), after.as_ref())
                    .is_ok_and(|run| run.iter().any(|node| subtree.contains(node)))
        }
        location => subtree.contains(location.anchor()),
    }
}
