//! 分类规则表
//!
//! 默认规则表是不可变的常量，在构造时与实例配置合并为一份 [`Rules`]，之后不再修改。

use std::collections::HashSet;

use crate::parsers::html::MarkupTree;

use super::constants;
use super::manager::DomConfig;

/// 合并后的分类规则
#[derive(Debug, Clone)]
pub struct Rules {
    skip_tags: HashSet<String>,
    no_variable_tags: HashSet<String>,
    skip_classes: HashSet<String>,
    block_tags: HashSet<String>,
    global_attrs: Vec<String>,
}

fn owned_set(defaults: &[&str], extra: &[String]) -> HashSet<String> {
    defaults
        .iter()
        .map(|s| s.to_string())
        .chain(extra.iter().map(|s| s.trim().to_ascii_lowercase()))
        .filter(|s| !s.is_empty())
        .collect()
}

impl Rules {
    pub fn new(config: &DomConfig) -> Self {
        let skip_classes = constants::SKIP_CLASSES
            .iter()
            .map(|s| s.to_string())
            .chain(config.ignore_classes.iter().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            skip_tags: owned_set(constants::SKIP_TAGS, &config.ignore_tags),
            no_variable_tags: owned_set(constants::NO_VARIABLE_TAGS, &[]),
            skip_classes,
            block_tags: owned_set(constants::BLOCK_TAGS, &[]),
            global_attrs: config
                .parse_attrs
                .iter()
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn is_skip_tag(&self, tag: &str) -> bool {
        self.skip_tags.contains(tag)
    }

    pub fn is_no_variable_tag(&self, tag: &str) -> bool {
        self.no_variable_tags.contains(tag)
    }

    pub fn is_block_tag(&self, tag: &str) -> bool {
        self.block_tags.contains(tag)
    }

    pub fn is_skip_class(&self, class: &str) -> bool {
        self.skip_classes.contains(class)
    }

    /// 节点是否带有跳过的 class
    pub fn has_skip_class<T: MarkupTree>(&self, tree: &T, node: &T::Node) -> bool {
        tree.class_list(node)
            .iter()
            .any(|class| self.is_skip_class(class))
    }

    /// 节点是否被显式标记为排除（`tx-content="exclude"` 或 `translate="no"`）
    pub fn is_explicitly_excluded<T: MarkupTree>(&self, tree: &T, node: &T::Node) -> bool {
        let excluded_by_content = tree
            .attribute(node, constants::ATTR_CONTENT)
            .is_some_and(|value| value.split_whitespace().any(|d| d == "exclude"));
        let excluded_by_translate = tree
            .attribute(node, constants::ATTR_TRANSLATE)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("no"));

        excluded_by_content || excluded_by_translate
    }

    /// 元素的不透明性：变量提取时整体替换为 `{varN}`
    pub fn is_opaque<T: MarkupTree>(&self, tree: &T, node: &T::Node) -> bool {
        let Some(tag) = tree.tag_name(node) else {
            return false;
        };
        self.is_skip_tag(&tag)
            || self.has_skip_class(tree, node)
            || self.is_explicitly_excluded(tree, node)
    }

    pub fn global_attrs(&self) -> &[String] {
        &self.global_attrs
    }

    /// 节点的候选可翻译属性（按标签规则、节点局部列表、全局列表的顺序，去重）
    pub fn candidate_attributes<T: MarkupTree>(&self, tree: &T, node: &T::Node) -> Vec<String> {
        let tag = tree.tag_name(node).unwrap_or_default();
        let mut attrs: Vec<String> = Vec::new();
        let mut push = |name: &str| {
            if !attrs.iter().any(|existing| existing == name) {
                attrs.push(name.to_string());
            }
        };

        match tag.as_str() {
            "a" | "area" => {
                push("title");
                push("href");
            }
            "img" => {
                push("title");
                push("alt");
                push("src");
                push("srcset");
            }
            "meta" => {
                let allowed = constants::META_NAME_ATTRS.iter().any(|attr| {
                    tree.attribute(node, attr).is_some_and(|value| {
                        constants::META_NAMES.contains(&value.trim().to_ascii_lowercase().as_str())
                    })
                });
                if allowed {
                    push("content");
                }
            }
            "input" => {
                push("placeholder");
                let input_type = tree
                    .attribute(node, "type")
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase();
                if constants::INPUT_VALUE_TYPES.contains(&input_type.as_str()) {
                    push("value");
                } else if input_type == "image" {
                    push("alt");
                    push("src");
                }
            }
            "textarea" => push("placeholder"),
            _ => {}
        }

        if let Some(extra) = tree.attribute(node, constants::ATTR_EXTRA_ATTRS) {
            for name in split_list(&extra) {
                push(&name);
            }
        }

        for name in &self.global_attrs {
            push(name);
        }

        attrs
    }
}

/// 解析逗号或空白分隔的列表
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn is_url_attribute(name: &str) -> bool {
    constants::URL_ATTRS.contains(&name)
}
