//! 片段注册表
//!
//! 以规范化后的源文本作为身份：树中任意位置出现的相同文本合并为同一个 [`Segment`]，
//! 每一处物理出现对应一个 [`ElementBinding`]。

use std::collections::{BTreeSet, HashMap};

/// 绑定使用的读写策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// 文本节点的字符数据
    Text,
    /// 元素的子节点标记（innerHTML）
    Block,
    /// 单个属性值
    Attribute,
    /// 父节点中两个边界之间的兄弟节点序列
    Fragment,
}

/// 绑定在树中的物理位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location<N> {
    Text {
        node: N,
    },
    Block {
        node: N,
    },
    Attribute {
        node: N,
        name: String,
    },
    /// `before`/`after` 为 `None` 分别表示父节点的开头/末尾
    Fragment {
        parent: N,
        before: Option<N>,
        after: Option<N>,
    },
}

impl<N> Location<N> {
    pub fn strategy(&self) -> Strategy {
        match self {
            Location::Text { .. } => Strategy::Text,
            Location::Block { .. } => Strategy::Block,
            Location::Attribute { .. } => Strategy::Attribute,
            Location::Fragment { .. } => Strategy::Fragment,
        }
    }

    /// 定位所依赖的节点（用于旁路标记清理和子树判断）
    pub fn anchor(&self) -> &N {
        match self {
            Location::Text { node } | Location::Block { node } | Location::Attribute { node, .. } => {
                node
            }
            Location::Fragment { parent, .. } => parent,
        }
    }
}

/// 片段与一处物理位置之间的可逆链接
#[derive(Debug, Clone)]
pub struct ElementBinding<N> {
    pub location: Location<N>,
    /// 原始文本是否有前导空白
    pub head: bool,
    /// 原始文本是否有尾随空白
    pub tail: bool,
    /// `{varN}` 对应的原始标记或 URL
    pub block_args: Vec<String>,
    /// 注册时读取到的原始渲染值，用于逐字节还原
    pub original: String,
    /// 当前位置是否显示译文
    pub modified: bool,
}

impl<N> ElementBinding<N> {
    pub fn new(location: Location<N>, original: String) -> Self {
        Self {
            location,
            head: false,
            tail: false,
            block_args: Vec::new(),
            original,
            modified: false,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.location.strategy()
    }
}

/// 一个独立的可翻译源文本单元
#[derive(Debug, Clone)]
pub struct Segment<N> {
    /// 规范化后的源文本
    pub key: String,
    /// 规范化、变量替换后的源文本
    pub source_string: String,
    /// 所有出现位置累积的标签
    pub tags: BTreeSet<String>,
    pub elements: Vec<ElementBinding<N>>,
    /// 最近一次写入的译文
    pub translation_string: Option<String>,
}

impl<N> Segment<N> {
    pub fn new(key: String) -> Self {
        Self {
            source_string: key.clone(),
            key,
            tags: BTreeSet::new(),
            elements: Vec::new(),
            translation_string: None,
        }
    }

    pub fn strategies(&self) -> BTreeSet<String> {
        self.elements
            .iter()
            .map(|binding| format!("{:?}", binding.strategy()).to_lowercase())
            .collect()
    }
}

/// 按发现顺序保存片段的注册表
#[derive(Debug, Clone)]
pub struct SegmentRegistry<N> {
    segments: HashMap<String, Segment<N>>,
    order: Vec<String>,
}

impl<N> Default for SegmentRegistry<N> {
    fn default() -> Self {
        Self {
            segments: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<N> SegmentRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取或创建片段，合并标签并追加绑定
    pub fn register<I>(&mut self, key: String, tags: I, binding: ElementBinding<N>) -> &Segment<N>
    where
        I: IntoIterator<Item = String>,
    {
        if !self.segments.contains_key(&key) {
            tracing::trace!("新建片段: {:?}", key);
            self.order.push(key.clone());
        }

        let segment = self
            .segments
            .entry(key.clone())
            .or_insert_with(|| Segment::new(key));
        segment.tags.extend(tags);
        segment.elements.push(binding);
        segment
    }

    pub fn get(&self, key: &str) -> Option<&Segment<N>> {
        self.segments.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Segment<N>> {
        self.segments.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.segments.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 按发现顺序的片段键
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    /// 按发现顺序遍历片段
    pub fn iter(&self) -> impl Iterator<Item = &Segment<N>> {
        self.order.iter().filter_map(|key| self.segments.get(key))
    }

    /// 绑定总数
    pub fn binding_count(&self) -> usize {
        self.segments.values().map(|s| s.elements.len()).sum()
    }

    /// 删除满足条件的绑定，并丢弃没有绑定的片段；返回删除的绑定数
    pub fn retain_bindings<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&ElementBinding<N>) -> bool,
    {
        let mut removed = 0;
        for segment in self.segments.values_mut() {
            let before = segment.elements.len();
            segment.elements.retain(|binding| keep(binding));
            removed += before - segment.elements.len();
        }

        let segments = &self.segments;
        let empty: Vec<String> = self
            .order
            .iter()
            .filter(|key| segments.get(*key).is_some_and(|s| s.elements.is_empty()))
            .cloned()
            .collect();
        for key in &empty {
            self.segments.remove(key);
        }
        self.order.retain(|key| self.segments.contains_key(key));

        removed
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_binding(node: u32) -> ElementBinding<u32> {
        ElementBinding::new(Location::Text { node }, "Save".to_string())
    }

    #[test]
    fn test_register_merges_identical_keys() {
        let mut registry = SegmentRegistry::new();
        registry.register("Save".to_string(), vec!["a".to_string()], text_binding(1));
        registry.register("Save".to_string(), vec!["b".to_string()], text_binding(2));
        registry.register("Cancel".to_string(), Vec::new(), text_binding(3));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.keys(), ["Save", "Cancel"]);

        let save = registry.get("Save").unwrap();
        assert_eq!(save.elements.len(), 2);
        assert_eq!(save.tags.iter().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(save.strategies().into_iter().collect::<Vec<_>>(), ["text"]);
    }

    #[test]
    fn test_retain_bindings_drops_empty_segments() {
        let mut registry = SegmentRegistry::new();
        registry.register("Save".to_string(), Vec::new(), text_binding(1));
        registry.register("Save".to_string(), Vec::new(), text_binding(2));
        registry.register("Cancel".to_string(), Vec::new(), text_binding(3));

        let removed = registry.retain_bindings(|binding| *binding.location.anchor() != 3);

        assert_eq!(removed, 1);
        assert_eq!(registry.keys(), ["Save"]);
        assert!(!registry.contains("Cancel"));
        assert_eq!(registry.binding_count(), 2);
    }
}
