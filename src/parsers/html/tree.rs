//! 标记树能力接口
//!
//! 翻译引擎只依赖 [`MarkupTree`] 提供的少量原语：节点类型、标签名、属性读写、
//! 父子/兄弟遍历、影子树根、子树序列化与片段解析、节点插入与移除。
//! [`HtmlDocument`] 是基于 html5ever + rcdom 的默认实现。

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use html5ever::interface::QualName;
use html5ever::tendril::TendrilSink;
use html5ever::{namespace_url, ns, parse_document, LocalName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::dom::{
    append_node, clone_node, create_element, create_text_node, detach_node, fragment_to_nodes,
    get_child_node_by_name, get_node_attr, get_node_name, get_parent_node, html_to_dom,
    index_in_parent, insert_node_before, set_node_attr,
};
use super::serializer::{serialize_children, serialize_document, serialize_node};

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
    Other,
}

/// 宿主标记树的最小能力集合
///
/// 所有方法都以 `&self` 调用：宿主树通常具有内部可变性（如 rcdom 的 `RefCell`）。
/// 节点句柄必须按身份比较和哈希，引擎用它作为旁路表（访问标记）的键。
pub trait MarkupTree {
    type Node: Clone + Eq + Hash + fmt::Debug;

    /// 文档根节点
    fn root(&self) -> Self::Node;
    fn kind(&self, node: &Self::Node) -> NodeKind;
    /// 小写标签名，非元素返回 `None`
    fn tag_name(&self, node: &Self::Node) -> Option<String>;
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    /// `value` 为 `None` 时移除属性
    fn set_attribute(&self, node: &Self::Node, name: &str, value: Option<&str>);
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    /// 元素的影子树根（如果有）
    fn shadow_root(&self, node: &Self::Node) -> Option<Self::Node>;
    /// 文本或注释节点的字符数据
    fn text(&self, node: &Self::Node) -> Option<String>;
    /// 写入文本节点的字符数据；节点不是文本节点时返回 `false`
    fn set_text(&self, node: &Self::Node, text: &str) -> bool;
    fn serialize_children(&self, node: &Self::Node) -> String;
    fn serialize_node(&self, node: &Self::Node) -> String;
    /// 以 `context` 为上下文解析标记，返回脱离文档的节点
    fn parse_fragment(&self, context: &Self::Node, markup: &str) -> Vec<Self::Node>;
    /// 新建一个脱离文档的容器元素
    fn create_container(&self) -> Self::Node;
    fn create_text(&self, text: &str) -> Self::Node;
    /// 深拷贝，副本脱离文档
    fn deep_clone(&self, node: &Self::Node) -> Self::Node;
    fn append_child(&self, parent: &Self::Node, child: Self::Node);
    /// `reference` 为 `None` 时追加到末尾
    fn insert_before(&self, parent: &Self::Node, child: Self::Node, reference: Option<&Self::Node>);
    fn remove(&self, node: &Self::Node);

    fn is_element(&self, node: &Self::Node) -> bool {
        self.kind(node) == NodeKind::Element
    }

    fn is_text(&self, node: &Self::Node) -> bool {
        self.kind(node) == NodeKind::Text
    }

    /// 节点是否仍挂在文档上
    fn is_connected(&self, node: &Self::Node) -> bool {
        let mut current = node.clone();
        while let Some(parent) = self.parent(&current) {
            current = parent;
        }
        self.kind(&current) == NodeKind::Document
    }

    /// 文档元素（`<html>`）
    fn document_element(&self) -> Option<Self::Node> {
        self.children(&self.root())
            .into_iter()
            .find(|child| self.tag_name(child).as_deref() == Some("html"))
    }

    fn head(&self) -> Option<Self::Node> {
        let html = self.document_element()?;
        self.children(&html)
            .into_iter()
            .find(|child| self.tag_name(child).as_deref() == Some("head"))
    }

    fn body(&self) -> Option<Self::Node> {
        let html = self.document_element()?;
        self.children(&html)
            .into_iter()
            .find(|child| self.tag_name(child).as_deref() == Some("body"))
    }

    /// 用解析后的标记替换全部子节点（相当于设置 innerHTML）
    fn set_inner_markup(&self, node: &Self::Node, markup: &str) {
        let nodes = self.parse_fragment(node, markup);
        for child in self.children(node) {
            self.remove(&child);
        }
        for child in nodes {
            self.append_child(node, child);
        }
    }

    fn class_list(&self, node: &Self::Node) -> Vec<String> {
        self.attribute(node, "class")
            .map(|class| class.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// 所有后代文本节点拼接后的文本
    fn text_content(&self, node: &Self::Node) -> String {
        match self.kind(node) {
            NodeKind::Text => self.text(node).unwrap_or_default(),
            NodeKind::Comment | NodeKind::Other => String::new(),
            NodeKind::Element | NodeKind::Document => self
                .children(node)
                .iter()
                .map(|child| self.text_content(child))
                .collect(),
        }
    }
}

/// 按指针身份比较的 rcdom 句柄
#[derive(Clone)]
pub struct NodeRef(pub Handle);

impl NodeRef {
    pub fn handle(&self) -> &Handle {
        &self.0
    }
}

impl From<Handle> for NodeRef {
    fn from(handle: Handle) -> Self {
        NodeRef(handle)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Element { name, .. } => write!(f, "NodeRef(<{}>)", name.local),
            NodeData::Text { contents } => write!(f, "NodeRef({:?})", &**contents.borrow()),
            NodeData::Comment { .. } => write!(f, "NodeRef(#comment)"),
            NodeData::Document => write!(f, "NodeRef(#document)"),
            _ => write!(f, "NodeRef(#other)"),
        }
    }
}

/// 基于 html5ever + rcdom 的 HTML 文档
pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    /// 解析完整的 HTML 文档
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { dom }
    }

    /// 按指定编码标签解码字节后解析
    pub fn from_bytes(data: &[u8], document_encoding: &str) -> Self {
        Self {
            dom: html_to_dom(data, document_encoding),
        }
    }

    pub fn from_dom(dom: RcDom) -> Self {
        Self { dom }
    }

    pub fn dom(&self) -> &RcDom {
        &self.dom
    }

    pub fn into_dom(self) -> RcDom {
        self.dom
    }

    pub fn document(&self) -> NodeRef {
        NodeRef(self.dom.document.clone())
    }

    /// 序列化整个文档
    pub fn serialize(&self) -> String {
        serialize_children(&self.dom.document)
    }

    /// 序列化整个文档并编码
    pub fn to_bytes(&self, document_encoding: &str) -> Vec<u8> {
        serialize_document(&self.dom.document, document_encoding)
    }

    /// 按文档顺序查找第一个指定标签的元素
    pub fn find_first(&self, tag: &str) -> Option<NodeRef> {
        fn find(handle: &Handle, tag: &str) -> Option<Handle> {
            if let NodeData::Element { ref name, .. } = handle.data {
                if &*name.local == tag {
                    return Some(handle.clone());
                }
            }
            handle
                .children
                .borrow()
                .iter()
                .find_map(|child| find(child, tag))
        }

        find(&self.dom.document, tag).map(NodeRef)
    }

    /// 按文档顺序查找所有指定标签的元素
    pub fn find_all(&self, tag: &str) -> Vec<NodeRef> {
        fn collect(handle: &Handle, tag: &str, found: &mut Vec<NodeRef>) {
            if let NodeData::Element { ref name, .. } = handle.data {
                if &*name.local == tag {
                    found.push(NodeRef(handle.clone()));
                }
            }
            for child in handle.children.borrow().iter() {
                collect(child, tag, found);
            }
        }

        let mut found = Vec::new();
        collect(&self.dom.document, tag, &mut found);
        found
    }

    fn context_name(node: &Handle) -> QualName {
        match &node.data {
            NodeData::Element { name, .. } => name.clone(),
            _ => QualName::new(None, ns!(html), LocalName::from("body")),
        }
    }
}

impl MarkupTree for HtmlDocument {
    type Node = NodeRef;

    fn root(&self) -> NodeRef {
        self.document()
    }

    fn kind(&self, node: &NodeRef) -> NodeKind {
        match node.0.data {
            NodeData::Document => NodeKind::Document,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text { .. } => NodeKind::Text,
            NodeData::Comment { .. } => NodeKind::Comment,
            _ => NodeKind::Other,
        }
    }

    fn tag_name(&self, node: &NodeRef) -> Option<String> {
        get_node_name(&node.0).map(str::to_ascii_lowercase)
    }

    fn attribute(&self, node: &NodeRef, name: &str) -> Option<String> {
        get_node_attr(&node.0, name)
    }

    fn set_attribute(&self, node: &NodeRef, name: &str, value: Option<&str>) {
        set_node_attr(&node.0, name, value)
    }

    fn children(&self, node: &NodeRef) -> Vec<NodeRef> {
        node.0.children.borrow().iter().cloned().map(NodeRef).collect()
    }

    fn parent(&self, node: &NodeRef) -> Option<NodeRef> {
        get_parent_node(&node.0).map(NodeRef)
    }

    fn next_sibling(&self, node: &NodeRef) -> Option<NodeRef> {
        let (parent, index) = index_in_parent(&node.0)?;
        let sibling = parent.children.borrow().get(index + 1).cloned();
        sibling.map(NodeRef)
    }

    fn previous_sibling(&self, node: &NodeRef) -> Option<NodeRef> {
        let (parent, index) = index_in_parent(&node.0)?;
        let sibling = index
            .checked_sub(1)
            .and_then(|index| parent.children.borrow().get(index).cloned());
        sibling.map(NodeRef)
    }

    /// 声明式影子树：`<template shadowrootmode>` 子元素的模板内容
    fn shadow_root(&self, node: &NodeRef) -> Option<NodeRef> {
        let template = get_child_node_by_name(&node.0, "template")?;
        get_node_attr(&template, "shadowrootmode")?;
        match &template.data {
            NodeData::Element {
                template_contents, ..
            } => template_contents.borrow().clone().map(NodeRef),
            _ => None,
        }
    }

    fn text(&self, node: &NodeRef) -> Option<String> {
        match &node.0.data {
            NodeData::Text { contents } => Some(contents.borrow().to_string()),
            NodeData::Comment { contents } => Some(contents.to_string()),
            _ => None,
        }
    }

    fn set_text(&self, node: &NodeRef, text: &str) -> bool {
        match &node.0.data {
            NodeData::Text { contents } => {
                let mut contents = contents.borrow_mut();
                contents.clear();
                contents.push_slice(text);
                true
            }
            _ => false,
        }
    }

    fn serialize_children(&self, node: &NodeRef) -> String {
        serialize_children(&node.0)
    }

    fn serialize_node(&self, node: &NodeRef) -> String {
        serialize_node(&node.0)
    }

    fn parse_fragment(&self, context: &NodeRef, markup: &str) -> Vec<NodeRef> {
        fragment_to_nodes(&Self::context_name(&context.0), markup)
            .into_iter()
            .map(NodeRef)
            .collect()
    }

    fn create_container(&self) -> NodeRef {
        NodeRef(create_element("div"))
    }

    fn create_text(&self, text: &str) -> NodeRef {
        NodeRef(create_text_node(text))
    }

    fn deep_clone(&self, node: &NodeRef) -> NodeRef {
        NodeRef(clone_node(&node.0))
    }

    fn append_child(&self, parent: &NodeRef, child: NodeRef) {
        append_node(&parent.0, child.0)
    }

    fn insert_before(&self, parent: &NodeRef, child: NodeRef, reference: Option<&NodeRef>) {
        insert_node_before(&parent.0, child.0, reference.map(|r| &r.0))
    }

    fn remove(&self, node: &NodeRef) {
        detach_node(&node.0)
    }
}
