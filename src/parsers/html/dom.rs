use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, parse_document, parse_fragment, LocalName, ParseOpts};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// 将 HTML 字节转换为 DOM
///
/// 无法识别的编码标签按 UTF-8（有损）处理。
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let s: String = if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.into_owned()
    } else {
        String::from_utf8_lossy(data).into_owned()
    };

    parse_document(RcDom::default(), Default::default()).one(s)
}

/// 以 `context` 元素为上下文解析 HTML 片段，返回脱离文档的顶层节点
pub fn fragment_to_nodes(context: &QualName, markup: &str) -> Vec<Handle> {
    let dom = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        context.clone(),
        Vec::new(),
    )
    .one(markup);

    // 片段解析结果挂在一个合成的 <html> 根元素下
    let root = dom.document.children.borrow().first().cloned();
    match root {
        Some(root) => {
            let nodes = root.children.take();
            for node in &nodes {
                node.parent.set(None);
            }
            nodes
        }
        None => Vec::new(),
    }
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点
///
/// 父指针是 `Cell<Option<Weak>>`，读取时先取出再放回。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 设置节点属性
///
/// `attr_value` 为 `None` 时移除该属性。
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<&str>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            // Add new attribute (since originally the target node didn't have it)
            if let Some(attr_value) = attr_value {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// 创建一个脱离文档的 HTML 元素
pub fn create_element(tag: &str) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 创建一个脱离文档的文本节点
pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// 深拷贝节点（含模板内容），返回的副本没有父节点
pub fn clone_node(handle: &Handle) -> Handle {
    let data = match &handle.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            name,
            attrs,
            template_contents,
            mathml_annotation_xml_integration_point,
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(template_contents.borrow().as_ref().map(clone_node)),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction { target, contents } => {
            NodeData::ProcessingInstruction {
                target: target.clone(),
                contents: contents.clone(),
            }
        }
    };

    let copy = Node::new(data);
    for child in handle.children.borrow().iter() {
        append_node(&copy, clone_node(child));
    }
    copy
}

/// 将节点从其父节点中移除
pub fn detach_node(node: &Handle) {
    if let Some(parent) = get_parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// 将节点追加为 `parent` 的最后一个子节点
pub fn append_node(parent: &Handle, child: Handle) {
    insert_node_before(parent, child, None);
}

/// 在 `reference` 之前插入节点；`reference` 不存在或不是子节点时追加到末尾
pub fn insert_node_before(parent: &Handle, child: Handle, reference: Option<&Handle>) {
    detach_node(&child);
    child.parent.set(Some(Rc::downgrade(parent)));

    let mut children = parent.children.borrow_mut();
    let index = reference
        .and_then(|reference| children.iter().position(|c| Rc::ptr_eq(c, reference)))
        .unwrap_or(children.len());
    children.insert(index, child);
}

/// 在父节点的子节点列表中查找位置
pub fn index_in_parent(node: &Handle) -> Option<(Handle, usize)> {
    let parent = get_parent_node(node)?;
    let index = parent
        .children
        .borrow()
        .iter()
        .position(|child| Rc::ptr_eq(child, node))?;
    Some((parent, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_node_attr_add_update_remove() {
        let node = create_element("a");

        set_node_attr(&node, "title", Some("Home"));
        assert_eq!(get_node_attr(&node, "title"), Some("Home".to_string()));

        set_node_attr(&node, "title", Some("Start"));
        assert_eq!(get_node_attr(&node, "title"), Some("Start".to_string()));

        set_node_attr(&node, "title", None);
        assert_eq!(get_node_attr(&node, "title"), None);
    }

    #[test]
    fn test_insert_and_detach_keep_parent_links() {
        let parent = create_element("div");
        let first = create_text_node("a");
        let second = create_element("b");

        append_node(&parent, second.clone());
        insert_node_before(&parent, first.clone(), Some(&second));

        assert_eq!(parent.children.borrow().len(), 2);
        assert!(Rc::ptr_eq(&parent.children.borrow()[0], &first));
        assert!(get_parent_node(&second).is_some());

        detach_node(&first);
        assert_eq!(parent.children.borrow().len(), 1);
        assert!(get_parent_node(&first).is_none());
        // 读取父节点不会清空父指针
        assert!(get_parent_node(&second).is_some());
    }

    #[test]
    fn test_fragment_to_nodes_is_detached() {
        let context = QualName::new(None, ns!(html), LocalName::from("p"));
        let nodes = fragment_to_nodes(&context, "Hello <b>world</b>!");

        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(|node| get_parent_node(node).is_none()));
        assert_eq!(get_node_name(&nodes[1]), Some("b"));
    }

    #[test]
    fn test_clone_node_is_deep() {
        let context = QualName::new(None, ns!(html), LocalName::from("div"));
        let nodes = fragment_to_nodes(&context, "<p title=\"x\">Hi <i>there</i></p>");
        let copy = clone_node(&nodes[0]);

        assert!(!Rc::ptr_eq(&copy, &nodes[0]));
        assert_eq!(get_node_attr(&copy, "title"), Some("x".to_string()));
        assert_eq!(copy.children.borrow().len(), 2);
    }
}
