use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, SerializableHandle};

fn serialize_with_scope(handle: &Handle, traversal_scope: TraversalScope) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = handle.clone().into();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };

    // 写入 Vec 不会产生 IO 错误
    if let Err(err) = serialize(&mut buf, &serializable, opts) {
        tracing::warn!("序列化DOM失败: {}", err);
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// 序列化节点的全部子节点（相当于 innerHTML）
pub fn serialize_children(handle: &Handle) -> String {
    serialize_with_scope(handle, TraversalScope::ChildrenOnly(None))
}

/// 序列化节点本身及其子树（相当于 outerHTML）
pub fn serialize_node(handle: &Handle) -> String {
    serialize_with_scope(handle, TraversalScope::IncludeNode)
}

/// 序列化文档，并按需转换为指定编码
pub fn serialize_document(document: &Handle, document_encoding: &str) -> Vec<u8> {
    let html = serialize_children(document);

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let (data, _, _) = encoding.encode(&html);
            return data.into_owned();
        }
    }

    html.into_bytes()
}
