//! # txdom
//!
//! 对已解析的 HTML 树进行原地、可逆、基于片段（segment）的翻译。
//!
//! ## 模块组织
//!
//! - `parsers` - 标记树原语（`MarkupTree` 抽象及基于 html5ever 的实现）
//! - `translation` - 片段收集、变量提取、翻译写回与导出
//!
//! ## 基本用法
//!
//! ```rust
//! use txdom::parsers::html::HtmlDocument;
//! use txdom::translation::{DomConfig, DomTranslator};
//!
//! let doc = HtmlDocument::parse("<html><body><p>Save</p></body></html>");
//! let mut translator = DomTranslator::new(doc, DomConfig::default()).unwrap();
//! translator.attach_dom(None).unwrap();
//!
//! translator.to_language("fr", |key| (key == "Save").then(|| "Enregistrer".to_string()));
//! assert!(translator.tree().serialize().contains("<p>Enregistrer</p>"));
//!
//! translator.to_source();
//! assert!(translator.tree().serialize().contains("<p>Save</p>"));
//! ```

pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use parsers::html::{HtmlDocument, MarkupTree, NodeKind, NodeRef};
pub use translation::{DomConfig, DomTranslator, TranslationError, TranslationResult};
