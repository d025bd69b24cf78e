// 集成测试公共模块
//
// 提供测试页面、翻译函数和断言辅助工具

#![allow(dead_code)]

use std::collections::HashMap;

use txdom::parsers::html::{HtmlDocument, MarkupTree};
use txdom::translation::{DomConfig, DomTranslator};

/// 测试页面
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 包含标题、导航、段落、图片和表单的简单英文页面
    pub fn create_simple_english_page() -> String {
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>Test Page</title>
    <meta name="description" content="A page used for testing">
    <meta name="viewport" content="width=device-width">
</head>
<body>
    <nav tx-tags="nav">
        <ul>
            <li><a href="/home" title="Go home">Home</a></li>
            <li><a href="/about">About us</a></li>
        </ul>
    </nav>
    <main>
        <h1>Welcome to Test</h1>
        <p>This is a test paragraph with <b>bold</b> text.</p>
        <p>Save</p>
        <img src="/logo.png" alt="Company logo">
        <form>
            <input type="text" placeholder="Your name">
            <input type="submit" value="Send">
        </form>
        <button>Save</button>
    </main>
</body>
</html>"#
            .to_string()
    }

    /// 包含各种排除方式的页面
    pub fn create_exclusion_page() -> String {
        r#"<html><head></head><body>
<p>Hello <span class="notranslate">World</span></p>
<div tx-content="exclude">
    <p>Internal note</p>
    <section tx-content="include"><p>Public note</p></section>
</div>
<p translate="no">BrandName</p>
<pre>keep   spacing</pre>
<script>var message = "not text";</script>
<style>p { color: red; }</style>
<p>Run <code>cargo build</code> first</p>
</body></html>"#
            .to_string()
    }

    /// 块与行内内容混合的页面
    pub fn create_mixed_inline_page() -> String {
        r#"<html><head></head><body>
<div>Intro text <a href="/docs">with a link</a> and more.<p>Separate block</p>Tail <i>words</i></div>
<div>Line one<br>Line two</div>
</body></html>"#
            .to_string()
    }

    /// 带有前端框架绑定标记的页面
    pub fn create_databind_page() -> String {
        r#"<html><head></head><body>
<div>Hello <!-- ko text: user --><span>Bob</span><!-- /ko -->, welcome back</div>
<div>Plain <b>bold</b> content</div>
</body></html>"#
            .to_string()
    }

    pub fn parse(html: &str) -> HtmlDocument {
        HtmlDocument::parse(html)
    }
}

/// 翻译引擎构建工具
pub struct TranslatorHelper;

impl TranslatorHelper {
    pub fn attached(html: &str) -> DomTranslator {
        Self::attached_with(html, DomConfig::default())
    }

    pub fn attached_with(html: &str, config: DomConfig) -> DomTranslator {
        let mut translator = DomTranslator::new(HtmlDocument::parse(html), config)
            .expect("valid configuration");
        translator.attach_dom(None).expect("document has a body");
        translator
    }

    pub fn keys(translator: &DomTranslator) -> Vec<String> {
        translator.segments().map(|s| s.key.clone()).collect()
    }

    /// 由键值对构造翻译函数
    pub fn dictionary(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    /// 把每个键都翻译为大写的翻译函数
    pub fn shouting(key: &str) -> Option<String> {
        Some(key.to_uppercase())
    }

    pub fn inner(translator: &DomTranslator, tag: &str) -> String {
        let tree = translator.tree();
        let node = tree.find_first(tag).expect("element exists");
        tree.serialize_children(&node)
    }
}

/// 断言辅助工具
pub struct AssertionHelper;

impl AssertionHelper {
    pub fn assert_has_keys(translator: &DomTranslator, expected: &[&str]) {
        for key in expected {
            assert!(
                translator.segment(key).is_some(),
                "missing segment {:?}; have {:?}",
                key,
                TranslatorHelper::keys(translator)
            );
        }
    }

    pub fn assert_lacks_keys(translator: &DomTranslator, unexpected: &[&str]) {
        for key in unexpected {
            assert!(
                translator.segment(key).is_none(),
                "unexpected segment {:?}",
                key
            );
        }
    }
}
