//! 错误处理集成测试
//!
//! 测试前置条件错误、配置错误，以及文档被外部修改后的恢复能力

use markup5ever_rcdom::RcDom;

use txdom::parsers::html::{HtmlDocument, MarkupTree};
use txdom::translation::error::{ErrorCategory, TranslationError};
use txdom::translation::{ConfigManager, DomConfig, DomTranslator, TranslationTable};

mod common;

use common::{HtmlTestHelper, TranslatorHelper};

/// 测试没有可遍历根节点的文档
#[test]
fn test_attach_without_roots() {
    let mut translator =
        DomTranslator::new(HtmlDocument::from_dom(RcDom::default()), DomConfig::default()).unwrap();

    let error = translator.attach_dom(None).unwrap_err();
    assert!(matches!(error, TranslationError::MissingRoot(_)));
    assert_eq!(error.category(), ErrorCategory::Precondition);
    assert!(!error.is_recoverable());
}

/// 测试各种异常 HTML 输入不会导致崩溃
#[test]
fn test_malformed_html_inputs() {
    let cases = [
        "",
        "<html><head></head><body></body></html>",
        "<div>Unclosed div",
        "<html><>Invalid tag</>",
        "Plain text without HTML tags",
        "<script>alert('test')</script>",
        "<!DOCTYPE html>",
        "<table>Stray <b>text</b><tr><td>Cell</td></tr></table>",
        "<p>Unbalanced <b>bold <i>italic</b> text</i></p>",
    ];

    for html in cases {
        // html5ever 总会补全 <head> 和 <body>
        let mut translator = TranslatorHelper::attached(html);
        let original = translator.tree().serialize();

        // 片段内部的嵌套绑定可能被丢弃，但往返必须还原文档
        translator.to_language("xx", TranslatorHelper::shouting);
        translator.to_source();
        assert_eq!(translator.tree().serialize(), original, "input {:?}", html);
    }
}

/// 测试节点被移除后绑定被丢弃而不是报错
#[test]
fn test_removed_nodes_are_dropped() {
    let mut translator = TranslatorHelper::attached("<body><div>Intro <b>text</b><p>Block</p></div></body>");
    assert!(translator.segment("Intro <b>text</b>").is_some());

    assert!(translator.segment("text").is_some());

    // 删除片段的右边界，同时使块节点脱离文档
    let tree = translator.tree();
    let paragraph = tree.find_first("p").unwrap();
    tree.remove(&paragraph);

    // 片段内部的 <b> 仍在文档中，其独立绑定照常写入
    let stats = translator.to_language("fr", TranslatorHelper::shouting);
    assert_eq!(stats.dropped, 2);
    assert_eq!(stats.translated, 1);
    assert_eq!(translator.segment_count(), 1);
    assert!(translator.segment("text").is_some());

    // 后续调用仍然正常
    let stats = translator.to_source();
    assert_eq!(stats.dropped, 0);
}

/// 测试写回错误的分类
#[test]
fn test_recoverable_errors() {
    let detached = TranslationError::NodeDetached("p".to_string());
    let boundary = TranslationError::InvalidBoundary("div".to_string());
    let config = TranslationError::ConfigError("bad".to_string());

    assert!(detached.is_recoverable());
    assert!(boundary.is_recoverable());
    assert!(!config.is_recoverable());
    assert_eq!(detached.category(), ErrorCategory::TreeShape);
    assert_eq!(config.category(), ErrorCategory::Configuration);
}

/// 测试无效配置
#[test]
fn test_invalid_configurations() {
    let bad_toml = DomConfig::from_toml_str("parse_attrs = \"not a list\"").unwrap_err();
    assert_eq!(bad_toml.category(), ErrorCategory::Parsing);

    let bad_pattern = DomConfig::from_toml_str("variables_pattern = \"([\"").unwrap_err();
    assert!(matches!(bad_pattern, TranslationError::ConfigError(_)));

    let blank_entry = DomConfig {
        ignore_tags: vec!["  ".to_string()],
        ..DomConfig::default()
    };
    assert!(DomTranslator::new(HtmlDocument::parse("<p>x</p>"), blank_entry).is_err());
}

/// 测试配置文件加载错误
#[test]
fn test_config_file_errors() {
    let missing = ConfigManager::load_from_file("/nonexistent/txdom.toml").unwrap_err();
    assert!(matches!(missing, TranslationError::ConfigError(_)));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("txdom.json");
    std::fs::write(&path, "{ \"ignore_databind\": \"maybe\" }").unwrap();
    let invalid = ConfigManager::load_from_file(&path).unwrap_err();
    assert!(matches!(invalid, TranslationError::ConfigError(_)));

    let valid = dir.path().join("valid.toml");
    ConfigManager::generate_example_config(&valid).unwrap();
    let config = ConfigManager::load_from_file(&valid).unwrap();
    assert_eq!(config.parse_attrs, vec!["aria-label"]);
}

/// 测试无效的译文表
#[test]
fn test_invalid_translation_table() {
    let error = TranslationTable::from_json("{ \"Save\": 42 }").unwrap_err();
    assert_eq!(error.category(), ErrorCategory::Serialization);

    let missing = TranslationTable::from_file("/nonexistent/strings.json").unwrap_err();
    assert!(matches!(missing, TranslationError::ConfigError(_)));
}

/// 测试翻译函数返回空字符串时按没有译文处理
#[test]
fn test_empty_translation_is_ignored() {
    let mut translator = TranslatorHelper::attached(&HtmlTestHelper::create_simple_english_page());
    let original = translator.tree().serialize();

    let stats = translator.to_language("xx", |_| Some(String::new()));
    assert_eq!(stats.translated, 0);
    assert_eq!(stats.untranslated_segments, translator.segment_count());

    // 只有根元素的语言标记发生变化
    translator.to_source();
    assert_eq!(translator.tree().serialize(), original);
}
