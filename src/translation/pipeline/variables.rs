//! 变量提取
//!
//! 块和片段中不可翻译的子标记（显式排除的元素、跳过的标签、URL、自定义检测器的匹配）
//! 被替换为 `{varN}` 占位符，原始标记按顺序保存在 `block_args` 中，写回时再替换回去。

use std::fmt;
use std::ops::Range;
use std::sync::{Arc, OnceLock};

use regex::{Captures, Regex};

use crate::parsers::html::{escape_attribute, MarkupTree};
use crate::translation::config::{constants, Rules};
use crate::translation::error::TranslationResult;

/// 自定义子标记检测器：返回需要作为变量的字节区间
#[derive(Clone)]
pub struct VariableDetector(Arc<dyn Fn(&str) -> Vec<Range<usize>> + Send + Sync>);

impl VariableDetector {
    pub fn new<F>(detect: F) -> Self
    where
        F: Fn(&str) -> Vec<Range<usize>> + Send + Sync + 'static,
    {
        Self(Arc::new(detect))
    }

    /// 以正则表达式的所有匹配作为变量
    pub fn from_regex(regex: Regex) -> Self {
        Self::new(move |markup| regex.find_iter(markup).map(|m| m.range()).collect())
    }

    pub fn from_pattern(pattern: &str) -> TranslationResult<Self> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    pub fn detect(&self, markup: &str) -> Vec<Range<usize>> {
        (self.0)(markup)
    }
}

impl fmt::Debug for VariableDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VariableDetector(..)")
    }
}

/// 变量提取结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// 变量替换后的标记
    pub text: String,
    /// `{varN}` 对应的原始内容
    pub args: Vec<String>,
}

fn var_token(index: usize) -> String {
    format!("{{var{}}}", index)
}

fn var_regex() -> &'static Regex {
    static VAR: OnceLock<Regex> = OnceLock::new();
    VAR.get_or_init(|| Regex::new(r"\{var(\d+)\}").expect("static variable pattern"))
}

/// 按检测器的匹配从左到右替换为占位符
fn apply_detector(markup: &str, detector: &VariableDetector, args: &mut Vec<String>) -> String {
    let mut ranges = detector.detect(markup);
    ranges.sort_by_key(|range| range.start);

    let mut result = String::with_capacity(markup.len());
    let mut cursor = 0;
    for range in ranges {
        let valid = range.start >= cursor
            && range.start < range.end
            && range.end <= markup.len()
            && markup.is_char_boundary(range.start)
            && markup.is_char_boundary(range.end);
        if !valid {
            tracing::debug!("忽略无效的变量区间: {:?}", range);
            continue;
        }

        result.push_str(&markup[cursor..range.start]);
        result.push_str(&var_token(args.len()));
        args.push(markup[range.clone()].to_string());
        cursor = range.end;
    }
    result.push_str(&markup[cursor..]);
    result
}

fn replace_opaque<T: MarkupTree>(
    tree: &T,
    rules: &Rules,
    parent: &T::Node,
    urls_as_vars: bool,
    args: &mut Vec<String>,
) {
    for child in tree.children(parent) {
        if !tree.is_element(&child) {
            continue;
        }

        if rules.is_opaque(tree, &child) {
            let token = var_token(args.len());
            args.push(tree.serialize_node(&child));
            tree.insert_before(parent, tree.create_text(&token), Some(&child));
            tree.remove(&child);
            continue;
        }

        let tag = tree.tag_name(&child).unwrap_or_default();
        if urls_as_vars && constants::URL_TAGS.contains(&tag.as_str()) {
            for attr in ["href", "src"] {
                if let Some(url) = tree.attribute(&child, attr) {
                    let token = var_token(args.len());
                    args.push(escape_attribute(&url));
                    tree.set_attribute(&child, attr, Some(&token));
                }
            }
        }

        replace_opaque(tree, rules, &child, urls_as_vars, args);
    }
}

/// 从块或片段的原始标记中提取变量
///
/// `context` 是标记所在的元素（块本身或片段的父节点），用于按正确的上下文重新解析。
/// 操作在脱离文档的副本上进行，不会修改原树。
pub fn extract<T: MarkupTree>(
    tree: &T,
    rules: &Rules,
    context: &T::Node,
    raw: &str,
    detector: Option<&VariableDetector>,
    urls_as_vars: bool,
) -> Extraction {
    let mut args = Vec::new();

    let markup = match detector {
        Some(detector) => apply_detector(raw, detector, &mut args),
        None => raw.to_string(),
    };

    // 纯文本无需重新解析
    if !markup.contains('<') {
        return Extraction { text: markup, args };
    }

    let container = tree.create_container();
    for node in tree.parse_fragment(context, &markup) {
        tree.append_child(&container, node);
    }
    replace_opaque(tree, rules, &container, urls_as_vars, &mut args);

    Extraction {
        text: tree.serialize_children(&container),
        args,
    }
}

/// 将 `{varN}` 替换回原始内容；越界的占位符原样保留
pub fn substitute(text: &str, args: &[String]) -> String {
    if args.is_empty() {
        return text.to_string();
    }

    var_regex()
        .replace_all(text, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| args.get(index))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::HtmlDocument;
    use crate::translation::config::DomConfig;

    fn rules() -> Rules {
        Rules::new(&DomConfig::default())
    }

    #[test]
    fn test_extract_excluded_child() {
        let doc = HtmlDocument::parse("<body><p>x</p></body>");
        let p = doc.find_first("p").unwrap();

        let extraction = extract(
            &doc,
            &rules(),
            &p,
            "Hello <span class=\"notranslate\">World</span>",
            None,
            true,
        );

        assert_eq!(extraction.text, "Hello {var0}");
        assert_eq!(extraction.args, vec!["<span class=\"notranslate\">World</span>"]);
    }

    #[test]
    fn test_extract_urls_in_order() {
        let doc = HtmlDocument::parse("<body><p>x</p></body>");
        let p = doc.find_first("p").unwrap();
        let raw = "See <a href=\"/docs?a=1&amp;b=2\">docs</a> and <img src=\"/logo.png\" alt=\"logo\">";

        let extraction = extract(&doc, &rules(), &p, raw, None, true);
        assert_eq!(
            extraction.text,
            "See <a href=\"{var0}\">docs</a> and <img src=\"{var1}\" alt=\"logo\">"
        );
        assert_eq!(extraction.args, vec!["/docs?a=1&amp;b=2", "/logo.png"]);
        assert_eq!(substitute(&extraction.text, &extraction.args), raw);

        let untouched = extract(&doc, &rules(), &p, raw, None, false);
        assert_eq!(untouched.text, raw);
        assert!(untouched.args.is_empty());
    }

    #[test]
    fn test_extract_nested_exclusion() {
        let doc = HtmlDocument::parse("<body><p>x</p></body>");
        let p = doc.find_first("p").unwrap();

        let extraction = extract(&doc, &rules(), &p, "Run <b>now <code>f()</code></b>", None, true);
        assert_eq!(extraction.text, "Run <b>now {var0}</b>");
        assert_eq!(extraction.args, vec!["<code>f()</code>"]);
    }

    #[test]
    fn test_custom_detector_runs_first() {
        let doc = HtmlDocument::parse("<body><p>x</p></body>");
        let p = doc.find_first("p").unwrap();
        let detector = VariableDetector::from_pattern(r"\{\{[^}]*\}\}").unwrap();

        let extraction = extract(
            &doc,
            &rules(),
            &p,
            "Hi {{name}}, <kbd>Ctrl</kbd> {{count}}",
            Some(&detector),
            true,
        );

        assert_eq!(extraction.text, "Hi {var0}, {var2} {var1}");
        assert_eq!(extraction.args, vec!["{{name}}", "{{count}}", "<kbd>Ctrl</kbd>"]);
    }

    #[test]
    fn test_substitute_leaves_unknown_tokens() {
        let args = vec!["<b>x</b>".to_string()];
        assert_eq!(substitute("A {var0} B {var3}", &args), "A <b>x</b> B {var3}");
        assert_eq!(substitute("A {var0}", &[]), "A {var0}");
    }
}
