//! 文本过滤器模块
//!
//! 空白规范化与"看起来像文本"的判断

use std::sync::OnceLock;

use regex::Regex;

use crate::parsers::html::WHITESPACES;

/// 规范化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// 折叠空白并去除首尾空白后的文本
    pub text: String,
    /// 原始文本是否以空白开头
    pub head: bool,
    /// 原始文本是否以空白结尾
    pub tail: bool,
}

/// 折叠连续空白为单个空格并去除首尾空白，同时记录首尾是否有空白
///
/// 只处理 HTML 定义的 ASCII 空白，不换行空格等字符保持原样。
pub fn normalize_whitespace(raw: &str) -> NormalizedText {
    let text = raw
        .split(WHITESPACES)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let has_content = !text.is_empty();

    NormalizedText {
        head: has_content && raw.starts_with(WHITESPACES),
        tail: has_content && raw.ends_with(WHITESPACES),
        text,
    }
}

fn markup_regex() -> &'static Regex {
    static MARKUP: OnceLock<Regex> = OnceLock::new();
    MARKUP.get_or_init(|| {
        Regex::new(r"<[^>]*>|\{var\d+\}|&[#0-9A-Za-z]+;").expect("static markup pattern")
    })
}

/// 判断文本是否值得翻译：去掉标签、变量占位符和实体后至少包含一个字母
///
/// 只由空白、数字和标点组成的字符串会被拒绝。
pub fn looks_textual(text: &str) -> bool {
    let stripped = markup_regex().replace_all(text, " ");
    stripped.chars().any(char::is_alphabetic)
}

/// 为翻译结果补回原始文本的首尾空格
pub fn pad(text: &str, head: bool, tail: bool) -> String {
    let mut padded = String::with_capacity(text.len() + 2);
    if head {
        padded.push(' ');
    }
    padded.push_str(text);
    if tail {
        padded.push(' ');
    }
    padded
}
