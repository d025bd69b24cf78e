//! 伪翻译
//!
//! 不依赖真实语言，模拟字符串变长以便检查布局。字符串按 `__name__` 标记切分，
//! 标记之间的各段分别变换；标记本身、标签、`{...}` 占位符和字符实体保持原样。

use std::sync::OnceLock;

use regex::Regex;

fn protected_regex() -> &'static Regex {
    static PROTECTED: OnceLock<Regex> = OnceLock::new();
    PROTECTED.get_or_init(|| {
        Regex::new(r"<[^>]*>|\{[^}]*\}|&[#0-9A-Za-z]+;").expect("static pseudo pattern")
    })
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"__\w+?__").expect("static marker pattern"))
}

fn double_vowels(text: &str, out: &mut String) {
    for c in text.chars() {
        out.push(c);
        if "aeiouAEIOU".contains(c) {
            out.push(c);
        }
    }
}

fn localize_segment(text: &str, out: &mut String) {
    let mut cursor = 0;

    for protected in protected_regex().find_iter(text) {
        double_vowels(&text[cursor..protected.start()], out);
        out.push_str(protected.as_str());
        cursor = protected.end();
    }
    double_vowels(&text[cursor..], out);
}

/// 元音加倍
pub fn pseudo_localize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    let mut cursor = 0;

    for marker in marker_regex().find_iter(text) {
        localize_segment(&text[cursor..marker.start()], &mut out);
        out.push_str(marker.as_str());
        cursor = marker.end();
    }
    localize_segment(&text[cursor..], &mut out);

    out
}
