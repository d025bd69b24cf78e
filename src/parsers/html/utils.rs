/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 按照 HTML 序列化器的规则转义属性值
///
/// 与 html5ever 在双引号属性中的转义保持一致：`&`、`"` 与不换行空格。
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            _ => escaped.push(c),
        }
    }

    escaped
}
