//! 翻译配置管理模块
//!
//! 提供静态规则表、可继承的解析选项，以及支持配置文件和环境变量的实例配置

pub mod manager;
pub mod options;
pub mod rules;

// 重新导出主要类型
pub use manager::{ConfigManager, DomConfig};
pub use options::ParseOptions;
pub use rules::Rules;

/// 配置常量
pub mod constants {
    /// 整个子树直接跳过的标签
    pub const SKIP_TAGS: &[&str] = &[
        "script", "style", "link", "noscript", "template", "iframe", "embed", "object",
        "canvas", "svg", "math", "audio", "video", "code", "time", "var", "kbd", "samp",
    ];

    /// 作为块翻译时不做变量提取的标签（保留字面空白）
    pub const NO_VARIABLE_TAGS: &[&str] = &["pre"];

    /// 标记子树不翻译的 class
    pub const SKIP_CLASSES: &[&str] = &[
        "notranslate",
        "skiptranslate",
        "tx-live-lang-picker",
        "tx-live-lang-container",
        "tx-live-lang-container-mobile",
    ];

    /// 块级元素，作为行内片段的边界
    pub const BLOCK_TAGS: &[&str] = &[
        "address", "article", "aside", "blockquote", "body", "caption", "dd", "details",
        "dialog", "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form",
        "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "hr", "html", "legend",
        "li", "main", "nav", "ol", "optgroup", "option", "p", "pre", "section", "summary",
        "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "ul",
    ];

    /// `<meta>` 的 name/property/itemprop 允许列表
    pub const META_NAMES: &[&str] = &[
        "keywords",
        "description",
        "title",
        "og:title",
        "og:description",
        "og:site_name",
        "og:image:alt",
        "twitter:title",
        "twitter:description",
        "twitter:image:alt",
    ];

    /// 用于匹配 `META_NAMES` 的 `<meta>` 属性
    pub const META_NAME_ATTRS: &[&str] = &["name", "property", "itemprop"];

    /// `value` 可翻译的 `<input>` 类型
    pub const INPUT_VALUE_TYPES: &[&str] = &["button", "reset", "submit"];

    /// 值为 URL 的属性，仅在 URL 不作为变量时单独翻译
    pub const URL_ATTRS: &[&str] = &["href", "src", "srcset"];

    /// URL 变量提取作用的标签
    pub const URL_TAGS: &[&str] = &["a", "area", "img", "source"];

    /// 子树包含/排除/强制块以及 URL 处理开关
    pub const ATTR_CONTENT: &str = "tx-content";
    /// 追加到子树所有片段的标签列表
    pub const ATTR_TAGS: &str = "tx-tags";
    /// 在当前节点上额外扫描的属性列表
    pub const ATTR_EXTRA_ATTRS: &str = "tx-attrs";
    /// 即使不像文本也强制翻译的属性列表
    pub const ATTR_FORCE_ATTRS: &str = "tx-force-attrs";
    /// 标准 HTML 的 `translate="no"`
    pub const ATTR_TRANSLATE: &str = "translate";

    /// 前端框架留下的绑定注释前缀
    pub const BINDING_COMMENT_PREFIXES: &[&str] =
        &["bindings=", "ng-", "ngIf", "ngFor", "v-if", "v-for", "v-show", "ko ", "ko:"];

    /// 前端框架绑定元素的 class 前缀
    pub const BINDING_CLASS_PREFIXES: &[&str] = &["ng-binding", "ng-scope", "ember-view"];

    /// 从右向左书写的语言
    pub const RTL_LANGUAGES: &[&str] = &["ar", "ckb", "dv", "fa", "he", "ps", "ur", "yi"];

    /// 伪翻译使用的语言代码
    pub const PSEUDO_LOCALE: &str = "pseudo";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &["txdom.toml", ".txdom.toml"];

    // 环境变量
    pub const ENV_PARSE_ATTRS: &str = "TXDOM_PARSE_ATTRS";
    pub const ENV_IGNORE_TAGS: &str = "TXDOM_IGNORE_TAGS";
    pub const ENV_IGNORE_CLASSES: &str = "TXDOM_IGNORE_CLASSES";
    pub const ENV_IGNORE_DATABIND: &str = "TXDOM_IGNORE_DATABIND";
    pub const ENV_VARIABLES_PATTERN: &str = "TXDOM_VARIABLES_PATTERN";
}

/// 根据语言代码判断书写方向
pub fn text_direction(locale: &str) -> &'static str {
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if constants::RTL_LANGUAGES.contains(&language.as_str()) {
        "rtl"
    } else {
        "ltr"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_direction() {
        assert_eq!(text_direction("ar"), "rtl");
        assert_eq!(text_direction("he_IL"), "rtl");
        assert_eq!(text_direction("fa-IR"), "rtl");
        assert_eq!(text_direction("fr"), "ltr");
        assert_eq!(text_direction("pseudo"), "ltr");
    }
}
