use bitflags::bitflags;

use super::constants;

bitflags! {
    /// 沿递归向下继承的解析选项
    ///
    /// 节点可以通过 `tx-content` 为自己的子树局部覆盖，但不会修改父节点的值。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParseOptions: u8 {
        /// 不收集该子树中的片段（但仍然向下遍历，以便发现被重新包含的子树）
        const DO_NOT_COLLECT = 0b0001;
        /// 将 href/src 等 URL 提取为变量，而不是作为文本翻译
        const URLS_AS_VARS   = 0b0010;
        /// 强制将当前节点作为块处理（不向下继承）
        const FORCE_BLOCK    = 0b0100;
    }
}

impl ParseOptions {
    /// 默认基线
    pub const DEFAULT: ParseOptions = ParseOptions::URLS_AS_VARS;

    /// 应用 `tx-content` 中以空白分隔的指令，返回新的选项
    pub fn with_directives(self, directives: &str) -> ParseOptions {
        // 强制块只作用于声明它的节点
        let mut options = self - ParseOptions::FORCE_BLOCK;

        for directive in directives.split_whitespace() {
            match directive {
                "exclude" => options |= ParseOptions::DO_NOT_COLLECT,
                "include" => options -= ParseOptions::DO_NOT_COLLECT,
                "block" => options |= ParseOptions::FORCE_BLOCK,
                "notranslate_urls" => options |= ParseOptions::URLS_AS_VARS,
                "translate_urls" => options -= ParseOptions::URLS_AS_VARS,
                other => tracing::trace!("忽略未知的 {} 指令: {}", constants::ATTR_CONTENT, other),
            }
        }

        options
    }

    pub fn collects(self) -> bool {
        !self.contains(ParseOptions::DO_NOT_COLLECT)
    }

    pub fn urls_as_vars(self) -> bool {
        self.contains(ParseOptions::URLS_AS_VARS)
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_override_locally() {
        let parent = ParseOptions::DEFAULT;
        let excluded = parent.with_directives("exclude");

        assert!(parent.collects());
        assert!(!excluded.collects());
        assert!(excluded.with_directives("include").collects());
    }

    #[test]
    fn test_url_and_block_directives() {
        let options = ParseOptions::DEFAULT.with_directives("translate_urls block");
        assert!(!options.urls_as_vars());
        assert!(options.contains(ParseOptions::FORCE_BLOCK));

        // 子节点不继承强制块
        let child = options.with_directives("");
        assert!(!child.contains(ParseOptions::FORCE_BLOCK));
        assert!(child.with_directives("notranslate_urls").urls_as_vars());
    }
}
