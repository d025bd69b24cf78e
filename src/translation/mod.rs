//! 翻译模块
//!
//! 在已解析的标记树上原地、可逆地切换语言：
//! - **config**: 规则表、解析选项与实例配置
//! - **pipeline**: 分类遍历、变量提取、片段注册表与读写策略
//! - **core**: 对外接口、导出与伪翻译
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust
//! use txdom::parsers::html::HtmlDocument;
//! use txdom::translation::{DomConfig, DomTranslator, ExportParams};
//!
//! let doc = HtmlDocument::parse("<body><p>Hello <code>x</code></p></body>");
//! let mut translator = DomTranslator::new(doc, DomConfig::default())?;
//! translator.attach_dom(None)?;
//!
//! let strings = translator.get_strings_json(&ExportParams::default());
//! assert!(strings.contains_key("Hello {var0}"));
//!
//! translator.to_language("fr", |key| {
//!     (key == "Hello {var0}").then(|| "Bonjour {var0}".to_string())
//! });
//! assert!(translator.tree().serialize().contains("<p>Bonjour <code>x</code></p>"));
//! # Ok::<(), txdom::TranslationError>(())
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块 - 默认规则表、`tx-content` 指令和实例配置
pub mod config;

/// 核心模块 - 对外接口 `DomTranslator`
pub mod core;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 文本处理管道模块 - 遍历、注册与写回
pub mod pipeline;

// ============================================================================
// 核心API导出
// ============================================================================

pub use self::core::{
    pseudo_localize, AttachStats, DomTranslator, ExportEntry, ExportMeta, ExportParams,
    RenderStats, StringsExport, TranslationTable,
};

pub use config::{constants, ConfigManager, DomConfig, ParseOptions, Rules};

pub use error::{ErrorCategory, TranslationError, TranslationResult};

// ============================================================================
// 高级API导出 - 自定义宿主树或检查注册表时使用
// ============================================================================

pub use pipeline::{ElementBinding, Location, Segment, Strategy, VariableDetector};
