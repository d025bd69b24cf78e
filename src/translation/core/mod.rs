//! 翻译引擎核心模块
//!
//! - **translator** (`translator.rs`): 对外接口 [`DomTranslator`]，协调遍历、写回与还原
//! - **export** (`export.rs`): 源字符串导出格式和译文表
//! - **pseudo** (`pseudo.rs`): 伪翻译变换
//!
//! ## 模块依赖关系
//!
//! ```text
//! DomTranslator (translator.rs)
//!     ├── Walker (pipeline/walker.rs)
//!     │       ├── Rules / ParseOptions (config)
//!     │       └── variables::extract (pipeline/variables.rs)
//!     ├── SegmentRegistry (pipeline/registry.rs)
//!     ├── MarkerTable (pipeline/markers.rs)
//!     └── operations::{set, revert} (pipeline/operations.rs)
//! ```

pub mod export;
pub mod pseudo;
pub mod translator;

pub use export::{ExportEntry, ExportMeta, ExportParams, StringsExport, TranslationTable};
pub use pseudo::pseudo_localize;
pub use translator::{AttachStats, DomTranslator, RenderStats};
