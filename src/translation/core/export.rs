//! 源字符串导出与译文表
//!
//! 导出格式为 `{ key: { string, meta: { tags?, occurrences? } } }`，
//! 使用 `BTreeMap` 保证输出的键顺序稳定。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::Segment;

/// 调用方合并进导出结果的元数据
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportParams {
    /// 追加到每个片段的标签
    pub tags: Vec<String>,
    /// 每个片段的出现位置（通常是页面路径或 URL）
    pub occurrences: Vec<String>,
}

impl ExportParams {
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_occurrence(mut self, occurrence: impl Into<String>) -> Self {
        self.occurrences.push(occurrence.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExportMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExportEntry {
    pub string: String,
    #[serde(default)]
    pub meta: ExportMeta,
}

pub type StringsExport = BTreeMap<String, ExportEntry>;

fn non_empty<I: IntoIterator<Item = String>>(items: I) -> Option<Vec<String>> {
    let items: Vec<String> = items.into_iter().collect();
    (!items.is_empty()).then_some(items)
}

/// 由片段构造导出条目
pub fn export_entry<N>(segment: &Segment<N>, params: &ExportParams) -> ExportEntry {
    let tags: BTreeSet<String> = segment
        .tags
        .iter()
        .cloned()
        .chain(params.tags.iter().cloned())
        .collect();
    let occurrences: BTreeSet<String> = params.occurrences.iter().cloned().collect();

    ExportEntry {
        string: segment.source_string.clone(),
        meta: ExportMeta {
            tags: non_empty(tags),
            occurrences: non_empty(occurrences),
        },
    }
}

/// 源文本 → 译文
///
/// 接受简单映射 `{ "Save": "Enregistrer" }`，也接受与导出格式相同的结构
/// `{ "Save": { "string": "Enregistrer" } }`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableValue {
    Plain(String),
    Entry(ExportEntry),
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(content: &str) -> TranslationResult<Self> {
        let raw: HashMap<String, TableValue> = serde_json::from_str(content)?;
        let entries = raw
            .into_iter()
            .map(|(key, value)| match value {
                TableValue::Plain(text) => (key, text),
                TableValue::Entry(entry) => (key, entry.string),
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> TranslationResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("读取译文文件 {} 失败: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn insert(&mut self, key: impl Into<String>, translation: impl Into<String>) {
        self.entries.insert(key.into(), translation.into());
    }

    /// 查找译文；空字符串视为没有译文
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .filter(|text| !text.is_empty())
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_entry_merges_tags() {
        let mut segment: Segment<u32> = Segment::new("Save".to_string());
        segment.tags.insert("nav".to_string());

        let params = ExportParams::default()
            .with_tags(["release-1", "nav"])
            .with_occurrence("/index.html");
        let entry = export_entry(&segment, &params);

        assert_eq!(entry.string, "Save");
        assert_eq!(
            entry.meta.tags,
            Some(vec!["nav".to_string(), "release-1".to_string()])
        );
        assert_eq!(entry.meta.occurrences, Some(vec!["/index.html".to_string()]));
    }

    #[test]
    fn test_empty_meta_is_omitted() {
        let segment: Segment<u32> = Segment::new("Save".to_string());
        let entry = export_entry(&segment, &ExportParams::default());

        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"string":"Save","meta":{}}"#);
    }

    #[test]
    fn test_translation_table_formats() {
        let table = TranslationTable::from_json(
            r#"{ "Save": "Enregistrer", "Cancel": { "string": "Annuler" }, "Empty": "" }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("Save"), Some("Enregistrer".to_string()));
        assert_eq!(table.lookup("Cancel"), Some("Annuler".to_string()));
        assert_eq!(table.lookup("Empty"), None);
        assert_eq!(table.lookup("Missing"), None);
    }

    #[test]
    fn test_translation_table_rejects_invalid_json() {
        let error = TranslationTable::from_json("[1, 2]").unwrap_err();
        assert!(matches!(error, TranslationError::SerializationError(_)));
    }
}
