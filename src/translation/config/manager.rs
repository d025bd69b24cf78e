//! 配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::variables::VariableDetector;

/// 引擎实例配置（构造时确定，实例生命周期内不变）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DomConfig {
    /// 在所有节点上额外扫描的属性
    pub parse_attrs: Vec<String>,
    /// 额外整体忽略的标签
    pub ignore_tags: Vec<String>,
    /// 额外整体忽略的 class
    pub ignore_classes: Vec<String>,
    /// 自定义变量匹配表达式（正则），编译为变量检测器
    pub variables_pattern: Option<String>,
    /// 关闭对前端框架绑定标记的检测（总是合并行内片段）
    pub ignore_databind: bool,
    /// 解除附加时是否同时清理影子树中的标记
    pub detach_shadow_roots: bool,
    /// 程序化提供的变量检测器，优先于 `variables_pattern`
    #[serde(skip)]
    pub variables_parser: Option<VariableDetector>,
}

impl DomConfig {
    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> TranslationResult<Self> {
        let config: DomConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 设置自定义变量检测器
    pub fn with_variables_parser(mut self, detector: VariableDetector) -> Self {
        self.variables_parser = Some(detector);
        self
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if let Some(pattern) = &self.variables_pattern {
            if pattern.is_empty() {
                return Err(TranslationError::ConfigError(
                    "变量匹配表达式不能为空".to_string(),
                ));
            }
            regex::Regex::new(pattern)?;
        }

        let blank = |list: &[String]| list.iter().any(|item| item.trim().is_empty());
        if blank(&self.parse_attrs) || blank(&self.ignore_tags) || blank(&self.ignore_classes) {
            return Err(TranslationError::ConfigError(
                "属性、标签和 class 列表不能包含空项".to_string(),
            ));
        }

        Ok(())
    }

    /// 生效的变量检测器
    pub fn variable_detector(&self) -> TranslationResult<Option<VariableDetector>> {
        if let Some(detector) = &self.variables_parser {
            return Ok(Some(detector.clone()));
        }
        match &self.variables_pattern {
            Some(pattern) => Ok(Some(VariableDetector::from_pattern(pattern)?)),
            None => Ok(None),
        }
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        let list = |name: &str| -> Option<Vec<String>> {
            std::env::var(name).ok().map(|value| {
                value
                    .split(',')
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect()
            })
        };

        if let Some(attrs) = list(constants::ENV_PARSE_ATTRS) {
            tracing::info!("环境变量追加扫描属性: {:?}", attrs);
            self.parse_attrs.extend(attrs);
        }

        if let Some(tags) = list(constants::ENV_IGNORE_TAGS) {
            self.ignore_tags.extend(tags);
        }

        if let Some(classes) = list(constants::ENV_IGNORE_CLASSES) {
            self.ignore_classes.extend(classes);
        }

        if let Ok(value) = std::env::var(constants::ENV_IGNORE_DATABIND) {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.ignore_databind = true,
                "0" | "false" | "no" | "off" => self.ignore_databind = false,
                other => tracing::warn!(
                    "无法解析 {}={}，保持原值",
                    constants::ENV_IGNORE_DATABIND,
                    other
                ),
            }
        }

        if let Ok(pattern) = std::env::var(constants::ENV_VARIABLES_PATTERN) {
            if !pattern.is_empty() {
                self.variables_pattern = Some(pattern);
            }
        }
    }
}

/// 配置管理器
pub struct ConfigManager {
    config: DomConfig,
}

impl ConfigManager {
    /// 搜索默认路径加载配置，应用环境变量并验证
    pub fn new() -> TranslationResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件加载配置，应用环境变量并验证
    pub fn with_file<P: AsRef<Path>>(path: P) -> TranslationResult<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &DomConfig {
        &self.config
    }

    pub fn into_config(self) -> DomConfig {
        self.config
    }

    fn load_config() -> TranslationResult<DomConfig> {
        for path in constants::CONFIG_PATHS {
            if Path::new(path).exists() {
                tracing::info!("加载配置文件: {}", path);
                return Self::load_from_file(path);
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok(DomConfig::default())
    }

    /// 从指定文件加载配置（`.json` 按 JSON 解析，其余按 TOML）
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TranslationResult<DomConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("读取配置文件 {} 失败: {}", path.display(), e))
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> TranslationResult<()> {
        let config = DomConfig {
            parse_attrs: vec!["aria-label".to_string()],
            ignore_classes: vec!["no-i18n".to_string()],
            variables_pattern: Some(r"\{\{[^}]*\}\}".to_string()),
            ..DomConfig::default()
        };
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_str() {
        let config = DomConfig::from_toml_str(
            r#"
parse_attrs = ["aria-label"]
ignore_tags = ["aside"]
ignore_databind = true
variables_pattern = '\{\{[^}]*\}\}'
"#,
        )
        .unwrap();

        assert_eq!(config.parse_attrs, vec!["aria-label"]);
        assert_eq!(config.ignore_tags, vec!["aside"]);
        assert!(config.ignore_databind);
        assert!(!config.detach_shadow_roots);
        assert!(config.variable_detector().unwrap().is_some());
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let result = DomConfig::from_toml_str("variables_pattern = '('");
        assert!(matches!(result, Err(TranslationError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_blank_entries() {
        let config = DomConfig {
            ignore_tags: vec![" ".to_string()],
            ..DomConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_has_no_detector() {
        assert!(DomConfig::default().variable_detector().unwrap().is_none());
    }
}
