//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// 规则引擎策略配置
///
/// 追踪路径的格式和 token 标签都由调用方决定，引擎本身不内置任何业务 token。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 追踪路径的根节点名称
    pub root_path: String,
    /// 追踪路径各级之间的分隔符
    pub path_separator: String,
    /// token -> 可读描述
    pub token_labels: HashMap<String, String>,
    /// 仅当一侧是布尔值或 true/false/yes/no 字样时才按布尔比较相等
    pub strict_boolean_equality: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_path: "ROOT".to_string(),
            path_separator: " > ".to_string(),
            token_labels: HashMap::new(),
            strict_boolean_equality: false,
        }
    }
}

/// 可观测性配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    /// 是否输出 JSON 格式日志
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub engine: EngineConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml
    /// 2. config/{environment}.toml
    /// 3. config/{service_name}.toml
    /// 4. 环境变量（RULES_ 前缀，层级用 `__` 分隔，如 RULES_ENGINE__ROOT_PATH -> engine.root_path）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("RULES_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(&config_dir, service_name, &env)
    }

    /// 从指定目录加载配置
    pub fn load_from(config_dir: &str, service_name: &str, env: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env)?
            .add_source(File::from(Path::new(config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("RULES")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.engine.root_path, "ROOT");
        assert_eq!(config.engine.path_separator, " > ");
        assert!(config.engine.token_labels.is_empty());
        assert!(!config.engine.strict_boolean_equality);
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.observability.json_logs);
    }

    #[test]
    fn test_load_without_files_uses_defaults() {
        let config =
            AppConfig::load_from("/nonexistent-config-dir", "rule-engine", "test").unwrap();
        assert_eq!(config.service_name, "rule-engine");
        assert_eq!(config.environment, "test");
        assert_eq!(config.engine.root_path, "ROOT");
        assert!(!config.is_production());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("rule-shared-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("default.toml"),
            r#"
            [engine]
            root_path = "Eligibility"
            strict_boolean_equality = true

            [engine.token_labels]
            applicableincome = "Applicable income present"

            [observability]
            json_logs = true
            "#,
        )
        .unwrap();

        let config = AppConfig::load_from(dir.to_str().unwrap(), "rule-engine", "test").unwrap();
        assert_eq!(config.engine.root_path, "Eligibility");
        assert_eq!(config.engine.path_separator, " > ");
        assert!(config.engine.strict_boolean_equality);
        assert_eq!(
            config.engine.token_labels.get("applicableincome").map(String::as_str),
            Some("Applicable income present")
        );
        assert!(config.observability.json_logs);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
