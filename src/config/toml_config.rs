use crate::adapters::http::{DEFAULT_TIMEOUT_SECONDS, DEFAULT_TRANSIENT_STATUS_CODES};
use crate::core::classifier::{
    builtin_domain_markers, builtin_language_markers, MarkerSet, MarkerTable, QueryClassifier,
};
use crate::core::registry::{AdapterRegistry, LanguageAdapter};
use crate::domain::model::GenerationParameters;
use crate::utils::error::{Result, RouterError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub generation: GenerationParameters,
    pub registry: Option<RegistryConfig>,
    pub classifier: Option<ClassifierConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    pub timeout_seconds: Option<u64>,
    pub deadline_seconds: Option<u64>,
    pub auth_token: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    pub transient_status_codes: Option<Vec<u16>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub languages: BTreeMap<String, LanguageAdapter>,
    pub domains: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub default_language: Option<String>,
    pub default_domain: Option<String>,
    pub languages: Option<Vec<MarkerSet>>,
    pub domains: Option<Vec<MarkerSet>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file_path: Option<String>,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_seconds: None,
            deadline_seconds: None,
            auth_token: None,
            headers: None,
            transient_status_codes: None,
        }
    }

    /// 單次請求的傳輸逾時
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    /// 整個 invoke（含重試）的期限，預設不限制
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_seconds.map(Duration::from_secs)
    }

    pub fn transient_status_codes(&self) -> Vec<u16> {
        self.transient_status_codes
            .clone()
            .unwrap_or_else(|| DEFAULT_TRANSIENT_STATUS_CODES.to_vec())
    }
}

impl RouterConfig {
    /// Minimal configuration: built-in tables and the given endpoint.
    pub fn for_endpoint(url: impl Into<String>) -> Self {
        Self {
            endpoint: EndpointConfig::new(url),
            generation: GenerationParameters::default(),
            registry: None,
            classifier: None,
            logging: None,
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RouterError::ConfigParse {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ROUTER_API_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RouterError::ConfigParse {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn registry(&self) -> AdapterRegistry {
        match &self.registry {
            Some(registry) => {
                AdapterRegistry::new(registry.languages.clone(), registry.domains.clone())
            }
            None => AdapterRegistry::builtin(),
        }
    }

    pub fn classifier(&self) -> QueryClassifier {
        let config = self.classifier.clone().unwrap_or_default();
        QueryClassifier::new(
            MarkerTable::new(
                config.languages.unwrap_or_else(builtin_language_markers),
                config.default_language.unwrap_or_else(|| "spanish".to_string()),
            ),
            MarkerTable::new(
                config.domains.unwrap_or_else(builtin_domain_markers),
                config.default_domain.unwrap_or_else(|| "technical".to_string()),
            ),
        )
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("endpoint.url", &self.endpoint.url)?;

        if let Some(timeout) = self.endpoint.timeout_seconds {
            validation::validate_positive_number("endpoint.timeout_seconds", timeout, 1)?;
        }
        if let Some(deadline) = self.endpoint.deadline_seconds {
            validation::validate_positive_number("endpoint.deadline_seconds", deadline, 1)?;
        }
        if let Some(token) = &self.endpoint.auth_token {
            validation::validate_resolved("endpoint.auth_token", token)?;
        }
        if let Some(codes) = &self.endpoint.transient_status_codes {
            for code in codes {
                validation::validate_range("endpoint.transient_status_codes", *code, 400, 599)?;
            }
        }

        validation::validate_positive_number(
            "generation.max_new_tokens",
            u64::from(self.generation.max_new_tokens),
            1,
        )?;
        validation::validate_range("generation.temperature", self.generation.temperature, 0.0, 2.0)?;

        let classifier = self.classifier();
        for (field, table) in [
            ("classifier.languages", classifier.languages()),
            ("classifier.domains", classifier.domains()),
        ] {
            for set in table.entries() {
                validation::validate_non_empty_string(field, &set.key)?;
                validation::validate_markers(field, &set.key, &set.markers)?;
            }
        }

        if let Some(logging) = &self.logging {
            if let Some(level) = &logging.level {
                validation::validate_one_of(
                    "logging.level",
                    level,
                    &["trace", "debug", "info", "warn", "error"],
                )?;
            }
            if let Some(format) = &logging.format {
                validation::validate_one_of("logging.format", format, &["compact", "json"])?;
            }
            if let Some(path) = &logging.file_path {
                validation::validate_path("logging.file_path", path)?;
            }
        }

        // 分類器能產生的每個 key 都必須在 registry 內
        classifier.validate_against(&self.registry())
    }
}

impl Validate for RouterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_builtin_tables() {
        let toml_content = r#"
[endpoint]
url = "https://inference.example.com/invocations"
"#;

        let config = RouterConfig::from_toml_str(toml_content).unwrap();

        tokio_test::assert_ok!(config.validate());
        assert_eq!(config.generation, GenerationParameters::default());
        assert_eq!(config.endpoint.timeout(), Duration::from_secs(120));
        assert_eq!(config.endpoint.deadline(), None);
        assert_eq!(config.endpoint.transient_status_codes(), vec![424, 503]);
        assert_eq!(config.registry(), AdapterRegistry::builtin());
        assert_eq!(config.classifier(), QueryClassifier::builtin());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[endpoint]
url = "http://localhost:8080/generate"
timeout_seconds = 30
deadline_seconds = 90
transient_status_codes = [424]

[endpoint.headers]
X-Tenant = "support"

[generation]
max_new_tokens = 256

[registry.languages.german]
code = "de"
adapter_id = "german-customer-support"

[registry.domains]
billing = "billing-support"
technical = "technical-support"

[classifier]
default_language = "german"
default_domain = "technical"

[[classifier.languages]]
key = "german"
markers = ["hallo", "danke"]

[[classifier.domains]]
key = "billing"
markers = ["rechnung"]

[logging]
level = "debug"
format = "json"
"#;

        let config = RouterConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        assert_eq!(config.endpoint.timeout(), Duration::from_secs(30));
        assert_eq!(config.endpoint.deadline(), Some(Duration::from_secs(90)));
        assert_eq!(config.generation.max_new_tokens, 256);
        // 未指定的生成參數沿用預設值
        assert_eq!(config.generation.temperature, 0.7);
        assert!(config.generation.do_sample);

        let classification = config.classifier().classify("Hallo, meine Rechnung");
        assert_eq!(classification.language, "german");
        assert_eq!(classification.domain, "billing");
        assert_eq!(
            config.registry().resolve("german", "billing").unwrap(),
            "de-billing-support"
        );
        assert_eq!(config.logging().format.as_deref(), Some("json"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LORA_ROUTER_TEST_TOKEN", "secret-token");

        let toml_content = r#"
[endpoint]
url = "https://inference.example.com"
auth_token = "${LORA_ROUTER_TEST_TOKEN}"
"#;

        let config = RouterConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.endpoint.auth_token.as_deref(), Some("secret-token"));
        assert!(config.validate().is_ok());

        std::env::remove_var("LORA_ROUTER_TEST_TOKEN");
    }

    #[test]
    fn test_unresolved_token_fails_validation() {
        let toml_content = r#"
[endpoint]
url = "https://inference.example.com"
auth_token = "${LORA_ROUTER_TEST_UNSET_TOKEN}"
"#;

        let config = RouterConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("LORA_ROUTER_TEST_UNSET_TOKEN"));
    }

    #[test]
    fn test_classifier_key_missing_from_registry_fails_at_load() {
        let toml_content = r#"
[endpoint]
url = "https://inference.example.com"

[registry.languages.spanish]
code = "es"
adapter_id = "spanish-customer-support"

[registry.languages.french]
code = "fr"
adapter_id = "french-customer-support"

[registry.domains]
technical = "technical-support"
billing = "billing-support"
product = "product-support"
"#;

        let config = RouterConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, RouterError::Configuration { .. }));
        assert!(err.to_string().contains("russian"));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = RouterConfig::for_endpoint("ftp://inference.example.com");
        tokio_test::assert_err!(config.validate());

        config.endpoint.url = "https://inference.example.com".to_string();
        config.generation.temperature = 3.5;
        assert!(config.validate().is_err());

        config.generation.temperature = 0.7;
        config.endpoint.timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        config.endpoint.timeout_seconds = None;
        config.endpoint.transient_status_codes = Some(vec![200]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_marker_list_fails_validation() {
        let toml_content = r#"
[endpoint]
url = "https://inference.example.com"

[[classifier.languages]]
key = "spanish"
markers = []
"#;

        let config = RouterConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_whitespace_marker_fails_validation() {
        let toml_content = r#"
[endpoint]
url = "https://inference.example.com"

[[classifier.languages]]
key = "french"
markers = [" "]
"#;

        let config = RouterConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, RouterError::InvalidConfigValue { .. }));
        assert!(err.to_string().contains("french"));
    }

    #[test]
    fn test_logging_level_is_validated() {
        let toml_content = r#"
[endpoint]
url = "https://inference.example.com"

[logging]
level = "verbose"
"#;

        let config = RouterConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));

        let config = RouterConfig::from_toml_str(&toml_content.replace("verbose", "warn")).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[endpoint]\nurl = \"https://inference.example.com\"\n")
            .unwrap();

        let config = RouterConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.endpoint.url, "https://inference.example.com");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RouterConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, RouterError::Io(_)));
    }
}
