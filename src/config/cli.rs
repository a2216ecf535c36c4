use crate::config::toml_config::RouterConfig;
use crate::utils::error::{Result, RouterError};
use crate::utils::validation::validate_file_extensions;
use clap::Parser;
use std::fmt;

#[derive(Clone, Parser)]
#[command(name = "lora-router")]
#[command(about = "Route customer-support queries to the matching LoRA adapter")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Inference endpoint URL (overrides the config file)
    #[arg(long, env = "ROUTER_ENDPOINT_URL")]
    pub endpoint: Option<String>,

    /// Bearer token for the endpoint (overrides the config file)
    #[arg(long, env = "ROUTER_API_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Classify and build the request without calling the endpoint
    #[arg(long)]
    pub dry_run: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Run the built-in multilingual sample queries
    #[arg(long)]
    pub samples: bool,

    /// Query text; when omitted, one query per line is read from stdin
    #[arg(trailing_var_arg = true)]
    pub query: Vec<String>,
}

impl CliArgs {
    pub fn query_text(&self) -> Option<String> {
        if self.query.is_empty() {
            None
        } else {
            Some(self.query.join(" "))
        }
    }

    /// 載入 TOML 配置並套用命令列覆蓋設定
    pub fn router_config(&self) -> Result<RouterConfig> {
        let mut config = match (&self.config, &self.endpoint) {
            (Some(path), _) => {
                validate_file_extensions("--config", std::slice::from_ref(path), &["toml"])?;
                RouterConfig::from_file(path)?
            }
            (None, Some(endpoint)) => RouterConfig::for_endpoint(endpoint.clone()),
            (None, None) => {
                return Err(RouterError::MissingConfig {
                    field: "--config or --endpoint (ROUTER_ENDPOINT_URL)".to_string(),
                })
            }
        };

        if let Some(endpoint) = &self.endpoint {
            config.endpoint.url = endpoint.clone();
        }
        if let Some(token) = &self.auth_token {
            config.endpoint.auth_token = Some(token.clone());
        }

        Ok(config)
    }
}

// token 不可出現在日誌
impl fmt::Debug for CliArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliArgs")
            .field("config", &self.config)
            .field("endpoint", &self.endpoint)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("verbose", &self.verbose)
            .field("dry_run", &self.dry_run)
            .field("json", &self.json)
            .field("samples", &self.samples)
            .field("query", &self.query)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_query_words_are_joined() {
        let args = CliArgs::parse_from([
            "lora-router",
            "--endpoint",
            "https://inference.example.com",
            "Hola,",
            "mi",
            "producto",
        ]);
        assert_eq!(args.query_text().as_deref(), Some("Hola, mi producto"));
        assert!(!args.dry_run);
    }

    #[test]
    fn test_debug_redacts_auth_token() {
        let args = CliArgs::parse_from([
            "lora-router",
            "--endpoint",
            "https://inference.example.com",
            "--auth-token",
            "s3cr3t-token",
        ]);

        let rendered = format!("{:?}", args);
        assert!(!rendered.contains("s3cr3t-token"));
        assert!(rendered.contains("<redacted>"));
        assert_eq!(args.auth_token.as_deref(), Some("s3cr3t-token"));
    }

    #[test]
    fn test_endpoint_only_uses_builtin_config() {
        let args = CliArgs::parse_from(["lora-router", "--endpoint", "https://inference.example.com"]);
        let config = args.router_config().unwrap();
        assert_eq!(config.endpoint.url, "https://inference.example.com");
        assert!(config.registry.is_none());
    }

    #[test]
    fn test_endpoint_flag_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(b"[endpoint]\nurl = \"https://from-file.example.com\"\n")
            .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let args = CliArgs::parse_from([
            "lora-router",
            "--config",
            path.as_str(),
            "--endpoint",
            "https://from-flag.example.com",
        ]);
        let config = args.router_config().unwrap();
        assert_eq!(config.endpoint.url, "https://from-flag.example.com");
    }

    #[test]
    fn test_non_toml_config_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let args = CliArgs::parse_from(["lora-router", "--config", path.as_str()]);
        assert!(args.router_config().is_err());
    }
}
