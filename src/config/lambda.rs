use crate::config::toml_config::{EndpointConfig, RouterConfig};
use crate::utils::error::{Result, RouterError};
use crate::utils::validation::{self, Validate};
use std::env;

/// Environment-driven configuration for the Lambda front-end.
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub endpoint_url: String,
    pub auth_token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub deadline_seconds: Option<u64>,
    pub config_path: Option<String>,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 方便測試：以任意查詢函式取代 `std::env`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint_url = lookup("ROUTER_ENDPOINT_URL");
        let endpoint_url = validation::validate_required_field("ROUTER_ENDPOINT_URL", &endpoint_url)?;

        Ok(Self {
            endpoint_url: endpoint_url.clone(),
            auth_token: lookup("ROUTER_API_TOKEN"),
            timeout_seconds: parse_seconds("ROUTER_TIMEOUT_SECONDS", lookup("ROUTER_TIMEOUT_SECONDS"))?,
            deadline_seconds: parse_seconds("ROUTER_DEADLINE_SECONDS", lookup("ROUTER_DEADLINE_SECONDS"))?,
            config_path: lookup("ROUTER_CONFIG_PATH"),
        })
    }

    /// Loads the optional TOML file, then lets the environment override the
    /// endpoint settings.
    pub fn into_router_config(self) -> Result<RouterConfig> {
        let mut config = match &self.config_path {
            Some(path) => RouterConfig::from_file(path)?,
            None => RouterConfig::for_endpoint(self.endpoint_url.clone()),
        };

        config.endpoint = EndpointConfig {
            url: self.endpoint_url,
            timeout_seconds: self.timeout_seconds.or(config.endpoint.timeout_seconds),
            deadline_seconds: self.deadline_seconds.or(config.endpoint.deadline_seconds),
            auth_token: self.auth_token.or(config.endpoint.auth_token),
            ..config.endpoint
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_seconds(field: &str, value: Option<String>) -> Result<Option<u64>> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| RouterError::InvalidConfigValue {
                    field: field.to_string(),
                    value: raw.clone(),
                    reason: format!("expected a whole number of seconds: {}", e),
                })
        })
        .transpose()
}
