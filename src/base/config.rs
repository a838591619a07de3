//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::base::prompts;

use super::types::{Res, Void};

/// Default base URL of the OpenAI-compatible chat-completion API.
fn default_llm_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

/// Default classification model to use.
fn default_llm_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

/// Default sampling temperature for classification.
fn default_llm_temperature() -> f32 {
    0.0
}

/// Default upper bound on a single LLM round trip, in seconds.
fn default_llm_timeout_secs() -> u64 {
    30
}

/// Default classification prompt template.
fn default_classify_prompt_template() -> String {
    prompts::CLASSIFY_PROMPT.to_string()
}

fn default_listen_address() -> String {
    "0.0.0.0:8000".to_string()
}

/// Default database endpoint: an in-memory SurrealDB instance.
fn default_db_endpoint() -> String {
    "mem://".to_string()
}

fn default_db_namespace() -> String {
    "support".to_string()
}

fn default_db_database() -> String {
    "desk".to_string()
}

/// Configuration for the support-desk application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// LLM provider API key (`SUPPORT_DESK_LLM_API_KEY`).
    pub llm_api_key: String,
    /// Base URL of the OpenAI-compatible API (`SUPPORT_DESK_LLM_API_BASE`).
    #[serde(default = "default_llm_api_base")]
    pub llm_api_base: String,
    /// Model used for classification (`SUPPORT_DESK_LLM_MODEL`).
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    /// Sampling temperature for classification (`SUPPORT_DESK_LLM_TEMPERATURE`).
    /// Value between 0 and 2; 0 keeps suggestions deterministic.
    #[serde(default = "default_llm_temperature")]
    pub llm_temperature: f32,
    /// Timeout for one LLM request, in seconds (`SUPPORT_DESK_LLM_TIMEOUT_SECS`).
    #[serde(default = "default_llm_timeout_secs")]
    pub llm_timeout_secs: u64,
    /// Optional custom classification prompt (`SUPPORT_DESK_CLASSIFY_PROMPT_TEMPLATE`).
    /// Must contain the `{description}` placeholder.
    #[serde(default = "default_classify_prompt_template")]
    pub classify_prompt_template: String,
    /// Socket address the HTTP server binds to (`SUPPORT_DESK_LISTEN_ADDRESS`).
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Database endpoint URL, e.g. `mem://` or `ws://localhost:8000` (`SUPPORT_DESK_DB_ENDPOINT`).
    #[serde(default = "default_db_endpoint")]
    pub db_endpoint: String,
    /// Database username (`SUPPORT_DESK_DB_USERNAME`).
    #[serde(default)]
    pub db_username: Option<String>,
    /// Database password (`SUPPORT_DESK_DB_PASSWORD`).
    #[serde(default)]
    pub db_password: Option<String>,
    /// Database namespace (`SUPPORT_DESK_DB_NAMESPACE`).
    #[serde(default = "default_db_namespace")]
    pub db_namespace: String,
    /// Database name (`SUPPORT_DESK_DB_DATABASE`).
    #[serde(default = "default_db_database")]
    pub db_database: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("SUPPORT_DESK"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Void {
        if self.llm_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("LLM API key must be set."));
        }

        if self.llm_temperature < 0.0 || self.llm_temperature > 2.0 {
            return Err(anyhow::anyhow!("LLM temperature must be between 0 and 2."));
        }

        if self.llm_timeout_secs == 0 {
            return Err(anyhow::anyhow!("LLM timeout must be at least one second."));
        }

        if !self.classify_prompt_template.contains(prompts::DESCRIPTION_PLACEHOLDER) {
            return Err(anyhow::anyhow!("Classification prompt template must contain `{}`.", prompts::DESCRIPTION_PLACEHOLDER));
        }

        if self.db_username.is_some() != self.db_password.is_some() {
            return Err(anyhow::anyhow!("Database username and password must be set together."));
        }

        Ok(())
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            inner: Arc::new(ConfigInner {
                llm_api_key: "test_key".to_string(),
                llm_api_base: default_llm_api_base(),
                llm_model: default_llm_model(),
                llm_temperature: default_llm_temperature(),
                llm_timeout_secs: default_llm_timeout_secs(),
                classify_prompt_template: default_classify_prompt_template(),
                listen_address: default_listen_address(),
                db_endpoint: default_db_endpoint(),
                db_namespace: default_db_namespace(),
                db_database: default_db_database(),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = create_test_config();

        assert!(config.validate().is_ok());
        assert_eq!(config.llm_model, "llama-3.1-8b-instant");
        assert_eq!(config.llm_temperature, 0.0);
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let mut config = create_test_config();
        Arc::make_mut(&mut config.inner).llm_api_key = "  ".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_out_of_range_is_rejected() {
        let mut config = create_test_config();
        Arc::make_mut(&mut config.inner).llm_temperature = 2.5;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut config = create_test_config();
        Arc::make_mut(&mut config.inner).llm_timeout_secs = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prompt_without_placeholder_is_rejected() {
        let mut config = create_test_config();
        Arc::make_mut(&mut config.inner).classify_prompt_template = "Classify this.".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{description}"));
    }

    #[test]
    fn test_db_credentials_must_come_in_pairs() {
        let mut config = create_test_config();
        Arc::make_mut(&mut config.inner).db_username = Some("root".to_string());

        assert!(config.validate().is_err());

        Arc::make_mut(&mut config.inner).db_password = Some("root".to_string());

        assert!(config.validate().is_ok());
    }
}
