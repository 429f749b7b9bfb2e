use crate::store::StoreLocation;
use serde::{Deserialize, Serialize};

pub const MEMORY_DB_PATH: &str = ":memory:";
const MEMORY_STORE_NAME: &str = "payintel";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub db_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

/// OpenAI-compatible chat-completions endpoint (Groq by default).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    /// Never read from the config file in practice; set `GROQ_API_KEY`.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    700
}

fn default_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub llm: LlmConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                db_path: "data/payments.db".into(),
            },
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 8000,
                cors_enabled: true,
            },
            llm: LlmConfig {
                base_url: "https://api.groq.com/openai/v1".into(),
                api_key: None,
                model: "llama-3.3-70b-versatile".into(),
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
                timeout_ms: default_timeout_ms(),
            },
        }
    }
}

impl ServiceConfig {
    /// Load from a JSON file, then apply environment overrides.
    /// In tests, use ServiceConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let mut config: ServiceConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Built-in defaults plus environment overrides, for running without a file.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `PAYINTEL_*` / `GROQ_API_KEY` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup("PAYINTEL_DB") {
            self.store.db_path = db;
        }
        if let Some(host) = lookup("PAYINTEL_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PAYINTEL_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("PAYINTEL_PORT={port} is not a port: {e}"))?;
        }
        if let Some(key) = lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup("PAYINTEL_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = lookup("PAYINTEL_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        Ok(())
    }

    /// `:memory:` names the shared in-memory store; anything else is a file path.
    pub fn store_location(&self) -> StoreLocation {
        if self.store.db_path == MEMORY_DB_PATH {
            StoreLocation::memory(MEMORY_STORE_NAME)
        } else {
            StoreLocation::file(&self.store.db_path)
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Config with hardcoded defaults for use in tests: an in-memory
    /// store, an ephemeral port and no API key.
    pub fn default_test() -> Self {
        let mut config = Self::default();
        config.store.db_path = MEMORY_DB_PATH.into();
        config.server.port = 0;
        config.llm.base_url = "http://127.0.0.1:9".into();
        config.llm.timeout_ms = 1_000;
        config
    }
}
