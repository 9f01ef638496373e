use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct EllaConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub model: ModelConfig,
    pub conversation: ConversationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Text-vectorizer inference endpoint used for semantic recall.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub url: String,
    pub model: String,
    pub dimensions: usize,
    pub timeout_secs: u64,
}

/// OpenAI-compatible chat completion endpoint.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConversationConfig {
    pub thread_capacity: usize,
    /// Upper bound on thread buffers held in memory; least recently used are dropped.
    pub max_threads: usize,
    pub recall_top_k: usize,
    pub intent_cache_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_ella_dir()
            .join("chat.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8081".into(),
            model: "sentence-transformers/multi-qa-MiniLM-L6-cos-v1".into(),
            dimensions: 384,
            timeout_secs: 30,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-3.5-turbo".into(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            thread_capacity: crate::memory::thread::DEFAULT_THREAD_CAPACITY,
            max_threads: crate::memory::registry::DEFAULT_MAX_THREADS,
            recall_top_k: 3,
            intent_cache_size: crate::intent::DEFAULT_CACHE_SIZE,
        }
    }
}

/// Returns `~/.ella/`, or `./.ella/` when no home directory is known.
pub fn default_ella_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ella")
}

/// Returns the default config file path: `~/.ella/config.toml`
pub fn default_config_path() -> PathBuf {
    default_ella_dir().join("config.toml")
}

impl EllaConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            EllaConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (ELLA_DB, ELLA_LOG_LEVEL, ELLA_EMBEDDING_URL,
    /// ELLA_MODEL, OPENAI_API_KEY, OPENAI_BASE_URL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ELLA_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("ELLA_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("ELLA_EMBEDDING_URL") {
            self.embedding.url = val;
        }
        if let Ok(val) = std::env::var("ELLA_MODEL") {
            self.model.model = val;
        }
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.model.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("OPENAI_BASE_URL") {
            self.model.base_url = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
