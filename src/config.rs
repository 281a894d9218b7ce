use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".solsearch";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub migration: MigrationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which embedding backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local ONNX models via fastembed (default)
    FastEmbed,
    /// OpenAI embeddings API
    OpenAI,
    /// No embeddings; search runs on the lexical stages only
    Disabled,
}

impl Default for ProviderKind {
    fn default() -> Self {
        Self::FastEmbed
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FastEmbed => write!(f, "fastembed"),
            Self::OpenAI => write!(f, "openai"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Embedding backend
    #[serde(default)]
    pub provider: ProviderKind,

    /// Local embedding model name (fastembed)
    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI embedding model name
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// API key; falls back to the OPENAI_API_KEY environment variable
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Override for the OpenAI API base URL
    #[serde(default)]
    pub openai_base_url: Option<String>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            openai_model: default_openai_model(),
            openai_api_key: None,
            openai_base_url: None,
        }
    }
}

fn default_model() -> String {
    "nomic-embed-text-v1.5".to_string()
}

fn default_openai_model() -> String {
    "text-embedding-3-small".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the LanceDB database (relative to .solsearch/)
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Whether to maintain the Tantivy text index alongside the database
    #[serde(default = "default_text_index")]
    pub text_index: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            text_index: default_text_index(),
        }
    }
}

fn default_db_path() -> String {
    "solutions.lance".to_string()
}

fn default_text_index() -> bool {
    true
}

/// Search mode configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Fallback chain: vector, hybrid, text, regex scan (default)
    Auto,
    /// Vector-only semantic search
    Vector,
    /// Text-only keyword search
    Text,
    /// Hybrid search merging vector and text results
    Hybrid,
    /// Literal substring scan
    Regex,
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::Auto
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Auto => write!(f, "auto"),
            SearchMode::Vector => write!(f, "vector"),
            SearchMode::Text => write!(f, "text"),
            SearchMode::Hybrid => write!(f, "hybrid"),
            SearchMode::Regex => write!(f, "regex"),
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(SearchMode::Auto),
            "vector" => Ok(SearchMode::Vector),
            "text" => Ok(SearchMode::Text),
            "hybrid" => Ok(SearchMode::Hybrid),
            "regex" => Ok(SearchMode::Regex),
            other => anyhow::bail!(
                "Unknown search mode '{}'. Expected auto, vector, text, hybrid or regex",
                other
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search mode: auto, vector, text, hybrid, or regex
    #[serde(default)]
    pub mode: SearchMode,

    /// Default number of results to return
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            default_limit: default_search_limit(),
        }
    }
}

fn default_search_limit() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Records embedded per batch during backfill
    #[serde(default = "default_migration_batch_size")]
    pub batch_size: usize,

    /// Upper bound on records processed in one backfill run
    #[serde(default = "default_migration_max_documents")]
    pub max_documents: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            batch_size: default_migration_batch_size(),
            max_documents: default_migration_max_documents(),
        }
    }
}

fn default_migration_batch_size() -> usize {
    5
}

fn default_migration_max_documents() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether file logging is enabled
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// Also log to stderr
    #[serde(default)]
    pub stderr: bool,

    /// Log level for the file log: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory (relative paths resolve against the project root)
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// Prefix for rotated log files
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,

    /// Rotation strategy: minutely, hourly, daily, never
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            stderr: false,
            level: default_log_level(),
            directory: default_log_directory(),
            file_prefix: default_log_file_prefix(),
            rotation: default_log_rotation(),
        }
    }
}

fn default_logging_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(".solsearch/logs")
}

fn default_log_file_prefix() -> String {
    "solsearch.log".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Config {
    /// Load configuration from the .solsearch directory
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the .solsearch directory
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = root.join(CONFIG_DIR);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the .solsearch directory
    pub fn solsearch_dir(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR)
    }

    /// Get the path to the LanceDB database
    pub fn db_path(&self, root: &Path) -> PathBuf {
        Self::solsearch_dir(root).join(&self.storage.db_path)
    }

    /// Check if solsearch is initialized in the given directory.
    ///
    /// Keyed on the config file rather than the `.solsearch` directory;
    /// logging creates the directory on every run, initialized or not.
    pub fn is_initialized(root: &Path) -> bool {
        Self::solsearch_dir(root).join(CONFIG_FILE).exists()
    }
}
