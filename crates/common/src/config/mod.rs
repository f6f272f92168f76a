//! Configuration store for XTE
//!
//! The store is a flat `key = value` file with `#` comments. It is loaded
//! through the `config` crate and layered with:
//! - Environment variables (prefixed with XTE_, e.g. XTE_TEDTHRESHOLD)
//! - A `.env` file (read by the binary through dotenvy)
//! - Default values
//!
//! The learned threshold is written back in place by [`persist_threshold`].

use crate::errors::{Result, XteError};
use crate::graph::KnowledgeBase;
use config::{Config, ConfigError, Environment, File, FileFormat};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Key under which the structural model's learned threshold is stored
pub const THRESHOLD_KEY: &str = "tedthreshold";

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct XteConfig {
    /// WordNet-style dictionary directory (index.* and *.exc files)
    pub wnpath: PathBuf,

    /// Definition graph for WordNet
    pub wngraph: Option<PathBuf>,

    /// Definition graph for Wiktionary
    pub wktgraph: Option<PathBuf>,

    /// Definition graph for Wikipedia
    pub wkpgraph: Option<PathBuf>,

    /// Definition graph for Webster's
    pub wbtgraph: Option<PathBuf>,

    /// Learned tree edit distance threshold, absent until `train` has run
    pub tedthreshold: Option<f64>,

    /// Directory holding stop words, lexical tables and gloss corpora
    #[serde(default = "default_resources_dir")]
    pub resources_dir: PathBuf,

    /// Relatedness service endpoint
    #[serde(default = "default_similarity_url")]
    pub similarity_url: String,

    #[serde(default = "default_similarity_corpus")]
    pub similarity_corpus: String,

    #[serde(default = "default_similarity_model")]
    pub similarity_model: String,

    #[serde(default = "default_similarity_language")]
    pub similarity_language: String,

    #[serde(default = "default_similarity_score_function")]
    pub similarity_score_function: String,

    /// Request timeout in seconds
    #[serde(default = "default_similarity_timeout")]
    pub similarity_timeout_secs: u64,

    /// Maximum retries for a failed relatedness request
    #[serde(default = "default_similarity_retries")]
    pub similarity_max_retries: u32,

    /// CoreNLP-compatible annotation server
    #[serde(default = "default_annotator_url")]
    pub annotator_url: String,

    #[serde(default = "default_annotator_timeout")]
    pub annotator_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,
}

// Default value functions
fn default_resources_dir() -> PathBuf { PathBuf::from("resources") }
fn default_similarity_url() -> String { "http://localhost:8916/relatedness".to_string() }
fn default_similarity_corpus() -> String { "wiki-2018".to_string() }
fn default_similarity_model() -> String { "W2V".to_string() }
fn default_similarity_language() -> String { "EN".to_string() }
fn default_similarity_score_function() -> String { "COSINE".to_string() }
fn default_similarity_timeout() -> u64 { 30 }
fn default_similarity_retries() -> u32 { 3 }
fn default_annotator_url() -> String { "http://localhost:9000".to_string() }
fn default_annotator_timeout() -> u64 { 60 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }

impl XteConfig {
    /// Load the store at `path`, layered with XTE_ environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().into_owned();

        let config = Config::builder()
            .add_source(File::new(&path, FileFormat::Ini))
            // e.g., XTE_TEDTHRESHOLD=42
            .add_source(Environment::with_prefix("XTE").try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    /// Graph file configured for a knowledge base
    pub fn graph_path(&self, kb: KnowledgeBase) -> Result<&Path> {
        let path = match kb {
            KnowledgeBase::WordNet => &self.wngraph,
            KnowledgeBase::Wiktionary => &self.wktgraph,
            KnowledgeBase::Wikipedia => &self.wkpgraph,
            KnowledgeBase::Webster => &self.wbtgraph,
        };
        path.as_deref().ok_or_else(|| XteError::Configuration {
            message: format!("no graph file configured for {} ({})", kb, kb.config_key()),
        })
    }

    /// Learned threshold, required by the structural model at construction
    pub fn threshold(&self) -> Result<f64> {
        self.tedthreshold.ok_or_else(|| XteError::Configuration {
            message: format!("'{}' is not set; run `xte train` first", THRESHOLD_KEY),
        })
    }

    /// Gloss corpus used for IDF scoring of a knowledge base
    pub fn gloss_corpus_path(&self, kb: KnowledgeBase) -> PathBuf {
        self.resources_dir
            .join(format!("{}_gloss_corpus.txt", kb.code().to_lowercase()))
    }

    pub fn similarity_timeout(&self) -> Duration {
        Duration::from_secs(self.similarity_timeout_secs)
    }

    pub fn annotator_timeout(&self) -> Duration {
        Duration::from_secs(self.annotator_timeout_secs)
    }
}

impl Default for XteConfig {
    fn default() -> Self {
        Self {
            wnpath: PathBuf::from("dict"),
            wngraph: None,
            wktgraph: None,
            wkpgraph: None,
            wbtgraph: None,
            tedthreshold: None,
            resources_dir: default_resources_dir(),
            similarity_url: default_similarity_url(),
            similarity_corpus: default_similarity_corpus(),
            similarity_model: default_similarity_model(),
            similarity_language: default_similarity_language(),
            similarity_score_function: default_similarity_score_function(),
            similarity_timeout_secs: default_similarity_timeout(),
            similarity_max_retries: default_similarity_retries(),
            annotator_url: default_annotator_url(),
            annotator_timeout_secs: default_annotator_timeout(),
            log_level: default_log_level(),
            json_logging: default_json_logging(),
        }
    }
}

/// Rewrite the `tedthreshold` line of the store in place.
///
/// Every other line is left untouched. The line is appended when absent.
pub fn persist_threshold(path: impl AsRef<Path>, value: f64) -> Result<()> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let pattern = Regex::new(&format!(r"(?m)^[ \t]*{}[ \t]*=.*$", THRESHOLD_KEY)).map_err(|e| {
        XteError::Internal {
            message: format!("invalid threshold pattern: {}", e),
        }
    })?;
    let line = format!("{} = {}", THRESHOLD_KEY, value);

    let updated = if pattern.is_match(&content) {
        pattern.replace(&content, line.as_str()).into_owned()
    } else if content.is_empty() || content.ends_with('\n') {
        format!("{}{}\n", content, line)
    } else {
        format!("{}\n{}\n", content, line)
    };

    std::fs::write(path, updated)?;
    tracing::info!(path = %path.display(), threshold = value, "Persisted learned threshold");
    Ok(())
}
