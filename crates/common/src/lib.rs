//! XTE Common Library
//!
//! Shared code for the entailment engine and its command line:
//! - Error types and handling
//! - Configuration store
//! - Lexical resources and the text handler
//! - Knowledge graph abstraction
//! - Relatedness scoring client abstraction
//! - Dataset reading and result writing
//! - Metrics helpers

pub mod config;
pub mod dataset;
pub mod errors;
pub mod graph;
pub mod lexical;
pub mod metrics;
pub mod similarity;

// Re-export commonly used types
pub use config::XteConfig;
pub use dataset::EntailmentPair;
pub use errors::{Result, XteError};
pub use graph::{KnowledgeBase, KnowledgeGraph};
pub use lexical::TextHandler;
pub use similarity::SimilarityScorer;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
