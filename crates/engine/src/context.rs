//! Engine context
//!
//! Everything the models consult, loaded once per knowledge base and shared
//! read-only across all pairs of a run.

use std::sync::Arc;
use xte_common::{
    config::XteConfig,
    graph::{DefinitionGraph, KnowledgeBase, KnowledgeGraph},
    lexical::{CoreNlpClient, IdfTable, LexicalTables, Lexicon, StopWords, TextHandler},
    similarity::{RelatednessClient, SimilarityScorer},
    Result,
};

pub struct EngineContext {
    pub handler: TextHandler,
    pub tables: LexicalTables,
    pub graph: Arc<dyn KnowledgeGraph>,
    pub scorer: Arc<dyn SimilarityScorer>,
    /// Learned tree edit distance threshold, if training has run
    pub threshold: Option<f64>,
}

impl EngineContext {
    pub fn new(
        handler: TextHandler,
        tables: LexicalTables,
        graph: Arc<dyn KnowledgeGraph>,
        scorer: Arc<dyn SimilarityScorer>,
    ) -> Self {
        Self {
            handler,
            tables,
            graph,
            scorer,
            threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Build the context from configuration: dictionary, lexical tables,
    /// the knowledge base's graph and gloss corpus, and the service clients
    pub fn load(config: &XteConfig, kb: KnowledgeBase) -> Result<Self> {
        tracing::info!(kb = %kb, "Loading engine resources");

        let annotator = Arc::new(CoreNlpClient::new(config)?);
        let lexicon = Lexicon::load(&config.wnpath)?;
        let stop_words = StopWords::load(config.resources_dir.join("stop_words.txt"))?;
        let idf = IdfTable::load(config.gloss_corpus_path(kb))?;
        let handler = TextHandler::new(annotator, lexicon, stop_words, idf);

        let tables = LexicalTables::load(&config.resources_dir)?;
        let graph = Arc::new(DefinitionGraph::load(config.graph_path(kb)?)?);
        let scorer = Arc::new(RelatednessClient::new(config)?);

        Ok(Self {
            handler,
            tables,
            graph,
            scorer,
            // a missing threshold only fails once the structural model is built
            threshold: config.threshold().ok(),
        })
    }
}
