//! Structural similarity model
//!
//! Compares the dependency trees of text and hypothesis by tree edit
//! distance and accepts the pair when the normalized distance stays within
//! a threshold learned offline.

pub mod ted;
pub mod threshold;
pub mod tree;

pub use threshold::ThresholdLearner;
pub use tree::LabeledTree;

use crate::context::EngineContext;
use crate::decision::{EntailmentDecision, Model};
use tracing::debug;
use xte_common::{config::THRESHOLD_KEY, Result, XteError};

pub const SYNTACTIC_VARIATION: &str = "Hypothesis is a syntactic variation of the text.";

/// One bracket tree per sentence
pub async fn dependency_trees(ctx: &EngineContext, text: &str) -> Result<Vec<LabeledTree>> {
    ctx.handler
        .dependency_parses(text)
        .await?
        .iter()
        .map(|sentence| LabeledTree::parse(&tree::render_dependencies(sentence)?))
        .collect()
}

/// Smallest normalized distance over every (text tree, hypothesis tree)
/// combination; infinite when either side has no sentence
pub async fn distance(ctx: &EngineContext, text: &str, hypothesis: &str) -> Result<f64> {
    let text_trees = dependency_trees(ctx, text).await?;
    let hyp_trees = dependency_trees(ctx, hypothesis).await?;

    let mut min = f64::INFINITY;
    for t in &text_trees {
        for h in &hyp_trees {
            let raw = ted::tree_edit_distance(t, h);
            let diff = t.node_count().abs_diff(h.node_count());
            min = min.min(ted::normalize_distance(raw, diff));
        }
    }
    Ok(min)
}

pub struct StructuralModel<'a> {
    ctx: &'a EngineContext,
    threshold: f64,
}

impl<'a> StructuralModel<'a> {
    /// Fails when no threshold has been learned yet
    pub fn new(ctx: &'a EngineContext) -> Result<Self> {
        let threshold = ctx.threshold.ok_or_else(|| XteError::Configuration {
            message: format!("'{}' is not set; run `xte train` first", THRESHOLD_KEY),
        })?;
        Ok(Self { ctx, threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub async fn distance(&self, text: &str, hypothesis: &str) -> Result<f64> {
        distance(self.ctx, text, hypothesis).await
    }

    pub async fn decide(&self, text: &str, hypothesis: &str) -> Result<EntailmentDecision> {
        let distance = self.distance(text, hypothesis).await?;
        debug!(distance, threshold = self.threshold, "Tree edit distance");

        if distance <= self.threshold {
            Ok(EntailmentDecision::yes(Model::StructuralSimilarity, SYNTACTIC_VARIATION))
        } else {
            Ok(EntailmentDecision::no(Model::StructuralSimilarity))
        }
    }
}
