//! Model routing
//!
//! Pairs that share no content words have nothing to navigate between, so
//! they go to the structural model. So do pairs whose cleaned sides come out
//! empty.

use crate::context::EngineContext;
use crate::decision::Model;
use tracing::debug;
use xte_common::Result;

pub struct ModelRouter<'a> {
    ctx: &'a EngineContext,
}

impl<'a> ModelRouter<'a> {
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    pub async fn choose(&self, text: &str, hypothesis: &str) -> Result<Model> {
        let handler = &self.ctx.handler;

        let mut text_tokens = handler.tokenize(text).await?;
        let mut hyp_tokens = handler.tokenize(hypothesis).await?;
        text_tokens.retain(|t| !handler.is_stop_word(&t.lemma));
        hyp_tokens.retain(|t| !handler.is_stop_word(&t.lemma));

        let overlaps = hyp_tokens
            .iter()
            .any(|h| text_tokens.iter().any(|t| t.lemma == h.lemma));

        let model = if !overlaps {
            Model::StructuralSimilarity
        } else {
            let (text_clean, hyp_clean) = handler.clean_pair(text, hypothesis).await?;
            if text_clean.is_empty() || hyp_clean.is_empty() {
                Model::StructuralSimilarity
            } else {
                Model::GraphNavigation
            }
        };

        debug!(model = %model, overlaps, "Model selected");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{budapest_context, HYPOTHESIS, TEXT};

    #[tokio::test]
    async fn test_overlapping_pair_goes_to_graph_navigation() {
        let ctx = budapest_context();
        let model = ModelRouter::new(&ctx).choose(TEXT, HYPOTHESIS).await.unwrap();
        assert_eq!(model, Model::GraphNavigation);
    }

    #[tokio::test]
    async fn test_disjoint_pair_goes_to_structural_model() {
        let ctx = budapest_context();
        let model = ModelRouter::new(&ctx)
            .choose(TEXT, "A violence was there.")
            .await
            .unwrap();
        // shares "violence", keeps nothing once cleaned
        assert_eq!(model, Model::StructuralSimilarity);

        let model = ModelRouter::new(&ctx)
            .choose("The cat sleeps.", "A dog barks.")
            .await
            .unwrap();
        assert_eq!(model, Model::StructuralSimilarity);
    }

    #[tokio::test]
    async fn test_stop_words_do_not_count_as_overlap() {
        let ctx = budapest_context();
        let model = ModelRouter::new(&ctx)
            .choose("A worker in the city.", "There was damage in a town.")
            .await
            .unwrap();
        assert_eq!(model, Model::StructuralSimilarity);
    }
}
