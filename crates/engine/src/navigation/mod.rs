//! Graph navigation model
//!
//! Searches the knowledge graph for a path from a text concept to a
//! hypothesis concept. The shallowest path found over all candidate pairs
//! decides entailment and is rendered as its justification.

pub mod justify;
pub mod path;
pub mod ranking;
pub mod search;

pub use justify::write_justification;
pub use path::{path_depth, PathStep, StepRole};
pub use search::PathSearch;

use crate::candidates::CandidatePair;
use crate::context::EngineContext;
use crate::decision::{EntailmentDecision, Model};
use tracing::{debug, info};
use xte_common::Result;

pub struct GraphNavigationModel<'a> {
    ctx: &'a EngineContext,
}

impl<'a> GraphNavigationModel<'a> {
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Every path found for the candidates, in candidate order
    pub async fn paths(&self, candidates: &[CandidatePair]) -> Result<Vec<Vec<PathStep>>> {
        let mut paths = Vec::new();
        for candidate in candidates {
            let found = PathSearch::new(self.ctx, &candidate.target, &candidate.target_tag)
                .run(&candidate.source, &candidate.source_tag)
                .await?;
            debug!(
                source = %candidate.source,
                to = %candidate.target,
                paths = found.len(),
                "Candidate searched"
            );
            paths.extend(found);
        }
        Ok(paths)
    }

    pub async fn compute(&self, candidates: &[CandidatePair]) -> Result<EntailmentDecision> {
        let paths = self.paths(candidates).await?;

        // first of the shallowest paths
        let mut best: Option<(usize, &Vec<PathStep>)> = None;
        for path in &paths {
            let depth = path_depth(path);
            if best.map_or(true, |(d, _)| depth < d) {
                best = Some((depth, path));
            }
        }

        match best {
            Some((depth, path)) => {
                info!(depth, paths = paths.len(), "Entailment path found");
                Ok(EntailmentDecision::yes(Model::GraphNavigation, write_justification(path)))
            }
            None => {
                info!(candidates = candidates.len(), "No entailment path found");
                Ok(EntailmentDecision::no(Model::GraphNavigation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::Decision;
    use crate::testing::{budapest_context, budapest_context_with, Fixture};
    use xte_common::{
        graph::{definition::RoleRecord, DefinitionGraph},
        lexical::{LexicalTables, SynonymTable, WordClass},
        similarity::MockScorer,
    };

    fn candidate(source: &str, target: &str) -> CandidatePair {
        CandidatePair {
            source: source.to_string(),
            source_tag: "NN".to_string(),
            target: target.to_string(),
            target_tag: "NN".to_string(),
            score: 0.5,
        }
    }

    #[tokio::test]
    async fn test_violence_entails_damage() {
        let ctx = budapest_context();
        let model = GraphNavigationModel::new(&ctx);
        let decision = model
            .compute(&[candidate("tuesday", "damage"), candidate("violence", "damage")])
            .await
            .unwrap();

        assert_eq!(decision.decision, Decision::Yes);
        assert_eq!(decision.model, Model::GraphNavigation);
        assert_eq!(
            decision.justification.as_deref(),
            Some("A violence is an act that causes damage")
        );
    }

    #[tokio::test]
    async fn test_no_path_is_no() {
        let ctx = budapest_context();
        let decision = GraphNavigationModel::new(&ctx)
            .compute(&[candidate("tuesday", "damage")])
            .await
            .unwrap();
        assert_eq!(decision, EntailmentDecision::no(Model::GraphNavigation));

        let decision = GraphNavigationModel::new(&ctx).compute(&[]).await.unwrap();
        assert_eq!(decision.decision, Decision::No);
    }

    #[tokio::test]
    async fn test_shallowest_path_wins() {
        let lexical = LexicalTables {
            synonyms: SynonymTable::default().with_group(&["violence", "force"], WordClass::Noun),
            ..Default::default()
        };
        let graph = DefinitionGraph::new()
            .with_synset("noun", &["violence"], &["act"], vec![])
            .with_synset(
                "noun",
                &["riot"],
                &["act"],
                vec![RoleRecord::literal("act", "has_diff_qual", "of force")],
            );
        let scorer = MockScorer::new()
            .with_score("force", "act", 0.5)
            .with_score("force", "of force", 0.9)
            .with_score("force", "force", 1.0);
        let ctx = budapest_context_with(Fixture {
            lexical,
            graph: Some(graph),
            scorer: Some(scorer),
            ..Default::default()
        });

        let decision = GraphNavigationModel::new(&ctx)
            .compute(&[candidate("riot", "force"), candidate("violence", "force")])
            .await
            .unwrap();
        assert_eq!(
            decision.justification.as_deref(),
            Some("Violence is synonym of force")
        );
    }
}
