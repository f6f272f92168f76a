//! Entailment pipeline
//!
//! Routes each pair to a model, lets the context veto reject it early and
//! otherwise runs the chosen model. Also drives dataset runs and threshold
//! training.

use crate::candidates::candidate_pairs;
use crate::context::EngineContext;
use crate::decision::{Decision, EntailmentDecision, Model};
use crate::eval::Evaluation;
use crate::navigation::GraphNavigationModel;
use crate::router::ModelRouter;
use crate::structural::{threshold::LearnedThreshold, StructuralModel, ThresholdLearner};
use crate::veto::ContextVeto;
use std::path::Path;
use tracing::{info, instrument, warn};
use xte_common::{
    config::persist_threshold,
    dataset::{read_pairs, EntailmentPair, ResultWriter},
    metrics::{self, DecisionMetrics},
    Result,
};

pub struct EntailmentPipeline<'a> {
    ctx: &'a EngineContext,
    router: ModelRouter<'a>,
    veto: ContextVeto<'a>,
    structural: StructuralModel<'a>,
    navigation: GraphNavigationModel<'a>,
}

impl<'a> EntailmentPipeline<'a> {
    /// Fails when no tree edit distance threshold has been learned
    pub fn new(ctx: &'a EngineContext) -> Result<Self> {
        Ok(Self {
            ctx,
            router: ModelRouter::new(ctx),
            veto: ContextVeto::new(ctx),
            structural: StructuralModel::new(ctx)?,
            navigation: GraphNavigationModel::new(ctx),
        })
    }

    #[instrument(skip_all)]
    pub async fn decide(&self, text: &str, hypothesis: &str) -> Result<EntailmentDecision> {
        let model = self.router.choose(text, hypothesis).await?;
        self.decide_with(model, text, hypothesis).await
    }

    async fn decide_with(&self, model: Model, text: &str, hypothesis: &str) -> Result<EntailmentDecision> {
        let timer = DecisionMetrics::start();
        let decision = if self.veto.check(text, hypothesis).await? == Decision::No {
            EntailmentDecision::no(model)
        } else {
            match model {
                Model::StructuralSimilarity => self.structural.decide(text, hypothesis).await?,
                Model::GraphNavigation => {
                    let candidates = candidate_pairs(self.ctx, text, hypothesis).await?;
                    self.navigation.compute(&candidates).await?
                }
            }
        };

        timer.finish(decision.model.metric_label(), decision.decision.as_str());
        Ok(decision)
    }

    /// Decision text for a single pair
    pub async fn decide_one(&self, text: &str, hypothesis: &str) -> Result<String> {
        Ok(self.decide(text, hypothesis).await?.render())
    }

    /// Decision for one dataset pair. A pair that cannot be decided is
    /// answered `no` by the model it was routed to, or by the structural
    /// model when routing itself failed.
    #[instrument(skip_all, fields(pair = %pair.id))]
    async fn decide_pair(&self, pair: &EntailmentPair) -> EntailmentDecision {
        let outcome = match self.router.choose(&pair.text, &pair.hypothesis).await {
            Ok(model) => self
                .decide_with(model, &pair.text, &pair.hypothesis)
                .await
                .map_err(|e| (model, e)),
            Err(e) => Err((Model::StructuralSimilarity, e)),
        };

        outcome.unwrap_or_else(|(model, error)| {
            warn!(pair = %pair.id, model = %model, error = %error, "Pair could not be decided");
            metrics::record_failed_pair(model.metric_label());
            EntailmentDecision::no(model)
        })
    }

    /// Decide every pair of `input`, write the result file to `output` and
    /// score the decisions against the gold labels present
    pub async fn decide_dataset(&self, input: &Path, output: &Path) -> Result<Evaluation> {
        let pairs = read_pairs(input)?;
        let mut writer = ResultWriter::create(output)?;
        let mut evaluation = Evaluation::default();

        for pair in &pairs {
            let decision = self.decide_pair(pair).await;
            info!(
                pair = %pair.id,
                model = %decision.model,
                entailment = %decision.decision,
                "Pair decided"
            );

            writer.write(
                pair,
                decision.decision.as_str(),
                decision.model.name(),
                decision.justification.as_deref(),
            )?;
            if pair.gold.is_some() {
                evaluation.record(decision.model, decision.decision.is_yes(), pair.gold_is_yes());
            }
        }
        writer.finish()?;

        info!(
            pairs = pairs.len(),
            output = %output.display(),
            f1 = format!("{:.2}", evaluation.overall.f1()),
            "Dataset decided"
        );
        Ok(evaluation)
    }
}

/// Learn the threshold from a labelled dataset and persist it to the
/// configuration store at `config_path`
pub async fn train(ctx: &EngineContext, dataset: &Path, config_path: &Path) -> Result<LearnedThreshold> {
    let pairs = read_pairs(dataset)?;
    let learned = ThresholdLearner::new(ctx).train(&pairs).await?;
    persist_threshold(config_path, learned.threshold)?;
    Ok(learned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structural::SYNTACTIC_VARIATION;
    use crate::testing::{
        budapest_annotator, budapest_context, budapest_context_with, Fixture, HYPOTHESIS, TEXT,
    };
    use xte_common::XteError;

    const DATASET: &str = "\
1 T: A council worker cleans up after Tuesday's violence in Budapest.
1 H: There was damage in Budapest.
1 A: YES

2 T: The cat sleeps.
2 H: A dog barks.
2 A: NO
";

    #[tokio::test]
    async fn test_budapest_pair_is_entailed_through_the_graph() {
        let ctx = budapest_context();
        let pipeline = EntailmentPipeline::new(&ctx).unwrap();

        let decision = pipeline.decide(TEXT, HYPOTHESIS).await.unwrap();
        assert_eq!(decision.model, Model::GraphNavigation);
        assert_eq!(decision.decision, Decision::Yes);
        assert_eq!(
            decision.justification.as_deref(),
            Some("A violence is an act that causes damage")
        );
    }

    #[tokio::test]
    async fn test_decide_one_is_idempotent() {
        let ctx = budapest_context();
        let pipeline = EntailmentPipeline::new(&ctx).unwrap();

        let first = pipeline.decide_one(TEXT, HYPOTHESIS).await.unwrap();
        let second = pipeline.decide_one(TEXT, HYPOTHESIS).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first,
            "Using model 'Graph Navigation'\nEntailment: yes\nJustification:\nA violence is an act that causes damage"
        );
    }

    #[tokio::test]
    async fn test_veto_keeps_the_routed_model() {
        let ctx = budapest_context();
        let pipeline = EntailmentPipeline::new(&ctx).unwrap();

        let decision = pipeline
            .decide("A council worker did not clean up in Budapest.", "A council worker cleaned up in Budapest.")
            .await
            .unwrap();
        // the hypothesis is fully covered, so the structural model was routed
        assert_eq!(decision, EntailmentDecision::no(Model::StructuralSimilarity));
    }

    #[tokio::test]
    async fn test_pipeline_needs_a_threshold() {
        let ctx = budapest_context_with(Fixture {
            threshold: None,
            ..Default::default()
        });
        assert!(matches!(
            EntailmentPipeline::new(&ctx),
            Err(XteError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_decide_dataset_writes_results_and_scores() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dev.txt");
        let output = dir.path().join("dev.out");
        std::fs::write(&input, DATASET).unwrap();

        let ctx = budapest_context();
        let pipeline = EntailmentPipeline::new(&ctx).unwrap();
        let evaluation = pipeline.decide_dataset(&input, &output).await.unwrap();

        assert_eq!(evaluation.overall.true_positives, 1);
        assert_eq!(evaluation.overall.true_negatives, 1);
        assert_eq!(evaluation.model(Model::GraphNavigation).true_positives, 1);
        assert_eq!(evaluation.model(Model::StructuralSimilarity).true_negatives, 1);

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("1 T: A council worker"));
        assert!(written.contains(
            "Entailment: yes\nModel: Graph Navigation\nJustification:\nA violence is an act that causes damage\n\n"
        ));
        assert!(written.contains("2 A: NO\nEntailment: no\nModel: Tree Edit Distance\n\n"));
    }

    #[tokio::test]
    async fn test_failed_pair_does_not_stop_the_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dev.txt");
        let output = dir.path().join("dev.out");
        std::fs::write(
            &input,
            format!("{}\n3 T: The cat sleeps.\n3 H: The cat sleeps.\n3 A: YES\n", DATASET),
        )
        .unwrap();

        // pair 2's hypothesis comes back with a truncated constituency parse
        let annotator = budapest_annotator().with_parse("A dog barks.", "(ROOT (S (NP");
        let ctx = budapest_context_with(Fixture {
            annotator: Some(annotator),
            ..Default::default()
        });
        let pipeline = EntailmentPipeline::new(&ctx).unwrap();
        assert!(pipeline.decide("The cat sleeps.", "A dog barks.").await.is_err());

        let evaluation = pipeline.decide_dataset(&input, &output).await.unwrap();
        assert_eq!(evaluation.overall.total(), 3);
        assert_eq!(evaluation.overall.true_positives, 2);
        assert_eq!(evaluation.overall.true_negatives, 1);

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("Justification:\nA violence is an act that causes damage\n\n"));
        assert!(written.contains("2 A: NO\nEntailment: no\nModel: Tree Edit Distance\n\n"));
        assert!(written.contains(&format!(
            "3 A: YES\nEntailment: yes\nModel: Tree Edit Distance\nJustification:\n{}\n",
            SYNTACTIC_VARIATION
        )));
    }

    #[tokio::test]
    async fn test_train_persists_the_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("train.txt");
        let store = dir.path().join("xte.conf");
        std::fs::write(
            &dataset,
            "1 T: The cat sleeps.\n1 H: The cat sleeps.\n1 A: YES\n\n\
             2 T: The cat sleeps.\n2 H: A dog barks.\n2 A: NO\n",
        )
        .unwrap();
        std::fs::write(&store, "wnpath = dict\ntedthreshold = 0\n").unwrap();

        let ctx = budapest_context();
        let learned = train(&ctx, &dataset, &store).await.unwrap();
        assert!(learned.threshold > 0.0);
        assert_eq!(learned.f1, 1.0);

        let content = std::fs::read_to_string(&store).unwrap();
        assert!(content.contains(&format!("tedthreshold = {}", learned.threshold)));
        assert!(content.starts_with("wnpath = dict\n"));
    }
}
