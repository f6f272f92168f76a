//! Threshold learning for the structural model
//!
//! Every distinct finite distance observed on a labelled training set is a
//! candidate threshold. Scanning candidates in ascending order, a pair is
//! predicted entailed when its distance is strictly below the candidate; the
//! candidate with the highest F1 wins, and ties keep the earlier one.

use super::distance;
use crate::context::EngineContext;
use crate::eval::Confusion;
use tracing::{debug, info};
use xte_common::{dataset::EntailmentPair, Result, XteError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnedThreshold {
    pub threshold: f64,
    pub f1: f64,
}

/// Distance of each training pair with its gold label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub distance: f64,
    pub gold_yes: bool,
}

pub struct ThresholdLearner<'a> {
    ctx: &'a EngineContext,
}

impl<'a> ThresholdLearner<'a> {
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    pub async fn samples(&self, pairs: &[EntailmentPair]) -> Result<Vec<Sample>> {
        let mut samples = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let distance = distance(self.ctx, &pair.text, &pair.hypothesis).await?;
            debug!(pair = %pair.id, distance, "Training distance");
            samples.push(Sample {
                distance,
                gold_yes: pair.gold_is_yes(),
            });
        }
        Ok(samples)
    }

    pub async fn train(&self, pairs: &[EntailmentPair]) -> Result<LearnedThreshold> {
        let samples = self.samples(pairs).await?;
        let learned = learn(&samples)?;
        info!(
            threshold = learned.threshold,
            f1 = format!("{:.2}", learned.f1),
            pairs = pairs.len(),
            "Threshold learned"
        );
        Ok(learned)
    }
}

/// Pick the threshold maximizing F1 over the observed distances
pub fn learn(samples: &[Sample]) -> Result<LearnedThreshold> {
    // pairs without a sentence on one side still count, but never set the threshold
    let mut candidates: Vec<f64> = samples
        .iter()
        .map(|s| s.distance)
        .filter(|d| d.is_finite())
        .collect();
    candidates.sort_by(f64::total_cmp);
    candidates.dedup();

    let mut best: Option<LearnedThreshold> = None;
    for candidate in candidates {
        let mut confusion = Confusion::default();
        for sample in samples {
            confusion.add(sample.distance < candidate, sample.gold_yes);
        }
        let f1 = confusion.f1();

        if best.map_or(true, |b| f1 > b.f1) {
            best = Some(LearnedThreshold {
                threshold: candidate,
                f1,
            });
        }
    }

    best.ok_or_else(|| {
        XteError::malformed("training set", None, "no pairs with a finite distance to learn from")
    })
}
