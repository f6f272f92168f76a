//! Relatedness ranking of candidate terms against a target
//!
//! Service responses come back in any order. They are aligned to the
//! candidate order first, so that the stable sort on absolute score breaks
//! ties by candidate position.

use crate::context::EngineContext;
use tracing::debug;
use xte_common::{
    lexical::Phrase,
    similarity::{scores_or_empty, ScoredPair, SimilarityScorer},
};

/// Most related head words kept from a role text
pub const MAX_HEAD_WORDS: usize = 5;

/// Pair each candidate with its score, in candidate order. Candidates the
/// service left unscored are dropped.
pub fn align(candidates: &[String], pairs: Vec<ScoredPair>) -> Vec<(usize, f64)> {
    let mut remaining: Vec<Option<ScoredPair>> = pairs.into_iter().map(Some).collect();
    let mut aligned = Vec::with_capacity(candidates.len());

    for (index, candidate) in candidates.iter().enumerate() {
        let slot = remaining
            .iter_mut()
            .find(|p| p.as_ref().map(|p| &p.term2 == candidate).unwrap_or(false));
        if let Some(pair) = slot.and_then(Option::take) {
            aligned.push((index, pair.score));
        }
    }
    aligned
}

/// Candidate indices with scores, most related first
pub async fn rank(
    scorer: &dyn SimilarityScorer,
    target: &str,
    candidates: &[String],
) -> Vec<(usize, f64)> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let mut ranked = align(candidates, scores_or_empty(scorer, target, candidates).await);
    ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    ranked
}

/// Score below the largest drop between consecutive ranked scores; zero
/// when scores never drop
fn gap_threshold(ranked: &[(usize, f64)]) -> f64 {
    let mut max_gap = 0.0;
    let mut bottom = 0.0;
    for window in ranked.windows(2) {
        let gap = window[0].1.abs() - window[1].1.abs();
        if gap > max_gap {
            max_gap = gap;
            bottom = window[1].1.abs();
        }
    }
    bottom
}

/// Candidates scoring at or above the largest-gap cut, most related first,
/// or least related first when `ascending`
pub async fn best_matches(
    scorer: &dyn SimilarityScorer,
    target: &str,
    candidates: &[String],
    ascending: bool,
) -> Vec<String> {
    let ranked = rank(scorer, target, candidates).await;
    let threshold = gap_threshold(&ranked);

    let mut best: Vec<String> = ranked
        .iter()
        .filter(|(_, score)| score.abs() >= threshold)
        .map(|(i, _)| candidates[*i].clone())
        .collect();
    if best.is_empty() {
        if let Some((i, _)) = ranked.first() {
            best.push(candidates[*i].clone());
        }
    }
    if ascending {
        best.reverse();
    }

    debug!(term = target, candidates = candidates.len(), kept = best.len(), threshold, "Best matches");
    best
}

/// Words of a role text worth following: stop words and uninformative
/// words removed, then the most related to `target`
pub async fn head_words(
    ctx: &EngineContext,
    phrases: Vec<Phrase>,
    target: &str,
    ascending: bool,
) -> Vec<Phrase> {
    let handler = &ctx.handler;
    let phrases: Vec<Phrase> = phrases
        .into_iter()
        .filter(|p| !handler.is_stop_word(&p.text))
        .collect();
    let phrases = handler.remove_low_idf(phrases);

    let texts: Vec<String> = phrases.iter().map(|p| p.text.clone()).collect();
    let mut heads: Vec<Phrase> = rank(ctx.scorer.as_ref(), target, &texts)
        .await
        .into_iter()
        .take(MAX_HEAD_WORDS)
        .map(|(i, _)| phrases[i].clone())
        .collect();
    if ascending {
        heads.reverse();
    }
    heads
}
