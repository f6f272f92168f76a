//! Candidate pair selection
//!
//! Cleaned tokens are mapped back to the dictionary phrases they belong to.
//! Every text phrase is then scored against every hypothesis phrase and the
//! most related combinations become (source, target) pairs for the path
//! search.

use crate::context::EngineContext;
use crate::navigation::ranking::align;
use tracing::debug;
use xte_common::{
    lexical::{to_surface, Phrase, TextHandler, Token},
    similarity::scores_or_empty,
    Result,
};

/// Candidate pairs handed to the graph navigation model
pub const MAX_CANDIDATES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePair {
    pub source: String,
    pub source_tag: String,
    pub target: String,
    pub target_tag: String,
    pub score: f64,
}

/// Phrases holding the cleaned tokens, tagged with the token's tag
fn match_phrases(handler: &TextHandler, tokens: &[Token], phrases: &[Phrase]) -> Vec<Phrase> {
    let mut matched: Vec<Phrase> = Vec::new();
    for token in tokens {
        let base = to_surface(&handler.normalize(&token.lemma, &token.tag)).to_lowercase();
        let phrase = phrases
            .iter()
            .find(|p| p.text.starts_with(&base) || p.text.ends_with(&base));

        if let Some(phrase) = phrase {
            if !matched.iter().any(|m| m.text == phrase.text) {
                matched.push(Phrase::new(phrase.text.clone(), token.tag.clone()));
            }
        }
    }
    matched
}

/// The most related text × hypothesis phrase combinations, best first
pub async fn candidate_pairs(
    ctx: &EngineContext,
    text: &str,
    hypothesis: &str,
) -> Result<Vec<CandidatePair>> {
    let handler = &ctx.handler;
    let (text_tokens, hyp_tokens) = handler.clean_pair(text, hypothesis).await?;

    let sources = match_phrases(handler, &text_tokens, &handler.split(text).await?);
    let targets = match_phrases(handler, &hyp_tokens, &handler.split(hypothesis).await?);
    let target_texts: Vec<String> = targets.iter().map(|p| p.text.clone()).collect();

    let mut pairs = Vec::with_capacity(sources.len() * targets.len());
    if !target_texts.is_empty() {
        for source in &sources {
            let scored = scores_or_empty(ctx.scorer.as_ref(), &source.text, &target_texts).await;
            for (index, score) in align(&target_texts, scored) {
                pairs.push(CandidatePair {
                    source: source.text.clone(),
                    source_tag: source.tag.clone(),
                    target: targets[index].text.clone(),
                    target_tag: targets[index].tag.clone(),
                    score,
                });
            }
        }
    }

    pairs.sort_by(|a, b| b.score.abs().total_cmp(&a.score.abs()));
    pairs.truncate(MAX_CANDIDATES);

    debug!(
        sources = sources.len(),
        targets = targets.len(),
        kept = pairs.len(),
        "Candidate pairs selected"
    );
    Ok(pairs)
}
