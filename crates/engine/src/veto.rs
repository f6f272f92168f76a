//! Context veto
//!
//! Four independent heuristics that rule out entailment before any model
//! runs: a bare negation, an antonym pair, more clauses in the hypothesis
//! than the text supports, and a hypothesis that specializes a concept the
//! text only states generically.

use crate::context::EngineContext;
use crate::decision::Decision;
use std::fmt;
use tracing::{debug, info};
use xte_common::{
    lexical::{join_words, Phrase, TextHandler, WordClass},
    metrics, Result,
};

/// Leftovers that amount to a bare negation
const NEGATIONS: &[&str] = &[
    "not",
    "there no",
    "there not",
    "do not",
    "there be no",
    "there be not",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetoTest {
    Negation,
    Opposition,
    ClauseOverflow,
    InverseSpecialization,
}

impl VetoTest {
    pub fn as_str(&self) -> &'static str {
        match self {
            VetoTest::Negation => "negation",
            VetoTest::Opposition => "opposition",
            VetoTest::ClauseOverflow => "clause_overflow",
            VetoTest::InverseSpecialization => "inverse_specialization",
        }
    }
}

impl fmt::Display for VetoTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_negation(words: &[String]) -> bool {
    if words.is_empty() {
        return false;
    }
    let joined = join_words(words);
    NEGATIONS
        .iter()
        .any(|n| n.split(' ').count() == words.len() && joined.eq_ignore_ascii_case(n))
}

/// Lemmas of both sides with the hypothesis words found in the text removed
/// from each
async fn leftovers(handler: &TextHandler, text: &str, hypothesis: &str) -> Result<(Vec<String>, Vec<String>)> {
    let mut text_words: Vec<String> = handler.tokenize(text).await?.into_iter().map(|t| t.lemma).collect();
    let mut hyp_words: Vec<String> = handler
        .tokenize(hypothesis)
        .await?
        .into_iter()
        .map(|t| t.lemma)
        .collect();

    let overlap: Vec<String> = hyp_words
        .iter()
        .filter(|h| text_words.contains(h))
        .cloned()
        .collect();
    text_words.retain(|w| !overlap.contains(w));
    hyp_words.retain(|w| !overlap.contains(w));

    Ok((text_words, hyp_words))
}

pub struct ContextVeto<'a> {
    ctx: &'a EngineContext,
}

impl<'a> ContextVeto<'a> {
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// `No` when any test fires, `Pending` otherwise
    pub async fn check(&self, text: &str, hypothesis: &str) -> Result<Decision> {
        match self.first_failing_test(text, hypothesis).await? {
            Some(test) => {
                info!(test = %test, "Context veto fired");
                metrics::record_veto(test.as_str());
                Ok(Decision::No)
            }
            None => Ok(Decision::Pending),
        }
    }

    /// Tests run in order and stop at the first that fires
    pub async fn first_failing_test(&self, text: &str, hypothesis: &str) -> Result<Option<VetoTest>> {
        if self.is_negation(text, hypothesis).await? {
            return Ok(Some(VetoTest::Negation));
        }
        if self.is_opposition(text, hypothesis).await? {
            return Ok(Some(VetoTest::Opposition));
        }
        if self.has_clause_overflow(text, hypothesis).await? {
            return Ok(Some(VetoTest::ClauseOverflow));
        }
        if self.has_inverse_specialization(text, hypothesis).await? {
            return Ok(Some(VetoTest::InverseSpecialization));
        }
        Ok(None)
    }

    /// The only text words the hypothesis lacks form a negation, or the text
    /// is fully covered and the only hypothesis leftovers form one
    pub async fn is_negation(&self, text: &str, hypothesis: &str) -> Result<bool> {
        let (text_words, hyp_words) = leftovers(&self.ctx.handler, text, hypothesis).await?;

        Ok(is_negation(&text_words) || (text_words.is_empty() && is_negation(&hyp_words)))
    }

    /// An antonym of a leftover text word appears in the leftover hypothesis
    pub async fn is_opposition(&self, text: &str, hypothesis: &str) -> Result<bool> {
        let (text_words, hyp_words) = leftovers(&self.ctx.handler, text, hypothesis).await?;
        let hyp_string = join_words(&hyp_words);

        // Searched as a string so multi-word antonyms match
        Ok(text_words.iter().any(|word| {
            self.ctx
                .tables
                .antonyms
                .antonyms(word)
                .iter()
                .any(|antonym| hyp_string.contains(antonym.as_str()))
        }))
    }

    /// Every content word of the text also appears in the hypothesis
    pub async fn is_total_overlap(&self, text: &str, hypothesis: &str) -> Result<bool> {
        let handler = &self.ctx.handler;
        let text_words: Vec<String> = handler
            .tokenize(text)
            .await?
            .into_iter()
            .map(|t| t.lemma)
            .filter(|w| !handler.is_stop_word(w))
            .collect();
        let hyp_words: Vec<String> = handler
            .tokenize(hypothesis)
            .await?
            .into_iter()
            .map(|t| t.lemma)
            .filter(|w| !handler.is_stop_word(w))
            .collect();

        let covered: Vec<&String> = text_words.iter().filter(|w| hyp_words.contains(w)).collect();
        Ok(covered.len() == text_words.len())
    }

    /// The hypothesis has more coordinated or subordinate clauses than the text
    pub async fn has_clause_overflow(&self, text: &str, hypothesis: &str) -> Result<bool> {
        let handler = &self.ctx.handler;
        let text_clauses = handler
            .parse(text)
            .await?
            .first()
            .map(|t| t.clause_count())
            .unwrap_or(0);
        let hyp_clauses = handler
            .parse(hypothesis)
            .await?
            .first()
            .map(|t| t.clause_count())
            .unwrap_or(0);

        debug!(text_clauses, hyp_clauses, "Clause counts");
        if hyp_clauses <= text_clauses {
            return Ok(false);
        }
        Ok(!self.is_total_overlap(text, hypothesis).await?)
    }

    /// A hypothesis phrase has a remaining text phrase among its hypernyms
    pub async fn has_inverse_specialization(&self, text: &str, hypothesis: &str) -> Result<bool> {
        if self.is_total_overlap(text, hypothesis).await? {
            return Ok(false);
        }

        let handler = &self.ctx.handler;
        let mut text_phrases = handler.split(text).await?;
        let mut hyp_phrases = handler.split(hypothesis).await?;

        let overlap: Vec<Phrase> = text_phrases
            .iter()
            .filter(|p| hyp_phrases.contains(p))
            .cloned()
            .collect();
        text_phrases.retain(|p| !overlap.contains(p));
        hyp_phrases.retain(|p| !overlap.contains(p));

        let text_words: Vec<&str> = text_phrases.iter().map(|p| p.text.as_str()).collect();
        let tables = &self.ctx.tables;

        Ok(hyp_phrases.iter().any(|phrase| {
            let class = if phrase.tag.starts_with("NN") {
                WordClass::Noun
            } else {
                WordClass::Verb
            };
            tables.hypernyms.hypernyms(&phrase.text, class).iter().any(|hypernym| {
                text_words.contains(&hypernym.as_str())
                    && !tables.synonyms.are_synonyms_any(&phrase.text, hypernym)
                    && hypernym != "be"
            })
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{budapest_annotator, budapest_context_with, Fixture, HYPOTHESIS, TEXT};
    use xte_common::lexical::{AntonymTable, HypernymTable, LexicalTables};

    #[test]
    fn test_negation_patterns() {
        let words = |s: &str| s.split(' ').map(String::from).collect::<Vec<_>>();
        assert!(is_negation(&words("not")));
        assert!(is_negation(&words("There be no")));
        assert!(is_negation(&words("do not")));
        assert!(!is_negation(&words("not happy")));
        assert!(!is_negation(&[]));
    }

    #[tokio::test]
    async fn test_no_test_fires_on_budapest_pair() {
        let ctx = budapest_context_with(Fixture::default());
        let veto = ContextVeto::new(&ctx);
        assert_eq!(veto.first_failing_test(TEXT, HYPOTHESIS).await.unwrap(), None);
        assert_eq!(veto.check(TEXT, HYPOTHESIS).await.unwrap(), Decision::Pending);
    }

    #[tokio::test]
    async fn test_negated_text() {
        let ctx = budapest_context_with(Fixture::default());
        let veto = ContextVeto::new(&ctx);
        assert!(veto
            .is_negation("The worker did not clean.", "The worker cleaned.")
            .await
            .unwrap());
        assert!(veto
            .is_negation("The worker cleaned.", "The worker did not clean.")
            .await
            .unwrap());
        assert_eq!(
            veto.check("The worker did not clean.", "The worker cleaned.")
                .await
                .unwrap(),
            Decision::No
        );
    }

    #[tokio::test]
    async fn test_opposition() {
        let tables = Fixture {
            lexical: LexicalTables {
                antonyms: AntonymTable::default().with_pair("win", "lose"),
                ..Default::default()
            },
            ..Default::default()
        };
        let ctx = budapest_context_with(tables);
        let veto = ContextVeto::new(&ctx);
        assert!(veto.is_opposition("The team win.", "The team lose.").await.unwrap());
        assert!(!veto.is_opposition("The team win.", "The team play.").await.unwrap());
    }

    #[tokio::test]
    async fn test_clause_overflow() {
        let annotator = budapest_annotator()
            .with_parse(
                "The council worker cleans.",
                "(ROOT (S (NP (DT The) (NN council) (NN worker)) (VP (VBZ cleans)) (. .)))",
            )
            .with_parse(
                "The worker cleans and the city burns.",
                "(ROOT (S (S (NP (DT The) (NN worker)) (VP (VBZ cleans))) (CC and) (S (NP (DT the) (NN city)) (VP (VBZ burns))) (. .)))",
            );
        let ctx = budapest_context_with(Fixture {
            annotator: Some(annotator),
            ..Default::default()
        });
        let veto = ContextVeto::new(&ctx);

        assert!(veto
            .has_clause_overflow("The council worker cleans.", "The worker cleans and the city burns.")
            .await
            .unwrap());
        assert!(!veto
            .has_clause_overflow("The worker cleans and the city burns.", "The council worker cleans.")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_inverse_specialization() {
        let tables = Fixture {
            lexical: LexicalTables {
                hypernyms: HypernymTable::default().with_entry(&["violence"], &["act"], WordClass::Noun),
                ..Default::default()
            },
            ..Default::default()
        };
        let ctx = budapest_context_with(tables);
        let veto = ContextVeto::new(&ctx);

        assert!(veto
            .has_inverse_specialization("An act in Budapest.", "Violence in Budapest.")
            .await
            .unwrap());
        // the generic statement follows from the specific one
        assert!(!veto
            .has_inverse_specialization("Violence in Budapest.", "An act in Budapest.")
            .await
            .unwrap());
    }
}
