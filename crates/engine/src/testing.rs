//! Shared test fixture: the Budapest pair with a pinned vocabulary,
//! dictionary, graph and relatedness table

use crate::context::EngineContext;
use std::sync::Arc;
use xte_common::{
    graph::{definition::RoleRecord, DefinitionGraph},
    lexical::{IdfTable, LexicalTables, Lexicon, MockAnnotator, StopWords, TextHandler, WordClass},
    similarity::MockScorer,
};

pub(crate) const TEXT: &str = "A council worker cleans up after Tuesday's violence in Budapest.";
pub(crate) const HYPOTHESIS: &str = "There was damage in Budapest.";

pub(crate) fn budapest_annotator() -> MockAnnotator {
    MockAnnotator::new()
        .with_word("a", "a", "DT")
        .with_word("an", "an", "DT")
        .with_word("the", "the", "DT")
        .with_word("cleans", "clean", "VBZ")
        .with_word("cleaned", "clean", "VBD")
        .with_word("up", "up", "RP")
        .with_word("after", "after", "IN")
        .with_word("in", "in", "IN")
        .with_word("there", "there", "EX")
        .with_word("was", "be", "VBD")
        .with_word("did", "do", "VBD")
        .with_word("not", "not", "RB")
        .with_word("and", "and", "CC")
        .with_word("that", "that", "WDT")
        .with_word("causes", "cause", "VBZ")
        .with_word("burns", "burn", "VBZ")
}

pub(crate) fn budapest_lexicon() -> Lexicon {
    let mut lexicon = Lexicon::new().with_exception(WordClass::Verb, "was", "be");
    for noun in [
        "council worker",
        "council",
        "worker",
        "violence",
        "damage",
        "tuesday",
        "act",
        "city",
        "team",
    ] {
        lexicon.add_lemma(noun, WordClass::Noun);
    }
    for verb in ["clean", "be", "cause", "do", "burn"] {
        lexicon.add_lemma(verb, WordClass::Verb);
    }
    lexicon
}

pub(crate) fn budapest_graph() -> DefinitionGraph {
    DefinitionGraph::new().with_synset(
        "noun",
        &["violence"],
        &["act"],
        vec![RoleRecord::literal("act", "has_diff_qual", "that causes damage")],
    )
}

pub(crate) fn budapest_scorer() -> MockScorer {
    MockScorer::new()
        .with_score("violence", "damage", 0.6)
        .with_score("clean", "damage", 0.2)
        .with_score("council worker", "damage", 0.1)
        .with_score("tuesday", "damage", 0.05)
        .with_score("damage", "act", 0.1)
        .with_score("damage", "that causes damage", 0.7)
        .with_score("damage", "cause", 0.3)
        .with_score("damage", "damage", 1.0)
}

/// Overrides for [`budapest_context_with`]
pub(crate) struct Fixture {
    pub annotator: Option<MockAnnotator>,
    pub lexical: LexicalTables,
    pub graph: Option<DefinitionGraph>,
    pub scorer: Option<MockScorer>,
    pub threshold: Option<f64>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            annotator: None,
            lexical: LexicalTables::default(),
            graph: None,
            scorer: None,
            threshold: Some(50.0),
        }
    }
}

pub(crate) fn budapest_handler(annotator: MockAnnotator) -> TextHandler {
    let stop_words = StopWords::parse("a\nan\nthe\nup\nafter\nin\nthere\nbe\n's\nthat\n");
    TextHandler::new(Arc::new(annotator), budapest_lexicon(), stop_words, IdfTable::default())
}

pub(crate) fn budapest_context_with(fixture: Fixture) -> EngineContext {
    let handler = budapest_handler(fixture.annotator.unwrap_or_else(budapest_annotator));
    let graph = Arc::new(fixture.graph.unwrap_or_else(budapest_graph));
    let scorer = Arc::new(fixture.scorer.unwrap_or_else(budapest_scorer));

    let mut ctx = EngineContext::new(handler, fixture.lexical, graph, scorer);
    ctx.threshold = fixture.threshold;
    ctx
}

pub(crate) fn budapest_context() -> EngineContext {
    budapest_context_with(Fixture::default())
}
