//! Lexical resources
//!
//! Everything the engine needs to turn raw sentences into comparable units:
//! - Annotation (tokens, lemmas, Penn tags, constituency and dependency parses)
//! - WordNet-style dictionary with morphological stemming
//! - Stop words, synonym/hypernym/antonym tables and IDF scores
//! - The [`TextHandler`] facade combining them

pub mod annotator;
pub mod handler;
pub mod idf;
pub mod syntax;
pub mod tables;
pub mod wordnet;

pub use annotator::{
    AnnotatedSentence, AnnotatedToken, Annotation, Annotator, CoreNlpClient, DependencyEdge,
    MockAnnotator,
};
pub use handler::TextHandler;
pub use idf::IdfTable;
pub use syntax::ConstituencyTree;
pub use tables::{AntonymTable, HypernymTable, LexicalTables, StopWords, SynonymTable};
pub use wordnet::Lexicon;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A lemmatized token with its Penn Treebank tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub lemma: String,
    pub tag: String,
}

impl Token {
    pub fn new(lemma: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            tag: tag.into(),
        }
    }
}

/// A dictionary-aligned chunk of a sentence, possibly multi-word
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phrase {
    /// Surface text with blanks between words
    pub text: String,
    pub tag: String,
}

impl Phrase {
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.text, self.tag)
    }
}

/// Dictionary word classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordClass {
    Noun,
    Verb,
    Adjective,
    Adverb,
}

impl WordClass {
    pub const ALL: [WordClass; 4] = [
        WordClass::Noun,
        WordClass::Verb,
        WordClass::Adjective,
        WordClass::Adverb,
    ];

    /// Class of a Penn tag, if it names an open class
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.starts_with("NN") {
            Some(WordClass::Noun)
        } else if tag.starts_with("VB") {
            Some(WordClass::Verb)
        } else if tag.starts_with("JJ") {
            Some(WordClass::Adjective)
        } else if tag.starts_with("RB") {
            Some(WordClass::Adverb)
        } else {
            None
        }
    }

    /// Class named in lexical table files (`noun`, `verb`, `adjective`, `adverb`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "noun" => Some(WordClass::Noun),
            "verb" => Some(WordClass::Verb),
            "adjective" | "adj" => Some(WordClass::Adjective),
            "adverb" | "adv" => Some(WordClass::Adverb),
            _ => None,
        }
    }

    /// Coarse Penn tag used when a phrase is tagged by dictionary class
    pub fn coarse_tag(&self) -> &'static str {
        match self {
            WordClass::Noun => "NN",
            WordClass::Verb => "VB",
            WordClass::Adjective => "JJ",
            WordClass::Adverb => "RB",
        }
    }

    /// Suffix of the WordNet database files for this class
    pub fn file_suffix(&self) -> &'static str {
        match self {
            WordClass::Noun => "noun",
            WordClass::Verb => "verb",
            WordClass::Adjective => "adj",
            WordClass::Adverb => "adv",
        }
    }
}

/// Lowercase, underscores for blanks
pub fn to_entry(word: &str) -> String {
    word.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

/// Blanks for underscores
pub fn to_surface(entry: &str) -> String {
    entry.replace('_', " ")
}

/// Join words with single blanks
pub fn join_words<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Upper-case the first character
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn starts_with_vowel(word: &str) -> bool {
    matches!(
        word.chars().next(),
        Some('a' | 'e' | 'i' | 'o' | 'u' | 'A' | 'E' | 'I' | 'O' | 'U')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_class_from_tag() {
        assert_eq!(WordClass::from_tag("NNP"), Some(WordClass::Noun));
        assert_eq!(WordClass::from_tag("VBZ"), Some(WordClass::Verb));
        assert_eq!(WordClass::from_tag("JJR"), Some(WordClass::Adjective));
        assert_eq!(WordClass::from_tag("RB"), Some(WordClass::Adverb));
        assert_eq!(WordClass::from_tag("DT"), None);
    }

    #[test]
    fn test_entry_and_surface_forms() {
        assert_eq!(to_entry("Council  Worker"), "council_worker");
        assert_eq!(to_surface("council_worker"), "council worker");
        assert_eq!(join_words(&["there", "be", "no"]), "there be no");
    }

    #[test]
    fn test_capitalize_and_vowels() {
        assert_eq!(capitalize("violence"), "Violence");
        assert_eq!(capitalize(""), "");
        assert!(starts_with_vowel("act"));
        assert!(!starts_with_vowel("violence"));
        assert!(!starts_with_vowel(""));
    }
}
