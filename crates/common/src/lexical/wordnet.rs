//! WordNet-style dictionary with morphological stemming
//!
//! Loads the lemma index (`index.noun`, `index.verb`, `index.adj`,
//! `index.adv`) and the exception lists (`noun.exc`, ...) of a WordNet
//! database directory. Stemming follows the morphy procedure: exception
//! bases, then the surface form, then suffix detachment rules, keeping only
//! forms the dictionary knows.

use super::{to_entry, WordClass};
use crate::errors::{Result, XteError};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Upper bound on component combinations tried for a collocation
const MAX_COLLOCATION_CANDIDATES: usize = 32;

const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

const VERB_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

const ADJECTIVE_RULES: &[(&str, &str)] = &[("er", ""), ("est", ""), ("er", "e"), ("est", "e")];

fn rules(class: WordClass) -> &'static [(&'static str, &'static str)] {
    match class {
        WordClass::Noun => NOUN_RULES,
        WordClass::Verb => VERB_RULES,
        WordClass::Adjective => ADJECTIVE_RULES,
        WordClass::Adverb => &[],
    }
}

#[derive(Debug, Default, Clone)]
pub struct Lexicon {
    lemmas: HashMap<WordClass, HashSet<String>>,
    exceptions: HashMap<WordClass, HashMap<String, Vec<String>>>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a WordNet database directory
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(XteError::NotFound {
                resource_type: "dictionary directory".to_string(),
                id: dir.display().to_string(),
            });
        }
        let mut lexicon = Self::new();

        for class in WordClass::ALL {
            let index = std::fs::read_to_string(dir.join(format!("index.{}", class.file_suffix())))?;
            for line in index.lines() {
                // License header lines are indented
                if line.starts_with(' ') || line.is_empty() {
                    continue;
                }
                if let Some(lemma) = line.split_whitespace().next() {
                    lexicon.add_lemma(lemma, class);
                }
            }

            let exc_path = dir.join(format!("{}.exc", class.file_suffix()));
            if exc_path.exists() {
                for line in std::fs::read_to_string(&exc_path)?.lines() {
                    let mut fields = line.split_whitespace();
                    if let Some(inflected) = fields.next() {
                        for base in fields {
                            lexicon.add_exception(class, inflected, base);
                        }
                    }
                }
            }
        }

        tracing::info!(
            path = %dir.display(),
            nouns = lexicon.len(WordClass::Noun),
            verbs = lexicon.len(WordClass::Verb),
            "Dictionary loaded"
        );
        Ok(lexicon)
    }

    pub fn add_lemma(&mut self, lemma: &str, class: WordClass) {
        self.lemmas.entry(class).or_default().insert(to_entry(lemma));
    }

    pub fn add_exception(&mut self, class: WordClass, inflected: &str, base: &str) {
        let bases = self
            .exceptions
            .entry(class)
            .or_default()
            .entry(to_entry(inflected))
            .or_default();
        let base = to_entry(base);
        if !bases.contains(&base) {
            bases.push(base);
        }
    }

    /// Builder form of [`Lexicon::add_lemma`]
    pub fn with_lemma(mut self, lemma: &str, class: WordClass) -> Self {
        self.add_lemma(lemma, class);
        self
    }

    pub fn with_exception(mut self, class: WordClass, inflected: &str, base: &str) -> Self {
        self.add_exception(class, inflected, base);
        self
    }

    pub fn len(&self, class: WordClass) -> usize {
        self.lemmas.get(&class).map(HashSet::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.values().all(HashSet::is_empty)
    }

    /// Whether the dictionary has an entry for `lemma` in `class`
    pub fn contains(&self, lemma: &str, class: WordClass) -> bool {
        self.lemmas
            .get(&class)
            .map(|set| set.contains(&to_entry(lemma)))
            .unwrap_or(false)
    }

    /// Dictionary base forms of `word` in `class`, most likely first.
    pub fn find_stems(&self, word: &str, class: WordClass) -> Vec<String> {
        let entry = to_entry(word);
        if entry.is_empty() {
            return Vec::new();
        }

        let mut stems = self.stems_of_entry(&entry, class);
        if stems.is_empty() && entry.contains('_') {
            stems = self.stems_of_collocation(&entry, class);
        }
        stems
    }

    fn stems_of_entry(&self, entry: &str, class: WordClass) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();

        if let Some(bases) = self.exceptions.get(&class).and_then(|m| m.get(entry)) {
            candidates.extend(bases.iter().cloned());
        }
        candidates.push(entry.to_string());
        candidates.extend(Self::detach(entry, class));

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|c| self.contains(c, class) && seen.insert(c.clone()))
            .collect()
    }

    /// Apply every suffix rule whose suffix matches
    fn detach(word: &str, class: WordClass) -> Vec<String> {
        rules(class)
            .iter()
            .filter(|(suffix, _)| word.len() >= suffix.len() && word.ends_with(suffix))
            .map(|(suffix, ending)| format!("{}{}", &word[..word.len() - suffix.len()], ending))
            .collect()
    }

    /// Stem each component of a collocation and keep the combinations the
    /// dictionary knows
    fn stems_of_collocation(&self, entry: &str, class: WordClass) -> Vec<String> {
        let mut combinations: Vec<String> = vec![String::new()];

        for part in entry.split('_') {
            let mut forms = vec![part.to_string()];
            for form in Self::detach(part, class) {
                if !forms.contains(&form) {
                    forms.push(form);
                }
            }
            if let Some(bases) = self.exceptions.get(&class).and_then(|m| m.get(part)) {
                forms.extend(bases.iter().filter(|b| !b.contains('_')).cloned());
            }

            let mut next = Vec::new();
            'outer: for prefix in &combinations {
                for form in &forms {
                    if next.len() >= MAX_COLLOCATION_CANDIDATES {
                        break 'outer;
                    }
                    next.push(if prefix.is_empty() {
                        form.clone()
                    } else {
                        format!("{}_{}", prefix, form)
                    });
                }
            }
            combinations = next;
        }

        let mut seen = HashSet::new();
        combinations
            .into_iter()
            .filter(|c| self.contains(c, class) && seen.insert(c.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon() -> Lexicon {
        Lexicon::new()
            .with_lemma("church", WordClass::Noun)
            .with_lemma("man", WordClass::Noun)
            .with_lemma("city", WordClass::Noun)
            .with_lemma("council worker", WordClass::Noun)
            .with_lemma("worker", WordClass::Noun)
            .with_lemma("clean", WordClass::Verb)
            .with_lemma("be", WordClass::Verb)
            .with_lemma("cause", WordClass::Verb)
            .with_lemma("big", WordClass::Adjective)
            .with_exception(WordClass::Verb, "was", "be")
            .with_exception(WordClass::Adjective, "bigger", "big")
    }

    #[test]
    fn test_noun_rules() {
        let lex = lexicon();
        assert_eq!(lex.find_stems("churches", WordClass::Noun), vec!["church"]);
        assert_eq!(lex.find_stems("men", WordClass::Noun), vec!["man"]);
        assert_eq!(lex.find_stems("cities", WordClass::Noun), vec!["city"]);
        assert_eq!(lex.find_stems("church", WordClass::Noun), vec!["church"]);
    }

    #[test]
    fn test_verb_rules_and_exceptions() {
        let lex = lexicon();
        assert_eq!(lex.find_stems("cleans", WordClass::Verb), vec!["clean"]);
        assert_eq!(lex.find_stems("causing", WordClass::Verb), vec!["cause"]);
        assert_eq!(lex.find_stems("caused", WordClass::Verb), vec!["cause"]);
        assert_eq!(lex.find_stems("was", WordClass::Verb), vec!["be"]);
        assert_eq!(lex.find_stems("bigger", WordClass::Adjective), vec!["big"]);
    }

    #[test]
    fn test_unknown_word_has_no_stems() {
        let lex = lexicon();
        assert!(lex.find_stems("budapest", WordClass::Noun).is_empty());
        assert!(lex.find_stems("", WordClass::Noun).is_empty());
    }

    #[test]
    fn test_collocations() {
        let lex = lexicon();
        assert!(lex.contains("council worker", WordClass::Noun));
        assert_eq!(lex.find_stems("council_workers", WordClass::Noun), vec!["council_worker"]);
    }

    #[test]
    fn test_load_database_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.noun"),
            "  1 This software and database is being provided\nviolence n 2 1 @ 2 0 00965035\ndamage n 1 1 @ 1 0 07296428\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("index.verb"), "clean v 1 1 @ 1 0 00035758\n").unwrap();
        std::fs::write(dir.path().join("index.adj"), "").unwrap();
        std::fs::write(dir.path().join("index.adv"), "").unwrap();
        std::fs::write(dir.path().join("verb.exc"), "cleant clean\n").unwrap();

        let lex = Lexicon::load(dir.path()).unwrap();
        assert!(lex.contains("violence", WordClass::Noun));
        assert!(!lex.contains("1", WordClass::Noun));
        assert_eq!(lex.len(WordClass::Noun), 2);
        assert_eq!(lex.find_stems("cleant", WordClass::Verb), vec!["clean"]);
    }

    #[test]
    fn test_missing_database_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Lexicon::load(dir.path().join("dict")).unwrap_err();
        assert!(matches!(err, XteError::NotFound { .. }), "{}", err);
    }
}
