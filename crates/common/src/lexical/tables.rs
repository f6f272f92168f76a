//! Lexical tables: stop words, synonyms, hypernyms and antonyms
//!
//! File formats (one entry per line):
//! - `stop_words.txt`: a word
//! - `synonyms.txt`: `pos|w1, w2, ...`
//! - `hypernyms.txt`: `pos|synset words|hypernyms`
//! - `antonyms.txt`: `word|a1, a2, ...`, registered in both directions

use super::WordClass;
use crate::errors::{Result, XteError};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Lookup key: lowercase with blanks between words
fn key(word: &str) -> String {
    word.trim().to_lowercase().replace('_', " ")
}

/// Read a table file; a missing file yields an empty table
fn read_optional(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Lexical table not found, using an empty table");
            Ok(String::new())
        }
        Err(e) => Err(e.into()),
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[derive(Debug, Default, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    pub fn parse(content: &str) -> Self {
        Self {
            words: content
                .lines()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Synonyms by word and class. A word is never its own synonym.
#[derive(Debug, Default, Clone)]
pub struct SynonymTable {
    synonyms: HashMap<(String, WordClass), Vec<String>>,
}

impl SynonymTable {
    pub fn parse(content: &str) -> Result<Self> {
        let mut table = Self::default();

        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (pos, words) = line.split_once('|').ok_or_else(|| {
                XteError::malformed("synonyms.txt", Some(number + 1), "expected 'pos|words'")
            })?;
            let class = WordClass::from_name(pos).ok_or_else(|| {
                XteError::malformed("synonyms.txt", Some(number + 1), format!("invalid pos '{}'", pos))
            })?;
            let words: Vec<&str> = words.split(", ").collect();
            table.add_group(&words, class);
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&read_optional(path.as_ref())?)
    }

    /// Register every word of a group as synonym of the others
    pub fn add_group(&mut self, words: &[&str], class: WordClass) {
        if words.len() < 2 {
            return;
        }
        for word in words {
            let entry = self.synonyms.entry((key(word), class)).or_default();
            for other in words {
                if key(other) != key(word) {
                    push_unique(entry, key(other));
                }
            }
        }
    }

    pub fn with_group(mut self, words: &[&str], class: WordClass) -> Self {
        self.add_group(words, class);
        self
    }

    pub fn synonyms(&self, word: &str, class: WordClass) -> &[String] {
        self.synonyms
            .get(&(key(word), class))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `b` is listed as synonym of `a` under the class of `tag`
    pub fn are_synonyms(&self, a: &str, b: &str, tag: &str) -> bool {
        match WordClass::from_tag(tag) {
            Some(class) => self.synonyms(a, class).contains(&key(b)),
            None => false,
        }
    }

    /// Whether `b` is a synonym of `a` as a noun or as a verb
    pub fn are_synonyms_any(&self, a: &str, b: &str) -> bool {
        let b = key(b);
        self.synonyms(a, WordClass::Noun).contains(&b) || self.synonyms(a, WordClass::Verb).contains(&b)
    }
}

/// Hypernyms by word and class (nouns and verbs)
#[derive(Debug, Default, Clone)]
pub struct HypernymTable {
    hypernyms: HashMap<(String, WordClass), Vec<String>>,
}

impl HypernymTable {
    pub fn parse(content: &str) -> Result<Self> {
        let mut table = Self::default();

        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('|').collect();
            if fields.len() < 3 {
                return Err(XteError::malformed(
                    "hypernyms.txt",
                    Some(number + 1),
                    "expected 'pos|synset words|hypernyms'",
                ));
            }
            let class = if fields[0].trim() == "noun" { WordClass::Noun } else { WordClass::Verb };
            let synset: Vec<&str> = fields[1].split(", ").collect();
            let hypernyms: Vec<&str> = fields[2].split(", ").collect();
            table.add(&synset, &hypernyms, class);
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&read_optional(path.as_ref())?)
    }

    pub fn add(&mut self, synset: &[&str], hypernyms: &[&str], class: WordClass) {
        for word in synset {
            let entry = self.hypernyms.entry((key(word), class)).or_default();
            for hypernym in hypernyms {
                push_unique(entry, key(hypernym));
            }
        }
    }

    pub fn with_entry(mut self, synset: &[&str], hypernyms: &[&str], class: WordClass) -> Self {
        self.add(synset, hypernyms, class);
        self
    }

    /// Hypernyms of `word`; only nouns and verbs are tabled
    pub fn hypernyms(&self, word: &str, class: WordClass) -> &[String] {
        self.hypernyms
            .get(&(key(word), class))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Antonyms, symmetric
#[derive(Debug, Default, Clone)]
pub struct AntonymTable {
    antonyms: HashMap<String, Vec<String>>,
}

impl AntonymTable {
    pub fn parse(content: &str) -> Result<Self> {
        let mut table = Self::default();

        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (word, antonyms) = line.split_once('|').ok_or_else(|| {
                XteError::malformed("antonyms.txt", Some(number + 1), "expected 'word|antonyms'")
            })?;
            for antonym in antonyms.split(", ").filter(|a| !a.trim().is_empty()) {
                table.add(word, antonym);
            }
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&read_optional(path.as_ref())?)
    }

    pub fn add(&mut self, word: &str, antonym: &str) {
        push_unique(self.antonyms.entry(key(word)).or_default(), key(antonym));
        push_unique(self.antonyms.entry(key(antonym)).or_default(), key(word));
    }

    pub fn with_pair(mut self, word: &str, antonym: &str) -> Self {
        self.add(word, antonym);
        self
    }

    pub fn antonyms(&self, word: &str) -> &[String] {
        self.antonyms.get(&key(word)).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Every lexical table, loaded once from the resources directory
#[derive(Debug, Default, Clone)]
pub struct LexicalTables {
    pub synonyms: SynonymTable,
    pub hypernyms: HypernymTable,
    pub antonyms: AntonymTable,
}

impl LexicalTables {
    pub fn load(resources_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = resources_dir.as_ref();
        let tables = Self {
            synonyms: SynonymTable::load(dir.join("synonyms.txt"))?,
            hypernyms: HypernymTable::load(dir.join("hypernyms.txt"))?,
            antonyms: AntonymTable::load(dir.join("antonyms.txt"))?,
        };
        tracing::info!(path = %dir.display(), "Lexical tables loaded");
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words() {
        let stop = StopWords::parse("a\nthe\n\nThere\n");
        assert_eq!(stop.len(), 3);
        assert!(stop.contains("The"));
        assert!(stop.contains("there"));
        assert!(!stop.contains("damage"));
    }

    #[test]
    fn test_synonym_groups() {
        let table = SynonymTable::parse("noun|car, auto, automobile\nverb|buy, purchase\nnoun|lonely\n").unwrap();
        assert_eq!(table.synonyms("car", WordClass::Noun), &["auto", "automobile"]);
        assert!(table.are_synonyms("purchase", "buy", "VBZ"));
        assert!(!table.are_synonyms("purchase", "buy", "NN"));
        assert!(table.are_synonyms_any("auto", "car"));
        assert!(table.synonyms("lonely", WordClass::Noun).is_empty());
    }

    #[test]
    fn test_synonym_invalid_pos() {
        let err = SynonymTable::parse("noun|a, b\nthing|c, d\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_hypernyms_merge_and_normalize() {
        let table = HypernymTable::parse(
            "noun|poodle, poodle dog|dog, domestic dog\nnoun|poodle|dog, canine\nverb|sprint|run\n",
        )
        .unwrap();
        assert_eq!(
            table.hypernyms("poodle", WordClass::Noun),
            &["dog", "domestic dog", "canine"]
        );
        assert_eq!(table.hypernyms("poodle_dog", WordClass::Noun), &["dog", "domestic dog"]);
        assert_eq!(table.hypernyms("sprint", WordClass::Verb), &["run"]);
    }

    #[test]
    fn test_antonyms_are_symmetric() {
        let table = AntonymTable::parse("win|lose, be defeated\n").unwrap();
        assert_eq!(table.antonyms("win"), &["lose", "be defeated"]);
        assert_eq!(table.antonyms("lose"), &["win"]);
        assert_eq!(table.antonyms("be_defeated"), &["win"]);
    }

    #[test]
    fn test_missing_tables_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let tables = LexicalTables::load(dir.path()).unwrap();
        assert!(tables.antonyms.antonyms("win").is_empty());
    }
}
