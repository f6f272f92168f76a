//! Inverse document frequency over a gloss corpus
//!
//! One gloss per line is one document. `idf(w) = ln(N / df(w))`; words the
//! corpus never mentions score [`MAX_IDF`].

use crate::errors::Result;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// IDF of words absent from the corpus, above any corpus value
pub const MAX_IDF: f64 = 15.0;

#[derive(Debug, Default, Clone)]
pub struct IdfTable {
    idfs: HashMap<String, f64>,
    documents: usize,
}

/// Corpus words: non-word characters except `-` and `'` split words
fn corpus_words(doc: &str) -> impl Iterator<Item = String> + '_ {
    doc.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '\''))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

impl IdfTable {
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a str>) -> Self {
        let mut frequencies: HashMap<String, usize> = HashMap::new();
        let mut count = 0usize;

        for doc in documents {
            count += 1;
            let distinct: HashSet<String> = corpus_words(doc).collect();
            for word in distinct {
                *frequencies.entry(word).or_default() += 1;
            }
        }

        let idfs = frequencies
            .into_iter()
            .map(|(word, df)| (word, (count as f64 / df as f64).ln()))
            .collect();

        Self {
            idfs,
            documents: count,
        }
    }

    /// Load a gloss corpus; a missing corpus scores every word [`MAX_IDF`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Gloss corpus not found, IDF gating disabled");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let table = Self::from_documents(content.lines());
        tracing::info!(path = %path.display(), documents = table.documents, "IDF table built");
        Ok(table)
    }

    pub fn idf(&self, word: &str) -> f64 {
        self.idfs.get(&word.to_lowercase()).copied().unwrap_or(MAX_IDF)
    }

    pub fn documents(&self) -> usize {
        self.documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_frequency() {
        let table = IdfTable::from_documents([
            "an act that causes damage",
            "the act of cleaning, cleaning again",
            "a city in Hungary",
            "damage to property",
        ]);

        assert_eq!(table.documents(), 4);
        assert!((table.idf("act") - (2.0f64).ln()).abs() < 1e-9);
        // counted once per document
        assert!((table.idf("cleaning") - (4.0f64).ln()).abs() < 1e-9);
        assert!((table.idf("Hungary") - (4.0f64).ln()).abs() < 1e-9);
        assert_eq!(table.idf("budapest"), MAX_IDF);
    }

    #[test]
    fn test_missing_corpus() {
        let table = IdfTable::load("/nonexistent/wn_gloss_corpus.txt").unwrap();
        assert_eq!(table.idf("anything"), MAX_IDF);
    }
}
