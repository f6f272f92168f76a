//! Text handler
//!
//! Facade over the annotator, the dictionary, stop words and IDF scores.
//! Every engine component reaches linguistic preprocessing through it.

use super::{
    AnnotatedSentence, Annotator, ConstituencyTree, IdfTable, Lexicon, Phrase, StopWords, Token,
    WordClass,
};
use crate::errors::Result;
use std::sync::Arc;

/// Minimum IDF for a noun to be informative
pub const MIN_NOUN_IDF: f64 = 4.0;

/// Minimum IDF for a verb to be informative
pub const MIN_VERB_IDF: f64 = 6.0;

/// Tags a single word must carry to be looked up as a dictionary entry
const OPEN_TAGS: &[&str] = &[
    "NN", "NNS", "NNP", "NNPS", "VB", "VBD", "VBG", "VBN", "VBP", "VBZ", "VBT", "FW",
];

fn is_verb_tag(tag: &str) -> bool {
    matches!(tag, "VB" | "VBD" | "VBG" | "VBN" | "VBP" | "VBZ" | "VBT")
}

/// Blank out non-word characters except dashes and apostrophes
pub fn clean_sentence(sentence: &str) -> String {
    let sentence = sentence.replace("''", "\"");
    let blanked: String = sentence
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect();
    blanked.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct TextHandler {
    annotator: Arc<dyn Annotator>,
    lexicon: Lexicon,
    stop_words: StopWords,
    idf: IdfTable,
}

impl TextHandler {
    pub fn new(
        annotator: Arc<dyn Annotator>,
        lexicon: Lexicon,
        stop_words: StopWords,
        idf: IdfTable,
    ) -> Self {
        Self {
            annotator,
            lexicon,
            stop_words,
            idf,
        }
    }

    /// Split a sentence into lowercase lemmas with their tags
    pub async fn tokenize(&self, sentence: &str) -> Result<Vec<Token>> {
        let cleaned = clean_sentence(sentence);
        let annotation = self.annotator.annotate(&cleaned).await?;

        Ok(annotation
            .tokens()
            .map(|t| Token::new(t.lemma.to_lowercase(), t.tag.clone()))
            .collect())
    }

    /// Surface words with their tags
    async fn tag(&self, sentence: &str) -> Result<Vec<(String, String)>> {
        let annotation = self.annotator.annotate(sentence).await?;
        Ok(annotation
            .tokens()
            .map(|t| (t.word.clone(), t.tag.clone()))
            .collect())
    }

    /// Split a sentence into phrases, each the longest dictionary entry
    /// ending where the previous one started. Phrases come back in sentence
    /// order.
    pub async fn split(&self, sentence: &str) -> Result<Vec<Phrase>> {
        let cleaned = clean_sentence(sentence);
        let tagged = self.tag(&cleaned).await?;

        let words: Vec<String> = tagged
            .iter()
            .filter(|(w, _)| !w.is_empty())
            .map(|(w, t)| self.normalize(w, t).to_lowercase())
            .collect();
        let tags: Vec<&str> = tagged
            .iter()
            .filter(|(w, _)| !w.is_empty())
            .map(|(_, t)| t.as_str())
            .collect();

        let mut chunks = Vec::new();
        let mut end = words.len();

        // Scan right to left. The whole remainder is tried first; the leftmost
        // word is dropped until a dictionary entry is found.
        while end > 0 {
            let mut start = 0;
            loop {
                let entry = words[start..end].join("_");

                if start + 1 == end {
                    let tag = tags[start];
                    if !OPEN_TAGS.contains(&tag) || is_verb_tag(tag) {
                        chunks.push(Phrase::new(entry, tag));
                        end -= 1;
                        break;
                    }
                }

                if let Some(class) = self.entry_class(&entry) {
                    chunks.push(Phrase::new(entry.replace('_', " "), class.coarse_tag()));
                    end = start;
                    break;
                }

                if start + 1 < end {
                    start += 1;
                } else {
                    chunks.push(Phrase::new(entry, tags[start]));
                    end -= 1;
                    break;
                }
            }
        }

        chunks.reverse();
        Ok(chunks)
    }

    /// First dictionary class holding the entry, in noun, verb, adjective, adverb order
    fn entry_class(&self, entry: &str) -> Option<WordClass> {
        WordClass::ALL
            .into_iter()
            .find(|class| !self.lexicon.find_stems(entry, *class).is_empty())
    }

    /// Base form of a word: drops `'s`, joins blanks with underscores and
    /// takes the first dictionary stem for the class of `tag`
    pub fn normalize(&self, word: &str, tag: &str) -> String {
        if word == "'s" {
            return word.to_string();
        }
        let word = word.replace("'s", "").replace(' ', "_");

        match WordClass::from_tag(tag) {
            Some(class) => self
                .lexicon
                .find_stems(&word, class)
                .into_iter()
                .next()
                .unwrap_or(word),
            None => word,
        }
    }

    /// Constituency trees, one per sentence
    pub async fn parse(&self, text: &str) -> Result<Vec<ConstituencyTree>> {
        let annotation = self.annotator.annotate(text).await?;
        annotation
            .sentences
            .iter()
            .map(|s| ConstituencyTree::parse(&s.parse))
            .collect()
    }

    /// Annotated sentences carrying basic dependencies
    pub async fn dependency_parses(&self, text: &str) -> Result<Vec<AnnotatedSentence>> {
        Ok(self.annotator.annotate(text).await?.sentences)
    }

    /// Strip what cannot matter for the decision: hypothesis words found in
    /// the text and hypothesis stop words. The text is only cleaned the same
    /// way when the hypothesis keeps something.
    pub async fn clean_pair(&self, text: &str, hypothesis: &str) -> Result<(Vec<Token>, Vec<Token>)> {
        let mut text_tokens = self.tokenize(text).await?;
        let mut hyp_tokens = self.tokenize(hypothesis).await?;

        let overlap: Vec<String> = hyp_tokens
            .iter()
            .filter(|h| text_tokens.iter().any(|t| t.lemma == h.lemma))
            .map(|h| h.lemma.clone())
            .collect();

        hyp_tokens.retain(|t| !overlap.contains(&t.lemma) && !self.is_stop_word(&t.lemma));

        if !hyp_tokens.is_empty() {
            text_tokens.retain(|t| !overlap.contains(&t.lemma) && !self.is_stop_word(&t.lemma));
        }

        Ok((text_tokens, hyp_tokens))
    }

    /// Drop nouns and verbs too common in the gloss corpus to be informative
    pub fn remove_low_idf(&self, phrases: Vec<Phrase>) -> Vec<Phrase> {
        phrases
            .into_iter()
            .filter(|p| {
                if p.tag.starts_with('N') {
                    self.idf.idf(&p.text) >= MIN_NOUN_IDF
                } else if p.tag.starts_with('V') {
                    self.idf.idf(&p.text) >= MIN_VERB_IDF
                } else {
                    true
                }
            })
            .collect()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }
}
