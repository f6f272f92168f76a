//! Linguistic annotation
//!
//! Provides a unified interface over annotation providers:
//! - A CoreNLP-compatible server (tokenize, ssplit, pos, lemma, parse, depparse)
//! - A vocabulary-driven mock for tests and offline runs

use crate::config::XteConfig;
use crate::errors::{Result, XteError};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// One token of an annotated sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    pub word: String,
    pub lemma: String,
    /// Penn Treebank tag
    pub tag: String,
}

/// Basic dependency edge. Token indices are 1-based; governor 0 is the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub governor: usize,
    pub dependent: usize,
    pub relation: String,
}

impl DependencyEdge {
    pub fn new(governor: usize, dependent: usize, relation: impl Into<String>) -> Self {
        Self {
            governor,
            dependent,
            relation: relation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSentence {
    pub tokens: Vec<AnnotatedToken>,
    /// Penn-bracketed constituency parse
    pub parse: String,
    pub dependencies: Vec<DependencyEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub sentences: Vec<AnnotatedSentence>,
}

impl Annotation {
    /// All tokens in sentence order
    pub fn tokens(&self) -> impl Iterator<Item = &AnnotatedToken> {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }
}

/// Trait for annotation providers
#[async_trait]
pub trait Annotator: Send + Sync {
    async fn annotate(&self, text: &str) -> Result<Annotation>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Client for a CoreNLP-compatible annotation server
pub struct CoreNlpClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    max_retries: u32,
}

const CORENLP_PROPERTIES: &str =
    r#"{"annotators":"tokenize,ssplit,pos,lemma,parse,depparse","outputFormat":"json"}"#;

#[derive(Deserialize)]
struct CoreNlpResponse {
    #[serde(default)]
    sentences: Vec<CoreNlpSentence>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoreNlpSentence {
    #[serde(default)]
    tokens: Vec<CoreNlpToken>,
    #[serde(default)]
    parse: String,
    #[serde(default)]
    basic_dependencies: Vec<CoreNlpDependency>,
}

#[derive(Deserialize)]
struct CoreNlpToken {
    word: String,
    #[serde(default)]
    lemma: String,
    pos: String,
}

#[derive(Deserialize)]
struct CoreNlpDependency {
    dep: String,
    governor: usize,
    dependent: usize,
}

impl From<CoreNlpResponse> for Annotation {
    fn from(response: CoreNlpResponse) -> Self {
        let sentences = response
            .sentences
            .into_iter()
            .map(|s| AnnotatedSentence {
                tokens: s
                    .tokens
                    .into_iter()
                    .map(|t| AnnotatedToken {
                        lemma: if t.lemma.is_empty() { t.word.clone() } else { t.lemma },
                        word: t.word,
                        tag: t.pos,
                    })
                    .collect(),
                parse: s.parse,
                dependencies: s
                    .basic_dependencies
                    .into_iter()
                    .map(|d| DependencyEdge::new(d.governor, d.dependent, d.dep.to_lowercase()))
                    .collect(),
            })
            .collect();
        Annotation { sentences }
    }
}

impl CoreNlpClient {
    pub fn new(config: &XteConfig) -> Result<Self> {
        let timeout = config.annotator_timeout();
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: config.annotator_url.trim_end_matches('/').to_string(),
            timeout,
            max_retries: config.similarity_max_retries,
        })
    }

    async fn make_request(&self, text: &str) -> Result<Annotation> {
        let response = self
            .client
            .post(format!("{}/", self.url))
            .query(&[("properties", CORENLP_PROPERTIES)])
            .header("Content-Type", "text/plain;charset=UTF-8")
            .body(text.to_string())
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    XteError::ServiceUnavailable {
                        message: format!("annotation server unreachable: {}", e),
                    }
                } else {
                    XteError::HttpClient(e)
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(XteError::ServiceUnavailable {
                message: format!("annotation server returned {}", status),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(XteError::Annotation {
                message: format!("API error {}: {}", status, body),
            });
        }

        let parsed: CoreNlpResponse = response.json().await.map_err(|e| XteError::Annotation {
            message: format!("Failed to parse response: {}", e),
        })?;
        Ok(parsed.into())
    }
}

#[async_trait]
impl Annotator for CoreNlpClient {
    async fn annotate(&self, text: &str) -> Result<Annotation> {
        if text.trim().is_empty() {
            return Ok(Annotation::default());
        }

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(100))
            .with_max_elapsed_time(Some(self.timeout * (self.max_retries + 1)))
            .build();

        let mut attempt = 0u32;
        backoff::future::retry(policy, || {
            attempt += 1;
            let current = attempt;
            async move {
                self.make_request(text).await.map_err(|e| {
                    if e.is_retryable() && current <= self.max_retries {
                        tracing::warn!(attempt = current, error = %e, "Annotation request failed, retrying");
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        })
        .await
    }

    fn name(&self) -> &str {
        "corenlp"
    }
}

/// Vocabulary-driven annotator for testing
///
/// Words absent from the vocabulary are lowercased and tagged `NN`, or `NNP`
/// when capitalized mid-sentence. Sentences without a registered parse get a
/// flat one; sentences without registered dependencies hang every token off
/// the first verb (or the first token).
#[derive(Default)]
pub struct MockAnnotator {
    vocabulary: HashMap<String, (String, String)>,
    parses: HashMap<String, String>,
    dependencies: HashMap<String, Vec<DependencyEdge>>,
}

const PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '"', '(', ')'];

impl MockAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the lemma and tag of a surface word (case-insensitive)
    pub fn with_word(mut self, word: &str, lemma: &str, tag: &str) -> Self {
        self.vocabulary
            .insert(word.to_lowercase(), (lemma.to_string(), tag.to_string()));
        self
    }

    /// Register the constituency parse of a sentence, keyed by its text
    pub fn with_parse(mut self, sentence: &str, parse: &str) -> Self {
        self.parses.insert(sentence.trim().to_string(), parse.to_string());
        self
    }

    pub fn with_dependencies(mut self, sentence: &str, edges: Vec<DependencyEdge>) -> Self {
        self.dependencies.insert(sentence.trim().to_string(), edges);
        self
    }

    fn split_sentences(text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            current.push(c);
            let boundary = matches!(c, '.' | '!' | '?')
                && chars.peek().map(|n| n.is_whitespace()).unwrap_or(true);
            if boundary {
                let sentence = current.trim().to_string();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                current.clear();
            }
        }
        let rest = current.trim();
        if !rest.is_empty() {
            sentences.push(rest.to_string());
        }
        sentences
    }

    fn split_words(sentence: &str) -> Vec<String> {
        let mut words = Vec::new();
        for chunk in sentence.split_whitespace() {
            let mut trailing = Vec::new();
            let mut word = chunk;

            while let Some(c) = word.chars().next().filter(|c| PUNCTUATION.contains(c)) {
                words.push(c.to_string());
                word = &word[c.len_utf8()..];
            }
            while let Some(c) = word.chars().last().filter(|c| PUNCTUATION.contains(c)) {
                trailing.push(c.to_string());
                word = &word[..word.len() - c.len_utf8()];
            }

            let lower = word.to_lowercase();
            if lower.len() > 2 && lower.ends_with("'s") {
                words.push(word[..word.len() - 2].to_string());
                words.push("'s".to_string());
            } else if !word.is_empty() {
                words.push(word.to_string());
            }
            words.extend(trailing.into_iter().rev());
        }
        words
    }

    fn annotate_word(&self, word: &str, position: usize) -> AnnotatedToken {
        let lower = word.to_lowercase();
        if let Some((lemma, tag)) = self.vocabulary.get(&lower) {
            return AnnotatedToken {
                word: word.to_string(),
                lemma: lemma.clone(),
                tag: tag.clone(),
            };
        }

        let tag = if word.chars().all(|c| PUNCTUATION.contains(&c)) {
            word.to_string()
        } else if lower == "'s" {
            "POS".to_string()
        } else if position > 0 && word.chars().next().map(char::is_uppercase).unwrap_or(false) {
            "NNP".to_string()
        } else {
            "NN".to_string()
        };

        AnnotatedToken {
            word: word.to_string(),
            lemma: lower,
            tag,
        }
    }

    fn flat_parse(tokens: &[AnnotatedToken]) -> String {
        let leaves: Vec<String> = tokens
            .iter()
            .map(|t| format!("({} {})", t.tag, t.word))
            .collect();
        format!("(ROOT (S {}))", leaves.join(" "))
    }

    fn flat_dependencies(tokens: &[AnnotatedToken]) -> Vec<DependencyEdge> {
        if tokens.is_empty() {
            return Vec::new();
        }
        let root = tokens
            .iter()
            .position(|t| t.tag.starts_with("VB"))
            .unwrap_or(0)
            + 1;

        let mut edges = vec![DependencyEdge::new(0, root, "root")];
        for index in 1..=tokens.len() {
            if index != root {
                let relation = if tokens[index - 1].tag.chars().all(|c| PUNCTUATION.contains(&c)) {
                    "punct"
                } else {
                    "dep"
                };
                edges.push(DependencyEdge::new(root, index, relation));
            }
        }
        edges
    }
}

#[async_trait]
impl Annotator for MockAnnotator {
    async fn annotate(&self, text: &str) -> Result<Annotation> {
        let sentences = Self::split_sentences(text)
            .into_iter()
            .map(|sentence| {
                let tokens: Vec<AnnotatedToken> = Self::split_words(&sentence)
                    .iter()
                    .enumerate()
                    .map(|(i, w)| self.annotate_word(w, i))
                    .collect();
                let parse = self
                    .parses
                    .get(&sentence)
                    .cloned()
                    .unwrap_or_else(|| Self::flat_parse(&tokens));
                let dependencies = self
                    .dependencies
                    .get(&sentence)
                    .cloned()
                    .unwrap_or_else(|| Self::flat_dependencies(&tokens));
                AnnotatedSentence {
                    tokens,
                    parse,
                    dependencies,
                }
            })
            .collect();

        Ok(Annotation { sentences })
    }

    fn name(&self) -> &str {
        "mock-annotator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_splits_sentences_and_clitics() {
        let annotator = MockAnnotator::new()
            .with_word("cleans", "clean", "VBZ")
            .with_word("a", "a", "DT");
        let annotation = annotator
            .annotate("A worker cleans after Tuesday's violence. It rained!")
            .await
            .unwrap();

        assert_eq!(annotation.sentences.len(), 2);
        let words: Vec<&str> = annotation.sentences[0]
            .tokens
            .iter()
            .map(|t| t.word.as_str())
            .collect();
        assert_eq!(
            words,
            vec!["A", "worker", "cleans", "after", "Tuesday", "'s", "violence", "."]
        );

        let tokens = &annotation.sentences[0].tokens;
        assert_eq!(tokens[2].lemma, "clean");
        assert_eq!(tokens[4].tag, "NNP");
        assert_eq!(tokens[5].tag, "POS");
        assert_eq!(tokens[7].tag, ".");
    }

    #[tokio::test]
    async fn test_mock_flat_dependencies_hang_off_verb() {
        let annotator = MockAnnotator::new().with_word("sleeps", "sleep", "VBZ");
        let annotation = annotator.annotate("The cat sleeps").await.unwrap();
        let edges = &annotation.sentences[0].dependencies;

        assert_eq!(edges[0], DependencyEdge::new(0, 3, "root"));
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().skip(1).all(|e| e.governor == 3));
        assert_eq!(
            annotation.sentences[0].parse,
            "(ROOT (S (NN The) (NN cat) (VBZ sleeps)))"
        );
    }

    #[tokio::test]
    async fn test_mock_registered_parse() {
        let annotator = MockAnnotator::new().with_parse("It rained.", "(ROOT (S (NP (PRP It)) (VP (VBD rained)) (. .)))");
        let annotation = annotator.annotate("It rained.").await.unwrap();
        assert!(annotation.sentences[0].parse.contains("(VP (VBD rained))"));
    }

    #[test]
    fn test_corenlp_response_conversion() {
        let body = r#"{"sentences":[{"tokens":[{"word":"Cats","lemma":"cat","pos":"NNS"},{"word":"sleep","lemma":"sleep","pos":"VBP"}],
            "parse":"(ROOT (S (NP (NNS Cats)) (VP (VBP sleep))))",
            "basicDependencies":[{"dep":"ROOT","governor":0,"dependent":2},{"dep":"nsubj","governor":2,"dependent":1}]}]}"#;
        let response: CoreNlpResponse = serde_json::from_str(body).unwrap();
        let annotation: Annotation = response.into();

        let sentence = &annotation.sentences[0];
        assert_eq!(sentence.tokens[0].lemma, "cat");
        assert_eq!(sentence.dependencies[0], DependencyEdge::new(0, 2, "root"));
        assert_eq!(sentence.dependencies[1].relation, "nsubj");
    }
}
