//! Semantic relatedness scoring
//!
//! Provides a unified interface over relatedness providers:
//! - The relatedness HTTP service (word2vec over a Wikipedia corpus)
//! - An in-memory lookup table for tests and offline runs

use crate::config::XteConfig;
use crate::errors::{Result, XteError};
use crate::metrics;
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// One scored (target, candidate) pair
///
/// Only the magnitude of `score` orders candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub term1: String,
    pub term2: String,
    pub score: f64,
}

/// Trait for relatedness scoring
#[async_trait]
pub trait SimilarityScorer: Send + Sync {
    /// Score `target` against every candidate. One pair per candidate, in
    /// no particular order.
    async fn score(&self, target: &str, candidates: &[String]) -> Result<Vec<ScoredPair>>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Score and resolve any service failure to an empty list.
pub async fn scores_or_empty(
    scorer: &dyn SimilarityScorer,
    target: &str,
    candidates: &[String],
) -> Vec<ScoredPair> {
    match scorer.score(target, candidates).await {
        Ok(pairs) => pairs,
        Err(e) => {
            tracing::warn!(
                provider = scorer.name(),
                term = target,
                candidates = candidates.len(),
                error = %e,
                "Relatedness request failed, continuing without scores"
            );
            Vec::new()
        }
    }
}

/// Client for the relatedness JSON service
pub struct RelatednessClient {
    client: reqwest::Client,
    url: String,
    corpus: String,
    model: String,
    language: String,
    score_function: String,
    timeout: Duration,
    max_retries: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelatednessRequest<'a> {
    corpus: &'a str,
    model: &'a str,
    language: &'a str,
    score_function: &'a str,
    pairs: Vec<TermPair<'a>>,
}

#[derive(Serialize)]
struct TermPair<'a> {
    t1: &'a str,
    t2: &'a str,
}

#[derive(Deserialize)]
struct RelatednessResponse {
    #[serde(default)]
    pairs: Vec<ScoredTerms>,
}

#[derive(Deserialize)]
struct ScoredTerms {
    t1: String,
    t2: String,
    #[serde(default)]
    score: f64,
}

impl RelatednessClient {
    /// Create a client from the configuration store
    pub fn new(config: &XteConfig) -> Result<Self> {
        let timeout = config.similarity_timeout();
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: config.similarity_url.clone(),
            corpus: config.similarity_corpus.clone(),
            model: config.similarity_model.clone(),
            language: config.similarity_language.clone(),
            score_function: config.similarity_score_function.clone(),
            timeout,
            max_retries: config.similarity_max_retries,
        })
    }

    /// Make request with retry on transient failures
    async fn request_with_retry(&self, target: &str, candidates: &[String]) -> Result<Vec<ScoredPair>> {
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(100))
            .with_max_elapsed_time(Some(self.timeout * (self.max_retries + 1)))
            .build();

        let mut attempt = 0u32;
        backoff::future::retry(policy, || {
            attempt += 1;
            let current = attempt;
            async move {
                self.make_request(target, candidates).await.map_err(|e| {
                    if e.is_retryable() && current <= self.max_retries {
                        tracing::warn!(
                            attempt = current,
                            max_retries = self.max_retries,
                            error = %e,
                            "Relatedness request failed, retrying"
                        );
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        })
        .await
    }

    async fn make_request(&self, target: &str, candidates: &[String]) -> Result<Vec<ScoredPair>> {
        let request = RelatednessRequest {
            corpus: &self.corpus,
            model: &self.model,
            language: &self.language,
            score_function: &self.score_function,
            pairs: candidates
                .iter()
                .map(|c| TermPair { t1: target, t2: c })
                .collect(),
        };

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json;charset=UTF-8")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    XteError::SimilarityTimeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else if e.is_connect() {
                    XteError::ServiceUnavailable {
                        message: format!("relatedness service unreachable: {}", e),
                    }
                } else {
                    XteError::HttpClient(e)
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            return Err(XteError::ServiceUnavailable {
                message: format!("relatedness service returned {}", status),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(XteError::Similarity {
                message: format!("API error {}: {}", status, body),
            });
        }

        let result: RelatednessResponse = response.json().await.map_err(|e| XteError::Similarity {
            message: format!("Failed to parse response: {}", e),
        })?;

        Ok(result
            .pairs
            .into_iter()
            .map(|p| ScoredPair {
                term1: p.t1,
                term2: p.t2,
                score: p.score,
            })
            .collect())
    }
}

#[async_trait]
impl SimilarityScorer for RelatednessClient {
    async fn score(&self, target: &str, candidates: &[String]) -> Result<Vec<ScoredPair>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let result = self.request_with_retry(target, candidates).await;
        metrics::record_similarity(start.elapsed().as_secs_f64(), candidates.len(), result.is_ok());
        result
    }

    fn name(&self) -> &str {
        "relatedness"
    }
}

/// Symmetric lookup table scorer for testing
///
/// Pairs that were never registered score `default_score`.
#[derive(Default)]
pub struct MockScorer {
    scores: HashMap<(String, String), f64>,
    default_score: f64,
    requests: AtomicUsize,
}

impl MockScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a score for both orderings of the pair
    pub fn with_score(mut self, a: &str, b: &str, score: f64) -> Self {
        self.scores.insert((a.to_string(), b.to_string()), score);
        self.scores.insert((b.to_string(), a.to_string()), score);
        self
    }

    pub fn with_default(mut self, score: f64) -> Self {
        self.default_score = score;
        self
    }

    /// Number of `score` calls served so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SimilarityScorer for MockScorer {
    async fn score(&self, target: &str, candidates: &[String]) -> Result<Vec<ScoredPair>> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        Ok(candidates
            .iter()
            .map(|c| ScoredPair {
                term1: target.to_string(),
                term2: c.clone(),
                score: self
                    .scores
                    .get(&(target.to_string(), c.clone()))
                    .copied()
                    .unwrap_or(self.default_score),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "mock-relatedness"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scorer that always fails, for fallback tests
    struct FailingScorer;

    #[async_trait]
    impl SimilarityScorer for FailingScorer {
        async fn score(&self, _target: &str, _candidates: &[String]) -> Result<Vec<ScoredPair>> {
            Err(XteError::ServiceUnavailable {
                message: "down".into(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_mock_scorer_is_symmetric() {
        let scorer = MockScorer::new().with_score("violence", "damage", 0.6);
        let pairs = scorer
            .score("damage", &["violence".to_string(), "budapest".to_string()])
            .await
            .unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].term2, "violence");
        assert_eq!(pairs[0].score, 0.6);
        assert_eq!(pairs[1].score, 0.0);
        assert_eq!(scorer.requests(), 1);
    }

    #[test]
    fn test_failure_resolves_to_empty() {
        let pairs = tokio_test::block_on(scores_or_empty(&FailingScorer, "damage", &["act".to_string()]));
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_request_wire_format() {
        let request = RelatednessRequest {
            corpus: "wiki-2018",
            model: "W2V",
            language: "EN",
            score_function: "COSINE",
            pairs: vec![TermPair { t1: "damage", t2: "act" }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["scoreFunction"], "COSINE");
        assert_eq!(json["pairs"][0]["t1"], "damage");
        assert_eq!(json["pairs"][0]["t2"], "act");
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"pairs":[{"t1":"damage","t2":"act","score":-0.25}]}"#;
        let parsed: RelatednessResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.pairs[0].t2, "act");
        assert_eq!(parsed.pairs[0].score, -0.25);
    }
}
