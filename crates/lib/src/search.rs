//! # Smart Retrieval
//!
//! The layered retrieval pipeline: the domain classifier picks a scoped
//! index, the vector retriever searches it, and a broader pass against the
//! unscoped default index fills in when the primary search comes back empty
//! or under-confident. Domain-scoped indexes buy precision; the fallback
//! guards against misclassification and sparse domain coverage.
//!
//! Every stage fails soft. A missing index, a corrupt file, or an embedding
//! outage is logged and yields an empty result; the chat flow continues
//! without retrieved context rather than surfacing an error.

use crate::classifier::DomainClassifier;
use crate::constants::{FALLBACK_THRESHOLD, HIGH_CONFIDENCE_SCORE};
use crate::index::PassageIndex;
use crate::providers::ai::Embedder;
use crate::types::ScoredPassage;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// The name of the distinguished unscoped index.
pub const DEFAULT_INDEX: &str = "default";

/// Maps a domain label to the identifier of the vector index scoped to it.
/// Unknown labels, including `general`, resolve to the default index; the
/// mapping is total and never fails.
#[derive(Debug, Clone)]
pub struct IndexRouter {
    routes: Vec<(String, String)>,
    default_route: String,
}

impl IndexRouter {
    pub fn new(routes: Vec<(String, String)>, default_route: String) -> Self {
        Self {
            routes,
            default_route,
        }
    }

    /// Builds the conventional on-disk layout: one `<label>.db` per domain
    /// under `indexes_dir`, plus `default.db` for the unscoped index.
    pub fn from_dir<I, S>(indexes_dir: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let routes = labels
            .into_iter()
            .map(|label| {
                let label = label.as_ref().to_string();
                let path = format!("{indexes_dir}/{label}.db");
                (label, path)
            })
            .collect();
        Self {
            routes,
            default_route: format!("{indexes_dir}/{DEFAULT_INDEX}.db"),
        }
    }

    pub fn route(&self, domain: &str) -> &str {
        self.routes
            .iter()
            .find(|(label, _)| label == domain)
            .map(|(_, identifier)| identifier.as_str())
            .unwrap_or(&self.default_route)
    }

    pub fn default_route(&self) -> &str {
        &self.default_route
    }
}

/// The retrieval seam: top-`k` passages for a query against a named index,
/// each scoring at least `threshold`, in descending score order.
///
/// Implementations fail soft: any storage or embedding failure yields an
/// empty result, never an error. Repeated identical calls against an
/// unchanged index return identical results.
#[async_trait]
pub trait Retrieve: Send + Sync {
    async fn retrieve(
        &self,
        query: &str,
        index_id: &str,
        k: usize,
        threshold: f64,
    ) -> Vec<ScoredPassage>;
}

/// Production retriever: embeds the query and searches a persisted index.
pub struct VectorRetriever {
    embedder: Arc<dyn Embedder>,
}

impl VectorRetriever {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }
}

#[async_trait]
impl Retrieve for VectorRetriever {
    async fn retrieve(
        &self,
        query: &str,
        index_id: &str,
        k: usize,
        threshold: f64,
    ) -> Vec<ScoredPassage> {
        if k == 0 {
            return Vec::new();
        }
        let query_vector = match self.embedder.embed(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!(index_id, "Embedding generation failed, returning no context: {e}");
                return Vec::new();
            }
        };
        let index = match PassageIndex::open(index_id).await {
            Ok(index) => index,
            Err(e) => {
                warn!(index_id, "Passage index unavailable, returning no context: {e}");
                return Vec::new();
            }
        };
        let hits = match index.search(&query_vector, k).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(index_id, "Passage index query failed, returning no context: {e}");
                return Vec::new();
            }
        };
        hits.into_iter()
            .filter(|passage| passage.score >= threshold)
            .collect()
    }
}

/// Composes classifier, router, and retriever into the two-pass search.
pub struct SmartRetriever {
    classifier: DomainClassifier,
    router: IndexRouter,
    retriever: Arc<dyn Retrieve>,
}

impl SmartRetriever {
    pub fn new(
        classifier: DomainClassifier,
        router: IndexRouter,
        retriever: Arc<dyn Retrieve>,
    ) -> Self {
        Self {
            classifier,
            router,
            retriever,
        }
    }

    /// Runs the primary domain-scoped search, then a broader default-index
    /// pass when the primary result is empty or its best score falls below
    /// [`HIGH_CONFIDENCE_SCORE`]. The fallback asks for `k / 2` passages at
    /// the relaxed [`FALLBACK_THRESHOLD`]; with `k <= 1` that rounds to
    /// zero and no fallback query is issued. Results are merged, sorted by
    /// descending score, and truncated to `k`.
    pub async fn smart_retrieve(
        &self,
        query: &str,
        k: usize,
        confidence_threshold: f64,
    ) -> Vec<ScoredPassage> {
        let domain = self.classifier.classify(query);
        let index_id = self.router.route(domain);
        debug!(domain, index_id, "Routing retrieval");

        let mut results = self
            .retriever
            .retrieve(query, index_id, k, confidence_threshold)
            .await;

        let best_score = results.iter().map(|p| p.score).fold(0.0_f64, f64::max);
        let fallback_k = k / 2;
        if best_score < HIGH_CONFIDENCE_SCORE && fallback_k > 0 {
            debug!(
                best_score,
                "Primary search under-confident, querying the default index"
            );
            let fallback = self
                .retriever
                .retrieve(query, self.router.default_route(), fallback_k, FALLBACK_THRESHOLD)
                .await;
            results.extend(fallback);
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);
        results
    }
}
