//! # Shared Constants
//!
//! Centralized thresholds and formatting for the retrieval pipeline, so the
//! tuning knobs live in one place instead of as magic numbers in the flow.

/// A primary search whose best similarity falls below this bound triggers
/// the broader fallback search against the default index.
pub const HIGH_CONFIDENCE_SCORE: f64 = 0.8;

/// Similarity floor applied to the fallback search.
pub const FALLBACK_THRESHOLD: f64 = 0.6;

/// Retrieved passages must score strictly above this bound to drive
/// passage-derived URL resolution.
pub const SEMANTIC_URL_SCORE: f64 = 0.85;

/// Default number of passages returned by a retrieval call.
pub const DEFAULT_TOP_K: usize = 3;

/// Default similarity floor for a primary retrieval call.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.75;

/// Suffix prepended to a resolved call-to-action URL when annotating a reply.
pub const CTA_SUFFIX: &str = "\n\n🔗 You can explore that here: ";
