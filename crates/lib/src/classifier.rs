//! # Domain Classification
//!
//! Weighted keyword scoring that maps a free-text utterance to one coarse
//! domain label. The label only steers which vector index a retrieval is
//! routed to; an unrecognized utterance falls through to the unscoped
//! default index, so misclassification is cheap by construction.

use crate::intents::DomainProfile;

/// The distinguished label returned when no domain scores above zero.
pub const GENERAL_DOMAIN: &str = "general";

/// Classifies utterances against an ordered set of weighted keyword
/// profiles. Pure function over static configuration; never fails.
#[derive(Debug, Clone)]
pub struct DomainClassifier {
    profiles: Vec<DomainProfile>,
}

impl DomainClassifier {
    pub fn new(profiles: Vec<DomainProfile>) -> Self {
        Self { profiles }
    }

    /// Returns the label of the strictly highest-scoring domain, breaking
    /// ties in favor of the first-declared profile. Every keyword found as a
    /// substring of the lower-cased input adds the profile's weight to its
    /// total; an all-zero scoreboard yields [`GENERAL_DOMAIN`].
    pub fn classify(&self, input: &str) -> &str {
        let input = input.to_lowercase();
        let mut best: Option<(&str, f64)> = None;
        for profile in &self.profiles {
            let hits = profile
                .keywords
                .iter()
                .filter(|keyword| input.contains(keyword.as_str()))
                .count();
            if hits == 0 {
                continue;
            }
            let score = profile.weight * hits as f64;
            // Strictly-greater keeps the first-declared profile on ties.
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((profile.label.as_str(), score));
            }
        }
        best.map_or(GENERAL_DOMAIN, |(label, _)| label)
    }

    pub fn profiles(&self) -> &[DomainProfile] {
        &self.profiles
    }
}
