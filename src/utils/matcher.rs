//! Title matching for search-based resolution.

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

use crate::config::MatchingConfig;

/// Decides whether a query and a candidate title name the same series
pub trait NameMatcher: Send + Sync + std::fmt::Debug {
    /// True when `name` matches any of `candidates`
    fn matches(&self, name: &str, candidates: &[&str]) -> bool;
}

/// How strict title comparison is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Titles must be equal after normalization
    Exact,
    /// Titles must be similar enough after normalization
    Close,
}

/// [`NameMatcher`] based on normalized Levenshtein similarity
#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    mode: MatchMode,
    threshold: f64,
}

impl SimilarityMatcher {
    pub fn new(mode: MatchMode, threshold: f64) -> Self {
        Self {
            mode,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.mode, config.threshold)
    }

    fn matches_one(&self, name: &str, candidate: &str) -> bool {
        let name = normalize_title(name);
        let candidate = normalize_title(candidate);
        if name.is_empty() || candidate.is_empty() {
            return false;
        }

        match self.mode {
            MatchMode::Exact => name == candidate,
            MatchMode::Close => normalized_levenshtein(&name, &candidate) >= self.threshold,
        }
    }
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::from_config(&MatchingConfig::default())
    }
}

impl NameMatcher for SimilarityMatcher {
    fn matches(&self, name: &str, candidates: &[&str]) -> bool {
        candidates.iter().any(|c| self.matches_one(name, c))
    }
}

/// Lowercase, drop punctuation and collapse whitespace
pub fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Attack on Titan!  "), "attack on titan");
        assert_eq!(normalize_title("Fire-Force"), "fireforce");
        assert_eq!(normalize_title("???"), "");
    }

    #[test]
    fn test_exact_mode() {
        let matcher = SimilarityMatcher::new(MatchMode::Exact, 1.0);

        assert!(matcher.matches("Attack on Titan", &["attack on titan"]));
        assert!(!matcher.matches("Attack on Titan", &["Attack on Titan: Before the Fall"]));
    }

    #[test]
    fn test_close_mode_tolerates_small_differences() {
        let matcher = SimilarityMatcher::new(MatchMode::Close, 0.9);

        assert!(matcher.matches("The Seven Deadly Sins", &["The Seven Deadly Sin"]));
        assert!(!matcher.matches("The Seven Deadly Sins", &["Fairy Tail"]));
    }

    #[test]
    fn test_any_candidate_may_match() {
        let matcher = SimilarityMatcher::new(MatchMode::Exact, 1.0);

        assert!(matcher.matches("Shingeki no Kyojin", &["L'Attaque des Titans", "Shingeki no Kyojin"]));
        assert!(!matcher.matches("Shingeki no Kyojin", &[]));
    }

    #[test]
    fn test_empty_titles_never_match() {
        let matcher = SimilarityMatcher::new(MatchMode::Close, 0.0);
        assert!(!matcher.matches("", &[""]));
    }
}
