//! Fuzzy title matching shared by every source adapter.
//!
//! Titles are normalized (`&` becomes `and`, everything but alphanumerics is
//! dropped, case folded) and compared with a normalized Levenshtein ratio.
//! A candidate is accepted when the ratio is strictly above the threshold.

/// Default acceptance threshold.
pub const MATCH_THRESHOLD: f64 = 0.5;

/// Result of comparing two titles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    /// Similarity in `[0, 1]`.
    pub score: f64,
    /// Whether the score clears the threshold.
    pub accepted: bool,
}

/// Title comparator accepting scores above [`MATCH_THRESHOLD`].
#[derive(Debug, Clone, Copy)]
pub struct TitleMatcher {
    threshold: f64,
}

impl Default for TitleMatcher {
    fn default() -> Self {
        Self {
            threshold: MATCH_THRESHOLD,
        }
    }
}

impl TitleMatcher {
    /// Compare a candidate title against the requested one.
    pub fn matches(&self, candidate: &str, target: &str) -> MatchScore {
        let score = similarity(candidate, target);
        MatchScore {
            score,
            accepted: score > self.threshold,
        }
    }

    /// Compare a multi-sentence snippet against a title.
    ///
    /// An exact case-insensitive containment accepts with score 1; otherwise
    /// the snippet is split on `". "` and the best chunk wins.
    pub fn matches_snippet(&self, snippet: &str, target: &str) -> MatchScore {
        let needle = target.trim().to_lowercase();
        if !needle.is_empty() && snippet.to_lowercase().contains(&needle) {
            return MatchScore {
                score: 1.0,
                accepted: true,
            };
        }
        let score = snippet
            .split(". ")
            .map(|chunk| similarity(chunk, target))
            .fold(0.0_f64, f64::max);
        MatchScore {
            score,
            accepted: score > self.threshold,
        }
    }

    /// Index of the first candidate (in iteration order) that is accepted.
    pub fn first_match<I, S>(&self, candidates: I, target: &str) -> Option<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .position(|c| self.matches(c.as_ref(), target).accepted)
    }
}

/// Normalize a title for comparison.
pub fn normalize(title: &str) -> String {
    title
        .replace('&', "and")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Symmetric similarity ratio of two titles after normalization.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&a, &b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Ratchet & Clank: Rift Apart"), "ratchetandclankriftapart");
        assert_eq!(normalize("  HALF-LIFE 2 "), "halflife2");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("Hades", "Hades II"),
            ("The Witcher 3: Wild Hunt", "witcher 3"),
            ("Portal", "Portal 2"),
            ("", "Celeste"),
            ("Baldur's Gate 3", "Baldurs Gate III"),
        ];
        let m = TitleMatcher::default();
        for (a, b) in pairs {
            assert_eq!(m.matches(a, b).score, m.matches(b, a).score, "{a} vs {b}");
        }
    }

    #[test]
    fn test_remastered_variant_accepted() {
        let m = TitleMatcher::default().matches("The Last Game: Remastered", "last game remastered");
        assert!(m.accepted, "score was {}", m.score);
    }

    #[test]
    fn test_unrelated_rejected() {
        let m = TitleMatcher::default().matches("Stardew Valley", "Doom Eternal");
        assert!(!m.accepted);
    }

    #[test]
    fn test_identical_scores_one() {
        let m = TitleMatcher::default().matches("Celeste", "CELESTE");
        assert_eq!(m.score, 1.0);
        assert!(m.accepted);
    }

    #[test]
    fn test_empty_never_accepts() {
        let m = TitleMatcher::default().matches("", "");
        assert_eq!(m.score, 0.0);
        assert!(!m.accepted);
    }

    #[test]
    fn test_threshold_is_strict() {
        // "abcd" vs "abef": 2 edits over 4 chars, exactly 0.5.
        let m = TitleMatcher::default().matches("abcd", "abef");
        assert_eq!(m.score, 0.5);
        assert!(!m.accepted);
    }

    #[test]
    fn test_snippet_containment() {
        let m = TitleMatcher::default()
            .matches_snippet("Buy Hollow Knight on Steam. Forge your own path.", "hollow knight");
        assert_eq!(m.score, 1.0);
        assert!(m.accepted);
    }

    #[test]
    fn test_snippet_best_chunk() {
        let m = TitleMatcher::default().matches_snippet(
            "Save 50% today. Hollow Knight: Voidheart. Explore a vast kingdom",
            "Hollow Knight Voidheart Edition",
        );
        assert!(m.accepted, "score was {}", m.score);
    }

    #[test]
    fn test_first_match_in_document_order() {
        let candidates = ["Doom Eternal", "Portal 2", "Portal"];
        let m = TitleMatcher::default();
        // Both "Portal 2" and "Portal" clear the threshold; the earlier one wins.
        assert_eq!(m.first_match(candidates, "Portal"), Some(1));
        assert_eq!(m.first_match(["Tetris"], "Portal"), None);
    }
}
