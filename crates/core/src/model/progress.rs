use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Learner state for one capsule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Progress {
    /// Best quiz result as a whole percentage.
    #[serde(deserialize_with = "null_as_default")]
    pub best_score: u32,
    /// Positions of flashcards the learner marked as known.
    #[serde(deserialize_with = "null_as_default")]
    pub known_flashcards: BTreeSet<usize>,
}

impl Progress {
    /// Returns `true` if the card was not already known.
    pub fn mark_known(&mut self, index: usize) -> bool {
        self.known_flashcards.insert(index)
    }

    /// Returns `true` if the card had been marked known.
    pub fn mark_unknown(&mut self, index: usize) -> bool {
        self.known_flashcards.remove(&index)
    }

    #[must_use]
    pub fn is_known(&self, index: usize) -> bool {
        self.known_flashcards.contains(&index)
    }

    /// Keep `percent` if it beats the stored best. Ties do not count.
    pub fn record_score(&mut self, percent: u32) -> bool {
        if percent > self.best_score {
            self.best_score = percent;
            true
        } else {
            false
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_then_unknown_returns_to_empty() {
        let mut progress = Progress::default();
        assert!(progress.mark_known(1));
        assert!(!progress.mark_known(1));
        assert!(progress.is_known(1));
        assert!(progress.mark_unknown(1));
        assert!(progress.known_flashcards.is_empty());
    }

    #[test]
    fn record_score_only_on_strict_improvement() {
        let mut progress = Progress::default();
        assert!(progress.record_score(67));
        assert!(!progress.record_score(67));
        assert!(!progress.record_score(33));
        assert!(progress.record_score(100));
        assert_eq!(progress.best_score, 100);
    }

    #[test]
    fn parses_partial_and_null_records() {
        let progress: Progress = serde_json::from_str(r#"{"bestScore": null}"#).unwrap();
        assert_eq!(progress, Progress::default());

        let progress: Progress =
            serde_json::from_str(r#"{"bestScore": 50, "knownFlashcards": [2, 0, 2]}"#).unwrap();
        assert_eq!(progress.best_score, 50);
        assert_eq!(progress.known_flashcards.into_iter().collect::<Vec<_>>(), [0, 2]);
    }

    #[test]
    fn serializes_known_cards_as_array() {
        let mut progress = Progress::default();
        progress.mark_known(3);
        let json = serde_json::to_string(&progress).unwrap();
        assert_eq!(json, r#"{"bestScore":0,"knownFlashcards":[3]}"#);
    }
}
