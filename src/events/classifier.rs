// src/events/classifier.rs
//! Relevance classification
//!
//! A pure predicate over captured text, kept apart from capture and emit
//! logic so the rule set can change without touching interception code.

/// Markers for the CAPTCHA vendors observed in the wild. Matching is
/// case-insensitive substring search.
pub const DEFAULT_MARKERS: &[&str] = &[
    "arkose",
    "funcaptcha",
    "hcaptcha",
    "recaptcha",
    "geetest",
    "datadome",
    "perimeterx",
];

/// Keyword classifier over captured script/markup text.
#[derive(Debug, Clone)]
pub struct Classifier {
    markers: Vec<String>,
}

impl Classifier {
    /// Build a classifier from a marker list. Markers are lowercased;
    /// empty entries are dropped.
    pub fn new(markers: &[String]) -> Self {
        Self {
            markers: markers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// True when the text contains any marker, ignoring case.
    pub fn is_relevant(&self, text: &str) -> bool {
        if self.markers.is_empty() {
            return false;
        }
        let haystack = text.to_lowercase();
        self.markers.iter().any(|m| haystack.contains(m.as_str()))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            &DEFAULT_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_marker_match() {
        let classifier = Classifier::default();
        assert!(classifier.is_relevant("window.ArkoseEnforcement.setup()"));
        assert!(classifier.is_relevant("<script src=\"https://cdn.funcaptcha.com/x.js\">"));
        assert!(!classifier.is_relevant("document.title = 'hello'"));
    }

    #[test]
    fn test_case_insensitive() {
        let classifier = Classifier::default();
        assert!(classifier.is_relevant("ARKOSE"));
        assert!(classifier.is_relevant("ArKoSe"));
    }

    #[test]
    fn test_empty_markers_match_nothing() {
        let classifier = Classifier::new(&[]);
        assert!(!classifier.is_relevant("arkose"));
    }

    #[test]
    fn test_blank_entries_dropped() {
        let classifier = Classifier::new(&["  ".to_string(), "arkose".to_string()]);
        assert!(classifier.is_relevant("arkose"));
        // A blank marker must not make everything relevant
        assert!(!classifier.is_relevant("plain text"));
    }

    proptest! {
        #[test]
        fn prop_marker_always_found_when_embedded(prefix in ".{0,64}", suffix in ".{0,64}") {
            let classifier = Classifier::default();
            let text = format!("{prefix}arkose{suffix}");
            prop_assert!(classifier.is_relevant(&text));
        }
    }
}
