//! Engine configuration

use std::path::PathBuf;

/// Tunable thresholds and paths for engine operations.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum token-set similarity for a resolution statement to close a
    /// note (0.0-1.0).
    pub similarity_threshold: f64,

    /// Minimum number of shared tokens between statement and note content.
    /// Guards against generic short phrases that score high on similarity
    /// alone.
    pub min_shared_tokens: usize,

    /// Audit-in-progress placeholder phrases discarded during capture.
    pub ignore_phrases: Vec<String>,

    /// Directory for plain-text exports.
    pub txt_dir: PathBuf,

    /// Directory for PDF exports.
    pub pdf_dir: PathBuf,

    /// Sentinel site name the recap aggregator stores its result set under.
    pub recap_site: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.75,
            min_shared_tokens: 2,
            ignore_phrases: [
                "sedang diaudit",
                "dalam proses audit",
                "masih dicek",
                "dalam pengecekan",
                "site ini sedang audit",
                "audit site",
                "belum diketik",
                "audit in progress",
                "still checking",
                "not typed yet",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            txt_dir: PathBuf::from("notes_txt"),
            pdf_dir: PathBuf::from("notes_pdf"),
            recap_site: "recap".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = EngineConfig::default();
        assert_eq!(config.similarity_threshold, 0.75);
        assert_eq!(config.min_shared_tokens, 2);
        assert!(config.ignore_phrases.iter().any(|p| p == "still checking"));
    }
}
