//! Lexicon — the tuning table the Response Interpreter reads labels and verdicts with.
//!
//! Label variants, verdict synonyms and "no red flags" phrases are data, not
//! parsing logic: the built-in table can be replaced at startup from a JSON file
//! (`LEXICON_PATH`) without touching the interpreter.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Failed to read lexicon file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lexicon JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid lexicon: {0}")]
    Invalid(String),

    #[error("Failed to compile label pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// The six fields the instruction template asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Prediction,
    Confidence,
    SourceQuality,
    FactualAccuracy,
    RedFlags,
    Reasoning,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Prediction,
        Field::Confidence,
        Field::SourceQuality,
        Field::FactualAccuracy,
        Field::RedFlags,
        Field::Reasoning,
    ];
}

/// Accepted label spellings per field. Matching is case-insensitive and treats
/// spaces, underscores and hyphens between words as interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelVariants {
    pub prediction: Vec<String>,
    pub confidence: Vec<String>,
    pub source_quality: Vec<String>,
    pub factual_accuracy: Vec<String>,
    pub red_flags: Vec<String>,
    pub reasoning: Vec<String>,
}

impl LabelVariants {
    pub fn for_field(&self, field: Field) -> &[String] {
        match field {
            Field::Prediction => &self.prediction,
            Field::Confidence => &self.confidence,
            Field::SourceQuality => &self.source_quality,
            Field::FactualAccuracy => &self.factual_accuracy,
            Field::RedFlags => &self.red_flags,
            Field::Reasoning => &self.reasoning,
        }
    }
}

impl Default for LabelVariants {
    fn default() -> Self {
        Self {
            prediction: strings(&["PREDICTION", "VERDICT", "CLASSIFICATION"]),
            confidence: strings(&["CONFIDENCE", "CONFIDENCE LEVEL", "CONFIDENCE SCORE", "CERTAINTY"]),
            source_quality: strings(&["SOURCE QUALITY", "SOURCE CREDIBILITY"]),
            factual_accuracy: strings(&["FACTUAL ACCURACY", "ACCURACY"]),
            red_flags: strings(&["RED FLAGS", "RED FLAG", "WARNING SIGNS"]),
            reasoning: strings(&["REASONING", "REASON", "EXPLANATION", "RATIONALE"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub labels: LabelVariants,
    /// Phrases that resolve a prediction to FAKE.
    pub fake_phrases: Vec<String>,
    /// Phrases that resolve a prediction to REAL.
    pub real_phrases: Vec<String>,
    /// Whole-value answers meaning "no red flags".
    pub no_flag_phrases: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            labels: LabelVariants::default(),
            fake_phrases: strings(&[
                "FAKE NEWS",
                "FAKE",
                "FALSE",
                "MISLEADING",
                "MISINFORMATION",
                "DISINFORMATION",
                "FABRICATED",
                "HOAX",
                "NOT REAL",
                "NOT TRUE",
                "NOT LEGITIMATE",
            ]),
            real_phrases: strings(&[
                "REAL NEWS",
                "REAL",
                "TRUE",
                "LEGITIMATE",
                "AUTHENTIC",
                "CREDIBLE",
                "NOT FAKE",
                "NOT FALSE",
                "NOT MISLEADING",
            ]),
            no_flag_phrases: strings(&[
                "NONE",
                "N/A",
                "NO RED FLAGS",
                "NO RED FLAGS IDENTIFIED",
                "NONE IDENTIFIED",
                "NONE FOUND",
            ]),
        }
    }
}

impl Lexicon {
    /// Loads a lexicon from a JSON file. Missing keys fall back to the built-in table.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LexiconError> {
        let raw = std::fs::read_to_string(path)?;
        let lexicon: Lexicon = serde_json::from_str(&raw)?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Every field needs at least one non-blank label, and both verdicts need a phrase.
    pub fn validate(&self) -> Result<(), LexiconError> {
        for field in Field::ALL {
            if !has_non_blank(self.labels.for_field(field)) {
                return Err(LexiconError::Invalid(format!(
                    "no label variants for field {field:?}"
                )));
            }
        }
        if !has_non_blank(&self.fake_phrases) {
            return Err(LexiconError::Invalid("fake_phrases is empty".to_string()));
        }
        if !has_non_blank(&self.real_phrases) {
            return Err(LexiconError::Invalid("real_phrases is empty".to_string()));
        }
        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn has_non_blank(values: &[String]) -> bool {
    values.iter().any(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_lexicon_is_valid() {
        assert!(Lexicon::default().validate().is_ok());
    }

    #[test]
    fn test_default_labels_match_template_layout() {
        let labels = LabelVariants::default();
        assert!(labels.prediction.contains(&"PREDICTION".to_string()));
        assert!(labels.source_quality.contains(&"SOURCE QUALITY".to_string()));
        assert!(labels.red_flags.contains(&"RED FLAGS".to_string()));
    }

    #[test]
    fn test_blank_variants_are_rejected() {
        let mut lexicon = Lexicon::default();
        lexicon.labels.reasoning = vec!["  ".to_string()];
        let err = lexicon.validate().unwrap_err();
        assert!(err.to_string().contains("Reasoning"));
    }

    #[test]
    fn test_empty_verdict_table_is_rejected() {
        let lexicon = Lexicon {
            fake_phrases: vec![],
            ..Lexicon::default()
        };
        assert!(lexicon.validate().is_err());
    }

    #[test]
    fn test_from_file_merges_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"fake_phrases": ["BOGUS", "FAKE"]}}"#).unwrap();

        let lexicon = Lexicon::from_file(file.path()).unwrap();
        assert_eq!(lexicon.fake_phrases, vec!["BOGUS", "FAKE"]);
        assert_eq!(lexicon.real_phrases, Lexicon::default().real_phrases);
        assert_eq!(lexicon.labels, LabelVariants::default());
    }

    #[test]
    fn test_from_file_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Lexicon::from_file(file.path()),
            Err(LexiconError::Json(_))
        ));
    }
}
