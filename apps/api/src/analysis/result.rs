//! The canonical analysis record and its closed value domains.
//!
//! `AnalysisResult` has no public constructor outside the crate: the only way to
//! obtain one is through `ResponseInterpreter`, which guarantees every field is
//! populated and in range.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Confidence used whenever the reply gives no usable number.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Binary verdict. There is no "unknown" variant on purpose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Prediction {
    Fake,
    #[default]
    Real,
}

impl Prediction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Fake => "FAKE",
            Prediction::Real => "REAL",
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceQuality {
    Poor,
    #[default]
    Fair,
    Good,
    Excellent,
}

impl SourceQuality {
    pub const ALL: [SourceQuality; 4] = [
        SourceQuality::Poor,
        SourceQuality::Fair,
        SourceQuality::Good,
        SourceQuality::Excellent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceQuality::Poor => "Poor",
            SourceQuality::Fair => "Fair",
            SourceQuality::Good => "Good",
            SourceQuality::Excellent => "Excellent",
        }
    }

    /// Case-insensitive exact match on the tier name.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for SourceQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactualAccuracy {
    Low,
    #[default]
    Medium,
    High,
}

impl FactualAccuracy {
    pub const ALL: [FactualAccuracy; 3] = [
        FactualAccuracy::Low,
        FactualAccuracy::Medium,
        FactualAccuracy::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FactualAccuracy::Low => "Low",
            FactualAccuracy::Medium => "Medium",
            FactualAccuracy::High => "High",
        }
    }

    /// Case-insensitive exact match on the tier name.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for FactualAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-validated classification of one piece of text.
///
/// Fields are private so that callers can never observe a partially-populated
/// or out-of-range record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    prediction: Prediction,
    confidence: f64,
    source_quality: SourceQuality,
    factual_accuracy: FactualAccuracy,
    red_flags: Vec<String>,
    reasoning: String,
    /// One or more fields fell back to a default.
    degraded: bool,
    /// No prediction token was recognized; the verdict is the fallback.
    low_confidence_parse: bool,
}

impl AnalysisResult {
    /// Assembles a record, clamping confidence into `[0, 1]`.
    ///
    /// Crate-private: the interpreter is responsible for the remaining
    /// invariants (trimmed, deduplicated, capped red flags).
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        prediction: Prediction,
        confidence: f64,
        source_quality: SourceQuality,
        factual_accuracy: FactualAccuracy,
        red_flags: Vec<String>,
        reasoning: String,
        degraded: bool,
        low_confidence_parse: bool,
    ) -> Self {
        Self {
            prediction,
            confidence: clamp_confidence(confidence),
            source_quality,
            factual_accuracy,
            red_flags,
            reasoning,
            degraded,
            low_confidence_parse,
        }
    }

    pub fn prediction(&self) -> Prediction {
        self.prediction
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn source_quality(&self) -> SourceQuality {
        self.source_quality
    }

    pub fn factual_accuracy(&self) -> FactualAccuracy {
        self.factual_accuracy
    }

    pub fn red_flags(&self) -> &[String] {
        &self.red_flags
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn is_low_confidence_parse(&self) -> bool {
        self.low_confidence_parse
    }
}

/// Clamps into `[0, 1]`. NaN maps to the default confidence.
pub(crate) fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        DEFAULT_CONFIDENCE
    } else {
        value.clamp(0.0, 1.0)
    }
}
