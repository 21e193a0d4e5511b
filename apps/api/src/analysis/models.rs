//! Analysis result returned by the model.
//!
//! Every field is optional on the wire. Absent and `null` values both fall back
//! to the default so consumers never fail on a missing key.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Structured verdict comparing one resume to one job description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    /// Kept as a JSON number so an integer score round-trips as an integer.
    pub match_score: Option<Number>,
    #[serde(deserialize_with = "null_as_default")]
    pub matched_keywords: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub missing_keywords: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub technical_skills_present: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub technical_skills_missing: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub soft_skills_present: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub soft_skills_missing: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub detailed_feedback: DetailedFeedback,
    #[serde(deserialize_with = "null_as_default")]
    pub priority_improvements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailedFeedback {
    pub overall_assessment: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub weaknesses: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
    pub ats_compatibility: Option<String>,
    pub section_analysis: Option<SectionAnalysis>,
}

/// Which resume sections the model found. A key the model left out is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionAnalysis {
    pub has_contact_info: Option<bool>,
    pub has_experience: Option<bool>,
    pub has_education: Option<bool>,
    pub has_skills_section: Option<bool>,
    pub has_quantifiable_achievements: Option<bool>,
    /// Keys the model added beyond the known checks.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl SectionAnalysis {
    /// True when the model sent the record with no keys at all.
    pub fn is_empty(&self) -> bool {
        self.other.is_empty()
            && self.has_contact_info.is_none()
            && self.has_experience.is_none()
            && self.has_education.is_none()
            && self.has_skills_section.is_none()
            && self.has_quantifiable_achievements.is_none()
    }
}

impl AnalysisResult {
    /// The score as reported, or `0` when the model omitted it.
    pub fn score(&self) -> Number {
        self.match_score.clone().unwrap_or_else(|| Number::from(0))
    }

    /// The score as a float for band thresholds.
    pub fn score_value(&self) -> f64 {
        self.match_score
            .as_ref()
            .and_then(Number::as_f64)
            .unwrap_or(0.0)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
