//! Crop image analysis records
//!
//! The analysis shape is the richest record the pipeline produces. The
//! display layer renders every field as raw text without null checks, so
//! normalization guarantees a fully-populated record: missing strings get
//! placeholder text, missing lists become empty lists, and a terse
//! description is expanded into a composite built from the structured
//! fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::{clamped_percent, json_candidates, string_list_member, string_member};

/// Severity of a detected crop condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parse a model-supplied severity, substituting `Low` for anything
    /// outside the allowed set.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Maximum number of product suggestions kept per analysis
pub const MAX_RECOMMENDED_PRODUCTS: usize = 6;

/// Descriptions shorter than this are expanded from the structured fields
const MIN_DESCRIPTION_LEN: usize = 120;

/// A fully-populated crop analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CropAnalysis {
    pub disease: String,
    pub severity: Severity,
    pub confidence: i32,
    pub crop_type: String,
    pub growth_stage: String,
    pub overall_health: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub possible_causes: Vec<String>,
    pub risk_factors: String,
    pub immediate_actions: String,
    pub short_term_treatment: String,
    pub long_term_management: String,
    pub recommended_products: Vec<String>,
    pub monitoring_schedule: String,
    pub weather_considerations: String,
    pub alternative_solutions: String,
}

impl CropAnalysis {
    /// Normalize one raw object into a complete analysis.
    ///
    /// A non-empty `disease` string is the usability floor: without it the
    /// object is rejected and the chain moves on. Every other field is
    /// coerced or placeholder-filled.
    pub fn from_value(v: &Value) -> Option<Self> {
        let disease = string_member(v, "disease")?;
        let severity = string_member(v, "severity")
            .map(|s| Severity::parse_or_default(&s))
            .unwrap_or(Severity::Low);
        let confidence = clamped_percent(v, "confidence");

        let symptoms = string_list_member(v, "symptoms");
        let possible_causes = string_list_member(v, "possibleCauses");
        let mut recommended_products = string_list_member(v, "recommendedProducts");
        recommended_products.truncate(MAX_RECOMMENDED_PRODUCTS);

        let raw_description = string_member(v, "description").unwrap_or_default();
        let description = if raw_description.len() < MIN_DESCRIPTION_LEN {
            expand_description(
                &raw_description,
                &disease,
                severity,
                confidence,
                &symptoms,
                &possible_causes,
            )
        } else {
            raw_description
        };

        Some(Self {
            disease,
            severity,
            confidence,
            crop_type: string_member(v, "cropType")
                .unwrap_or_else(|| "Not identified".to_string()),
            growth_stage: string_member(v, "growthStage")
                .unwrap_or_else(|| "Not determined".to_string()),
            overall_health: string_member(v, "overallHealth")
                .unwrap_or_else(|| "Not assessed".to_string()),
            description,
            symptoms,
            possible_causes,
            risk_factors: string_member(v, "riskFactors")
                .unwrap_or_else(|| "None identified".to_string()),
            immediate_actions: string_member(v, "immediateActions")
                .unwrap_or_else(|| "No immediate action required.".to_string()),
            short_term_treatment: string_member(v, "shortTermTreatment")
                .unwrap_or_else(|| "Continue standard care over the coming weeks.".to_string()),
            long_term_management: string_member(v, "longTermManagement").unwrap_or_else(|| {
                "Maintain regular monitoring and good field hygiene.".to_string()
            }),
            recommended_products,
            monitoring_schedule: string_member(v, "monitoringSchedule")
                .unwrap_or_else(|| "Inspect the crop weekly.".to_string()),
            weather_considerations: string_member(v, "weatherConsiderations")
                .unwrap_or_else(|| "No specific weather concerns noted.".to_string()),
            alternative_solutions: string_member(v, "alternativeSolutions")
                .unwrap_or_else(|| "No organic alternatives suggested.".to_string()),
        })
    }

    /// Placeholder analysis stored when every provider fails.
    ///
    /// There is no safe canned diagnosis, so the record says so explicitly
    /// while still satisfying the completeness guarantee.
    pub fn fallback() -> Self {
        Self {
            disease: "Analysis pending".to_string(),
            severity: Severity::Low,
            confidence: 0,
            crop_type: "Not identified".to_string(),
            growth_stage: "Not determined".to_string(),
            overall_health: "Not assessed".to_string(),
            description: "The image could not be analyzed automatically. Verify that at least \
                          one AI provider key is configured, then upload the image again."
                .to_string(),
            symptoms: Vec::new(),
            possible_causes: Vec::new(),
            risk_factors: "None identified".to_string(),
            immediate_actions: "Re-run the analysis once an AI provider is available.".to_string(),
            short_term_treatment: "Continue standard care over the coming weeks.".to_string(),
            long_term_management: "Maintain regular monitoring and good field hygiene.".to_string(),
            recommended_products: Vec::new(),
            monitoring_schedule: "Inspect the crop weekly.".to_string(),
            weather_considerations: "No specific weather concerns noted.".to_string(),
            alternative_solutions: "No organic alternatives suggested.".to_string(),
        }
    }

    /// True when every string field carries text. Lists may be empty.
    pub fn is_complete(&self) -> bool {
        !self.disease.is_empty()
            && !self.crop_type.is_empty()
            && !self.growth_stage.is_empty()
            && !self.overall_health.is_empty()
            && !self.description.is_empty()
            && !self.risk_factors.is_empty()
            && !self.immediate_actions.is_empty()
            && !self.short_term_treatment.is_empty()
            && !self.long_term_management.is_empty()
            && !self.monitoring_schedule.is_empty()
            && !self.weather_considerations.is_empty()
            && !self.alternative_solutions.is_empty()
    }
}

/// Build a multi-sentence description from the structured fields when the
/// model's own description is terse or missing.
fn expand_description(
    short: &str,
    disease: &str,
    severity: Severity,
    confidence: i32,
    symptoms: &[String],
    causes: &[String],
) -> String {
    let mut text = String::new();

    let short = short.trim();
    if !short.is_empty() {
        text.push_str(short);
        if !short.ends_with('.') {
            text.push('.');
        }
        text.push(' ');
    }

    text.push_str(&format!(
        "The image is consistent with {} at {} severity ({}% confidence).",
        disease,
        severity.as_str(),
        confidence
    ));

    if !symptoms.is_empty() {
        text.push_str(&format!(
            " Observed symptoms include {}.",
            symptoms.join(", ")
        ));
    }
    if !causes.is_empty() {
        text.push_str(&format!(
            " Likely contributing factors: {}.",
            causes.join(", ")
        ));
    }

    text
}

/// Extract one crop analysis from raw model output.
///
/// Candidate blocks are tried in order; the first one that normalizes into a
/// complete analysis wins.
pub fn extract_crop_analysis(text: &str) -> Option<CropAnalysis> {
    json_candidates(text)
        .iter()
        .find_map(CropAnalysis::from_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rich_sample() -> String {
        json!({
            "disease": "Late Blight",
            "severity": "high",
            "confidence": 87,
            "cropType": "Tomato",
            "growthStage": "Flowering",
            "overallHealth": "Declining",
            "description": "Large irregular brown lesions with pale green margins spread across \
                            the upper canopy, and white sporulation is visible on the underside \
                            of several leaflets after humid nights.",
            "symptoms": ["brown lesions", "white sporulation"],
            "possibleCauses": ["prolonged leaf wetness", "infected transplants"],
            "riskFactors": "Cool nights with heavy dew accelerate spread.",
            "immediateActions": "Remove and destroy infected foliage; apply a protectant fungicide.",
            "shortTermTreatment": "Repeat fungicide application at 7-day intervals.",
            "longTermManagement": "Rotate away from solanaceous crops for two seasons.",
            "recommendedProducts": ["chlorothalonil", "copper hydroxide"],
            "monitoringSchedule": "Scout twice weekly while humidity stays high.",
            "weatherConsiderations": "Avoid overhead irrigation before cool nights.",
            "alternativeSolutions": "Copper-based organic sprays can slow the spread."
        })
        .to_string()
    }

    #[test]
    fn test_rich_analysis_parses_completely() {
        let analysis = extract_crop_analysis(&rich_sample()).unwrap();
        assert_eq!(analysis.disease, "Late Blight");
        assert_eq!(analysis.severity, Severity::High);
        assert_eq!(analysis.confidence, 87);
        assert_eq!(analysis.symptoms.len(), 2);
        assert!(analysis.is_complete());
    }

    #[test]
    fn test_sparse_analysis_is_placeholder_filled() {
        let analysis =
            extract_crop_analysis(r#"{"disease": "Healthy", "confidence": 95}"#).unwrap();
        assert_eq!(analysis.disease, "Healthy");
        assert_eq!(analysis.severity, Severity::Low);
        assert_eq!(analysis.crop_type, "Not identified");
        assert!(analysis.symptoms.is_empty());
        assert!(analysis.is_complete());
    }

    #[test]
    fn test_confidence_string_coercion() {
        let analysis =
            extract_crop_analysis(r#"{"disease": "Rust", "confidence": "about 80%"}"#).unwrap();
        assert_eq!(analysis.confidence, 80);

        let analysis =
            extract_crop_analysis(r#"{"disease": "Rust", "confidence": "unsure"}"#).unwrap();
        assert_eq!(analysis.confidence, 0);
    }

    #[test]
    fn test_lone_string_symptom_is_wrapped() {
        let analysis =
            extract_crop_analysis(r#"{"disease": "Rust", "symptoms": "orange pustules"}"#)
                .unwrap();
        assert_eq!(analysis.symptoms, vec!["orange pustules"]);
    }

    #[test]
    fn test_product_list_is_capped() {
        let products: Vec<String> = (1..=9).map(|i| format!("product-{}", i)).collect();
        let text = json!({"disease": "Rust", "recommendedProducts": products}).to_string();
        let analysis = extract_crop_analysis(&text).unwrap();
        assert_eq!(analysis.recommended_products.len(), MAX_RECOMMENDED_PRODUCTS);
        assert_eq!(analysis.recommended_products[0], "product-1");
    }

    #[test]
    fn test_short_description_is_expanded() {
        let text = json!({
            "disease": "Powdery Mildew",
            "severity": "medium",
            "confidence": 70,
            "description": "White coating on leaves",
            "symptoms": ["white powder", "leaf curl"]
        })
        .to_string();

        let analysis = extract_crop_analysis(&text).unwrap();
        assert!(analysis.description.len() >= 120);
        assert!(analysis.description.starts_with("White coating on leaves."));
        assert!(analysis.description.contains("Powdery Mildew"));
        assert!(analysis.description.contains("70% confidence"));
        assert!(analysis.description.contains("white powder, leaf curl"));
    }

    #[test]
    fn test_long_description_is_kept_verbatim() {
        let analysis = extract_crop_analysis(&rich_sample()).unwrap();
        assert!(analysis.description.starts_with("Large irregular brown lesions"));
        assert!(!analysis.description.contains("consistent with"));
    }

    #[test]
    fn test_object_without_disease_is_unusable() {
        assert!(extract_crop_analysis(r#"{"severity": "high", "confidence": 90}"#).is_none());
        assert!(extract_crop_analysis("I cannot analyze this image.").is_none());
        assert!(extract_crop_analysis("").is_none());
    }

    #[test]
    fn test_skips_block_without_disease() {
        let text = r#"{"note": "thinking"} {"disease": "Rust", "severity": "low"}"#;
        let analysis = extract_crop_analysis(text).unwrap();
        assert_eq!(analysis.disease, "Rust");
    }

    #[test]
    fn test_fallback_is_complete_and_deterministic() {
        let a = CropAnalysis::fallback();
        let b = CropAnalysis::fallback();
        assert_eq!(a, b);
        assert_eq!(a.disease, "Analysis pending");
        assert_eq!(a.confidence, 0);
        assert!(a.is_complete());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = format!("Here you go:\n```json\n{}\n```\nGood luck!", rich_sample());
        let first = extract_crop_analysis(&text).unwrap();
        let second = extract_crop_analysis(&text).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_camel_case_serialization() {
        let json = serde_json::to_value(CropAnalysis::fallback()).unwrap();
        assert!(json.get("cropType").is_some());
        assert!(json.get("possibleCauses").is_some());
        assert!(json.get("crop_type").is_none());
    }
}
