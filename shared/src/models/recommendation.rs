//! Farm recommendation records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::{first_array_with_key, string_member};

/// Recommendation priority levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
}

impl RecommendationPriority {
    /// Parse a model-supplied priority, substituting `Medium` for anything
    /// outside the allowed set.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "low" => RecommendationPriority::Low,
            "high" => RecommendationPriority::High,
            _ => RecommendationPriority::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationPriority::Low => "low",
            RecommendationPriority::Medium => "medium",
            RecommendationPriority::High => "high",
        }
    }
}

/// Allowed recommendation types for one call site
///
/// The list is caller-defined: out-of-list values from the model are
/// substituted with the site's fallback rather than rejected, so one bad
/// field never discards an otherwise-good record.
#[derive(Debug, Clone, Copy)]
pub struct TypeAllowList {
    pub allowed: &'static [&'static str],
    pub fallback: &'static str,
}

impl TypeAllowList {
    /// Normalize a raw type value against the list.
    pub fn normalize(&self, raw: Option<&str>) -> String {
        let value = raw.unwrap_or(self.fallback).trim().to_lowercase();
        if self.allowed.contains(&value.as_str()) {
            value
        } else {
            self.fallback.to_string()
        }
    }
}

/// Field-operation types used by the planting-calendar call sites
pub const FIELD_OPERATION_TYPES: TypeAllowList = TypeAllowList {
    allowed: &["planting", "irrigation", "fertilizer", "pesticide", "harvest"],
    fallback: "fertilizer",
};

/// Stewardship types used by the farm-overview call sites
pub const STEWARDSHIP_TYPES: TypeAllowList = TypeAllowList {
    allowed: &[
        "soil",
        "crop_management",
        "irrigation",
        "pest_management",
        "monitoring",
    ],
    fallback: "crop_management",
};

/// A generated recommendation, validated and ready to store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedRecommendation {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub rec_type: String,
    pub priority: RecommendationPriority,
}

impl GeneratedRecommendation {
    /// Normalize one raw batch item against the call site's allow-list.
    /// Title and description must be present and non-empty.
    pub fn from_value(v: &Value, types: &TypeAllowList) -> Option<Self> {
        let title = string_member(v, "title")?;
        let description = string_member(v, "description")?;
        let rec_type = types.normalize(string_member(v, "type").as_deref());
        let priority = string_member(v, "priority")
            .map(|s| RecommendationPriority::parse_or_default(&s))
            .unwrap_or(RecommendationPriority::Medium);

        Some(Self {
            title,
            description,
            rec_type,
            priority,
        })
    }
}

/// Extract a non-empty recommendation batch from raw model output.
pub fn extract_recommendation_batch(
    text: &str,
    types: &TypeAllowList,
) -> Option<Vec<GeneratedRecommendation>> {
    let items = first_array_with_key(text, "recommendations")?;
    let recommendations: Vec<GeneratedRecommendation> = items
        .iter()
        .filter_map(|item| GeneratedRecommendation::from_value(item, types))
        .collect();

    if recommendations.is_empty() {
        None
    } else {
        Some(recommendations)
    }
}

/// Hand-authored recommendation batch used when no provider yields a usable
/// result. The irrigation entry branches on whether the farm already has an
/// irrigation system.
pub fn default_recommendation_batch(has_irrigation: bool) -> Vec<GeneratedRecommendation> {
    vec![
        GeneratedRecommendation {
            title: "Soil Testing & Analysis".to_string(),
            description: "Conduct comprehensive soil test for pH, nutrients, and organic matter."
                .to_string(),
            rec_type: "soil".to_string(),
            priority: RecommendationPriority::High,
        },
        GeneratedRecommendation {
            title: "Implement Crop Rotation Plan".to_string(),
            description: "Establish 3-4 year crop rotation to maintain soil health.".to_string(),
            rec_type: "crop_management".to_string(),
            priority: RecommendationPriority::High,
        },
        GeneratedRecommendation {
            title: if has_irrigation {
                "Optimize Irrigation System".to_string()
            } else {
                "Install Drip Irrigation".to_string()
            },
            description: if has_irrigation {
                "Review irrigation schedule based on rainfall and crop needs.".to_string()
            } else {
                "Install drip irrigation for water efficiency.".to_string()
            },
            rec_type: "irrigation".to_string(),
            priority: RecommendationPriority::High,
        },
        GeneratedRecommendation {
            title: "Integrated Pest Management".to_string(),
            description:
                "Use cultural, biological, and chemical controls to manage pests effectively."
                    .to_string(),
            rec_type: "pest_management".to_string(),
            priority: RecommendationPriority::High,
        },
        GeneratedRecommendation {
            title: "Weekly Farm Monitoring".to_string(),
            description: "Scout fields weekly for pests, diseases, and weeds. Keep detailed records."
                .to_string(),
            rec_type: "monitoring".to_string(),
            priority: RecommendationPriority::High,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_substitution() {
        assert_eq!(
            RecommendationPriority::parse_or_default("HIGH"),
            RecommendationPriority::High
        );
        assert_eq!(
            RecommendationPriority::parse_or_default("urgent"),
            RecommendationPriority::Medium
        );
    }

    #[test]
    fn test_allow_list_substitution() {
        assert_eq!(STEWARDSHIP_TYPES.normalize(Some("Irrigation")), "irrigation");
        assert_eq!(
            STEWARDSHIP_TYPES.normalize(Some("hydroponics")),
            "crop_management"
        );
        assert_eq!(STEWARDSHIP_TYPES.normalize(None), "crop_management");
        assert_eq!(FIELD_OPERATION_TYPES.normalize(Some("hydroponics")), "fertilizer");
    }

    #[test]
    fn test_out_of_list_values_are_substituted() {
        let item = json!({
            "title": "X",
            "description": "Y",
            "type": "hydroponics",
            "priority": "urgent"
        });
        let rec = GeneratedRecommendation::from_value(&item, &STEWARDSHIP_TYPES).unwrap();
        assert_eq!(rec.rec_type, "crop_management");
        assert_eq!(rec.priority, RecommendationPriority::Medium);
    }

    #[test]
    fn test_extract_batch() {
        let text = r#"{"recommendations": [
            {"title": "Mulch beds", "description": "Retain moisture.", "type": "soil", "priority": "low"},
            {"title": "No description"}
        ]}"#;
        let batch = extract_recommendation_batch(text, &STEWARDSHIP_TYPES).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].rec_type, "soil");
        assert_eq!(batch[0].priority, RecommendationPriority::Low);
    }

    #[test]
    fn test_extract_batch_unusable_cases() {
        assert!(extract_recommendation_batch("plain prose", &STEWARDSHIP_TYPES).is_none());
        assert!(
            extract_recommendation_batch(r#"{"recommendations": []}"#, &STEWARDSHIP_TYPES)
                .is_none()
        );
    }

    #[test]
    fn test_default_batch_branches_on_irrigation() {
        let with = default_recommendation_batch(true);
        let without = default_recommendation_batch(false);

        assert_eq!(with.len(), 5);
        assert_eq!(with[2].title, "Optimize Irrigation System");
        assert_eq!(without[2].title, "Install Drip Irrigation");
    }

    #[test]
    fn test_default_batch_types_are_in_list() {
        for rec in default_recommendation_batch(false) {
            assert!(STEWARDSHIP_TYPES.allowed.contains(&rec.rec_type.as_str()));
        }
    }
}
