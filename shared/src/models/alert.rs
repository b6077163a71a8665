//! Farm alert records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::{first_array_with_key, string_member};

/// Alert severity levels, ordered by urgency
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

impl AlertLevel {
    /// Parse a model-supplied level, substituting `Info` for anything
    /// outside the allowed set.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "critical" => AlertLevel::Critical,
            "warning" => AlertLevel::Warning,
            _ => AlertLevel::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Info => "info",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }
}

/// A generated farm alert, validated and ready to store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedAlert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

impl GeneratedAlert {
    /// Normalize one raw batch item. Title and message must be present and
    /// non-empty; an out-of-list or missing level falls back to `info`.
    pub fn from_value(v: &Value) -> Option<Self> {
        let title = string_member(v, "title")?;
        let message = string_member(v, "message")?;
        let level = string_member(v, "level")
            .map(|s| AlertLevel::parse_or_default(&s))
            .unwrap_or(AlertLevel::Info);

        Some(Self {
            level,
            title,
            message,
        })
    }
}

/// Extract a non-empty alert batch from raw model output.
///
/// Returns `None` when no JSON block carries a usable `alerts` array, which
/// tells the caller to fall through to the next provider or the default
/// batch.
pub fn extract_alert_batch(text: &str) -> Option<Vec<GeneratedAlert>> {
    let items = first_array_with_key(text, "alerts")?;
    let alerts: Vec<GeneratedAlert> = items.iter().filter_map(GeneratedAlert::from_value).collect();

    if alerts.is_empty() {
        None
    } else {
        Some(alerts)
    }
}

/// Hand-authored alert batch used when no provider yields a usable result.
///
/// Text is interpolated from the farm profile so the batch stays specific to
/// the farm while remaining fully deterministic.
pub fn default_alert_batch(
    area_ha: Option<&str>,
    soil_type: Option<&str>,
    has_irrigation: bool,
) -> Vec<GeneratedAlert> {
    let area = area_ha.map(|a| format!("{}ha ", a)).unwrap_or_default();
    let soil = soil_type.unwrap_or("mixed");

    vec![
        GeneratedAlert {
            level: AlertLevel::Critical,
            title: "Regular Crop Monitoring Required".to_string(),
            message: format!(
                "Monitor your {}farm regularly for signs of pest, disease, or stress.",
                area
            ),
        },
        GeneratedAlert {
            level: AlertLevel::Warning,
            title: format!("{} Management Alert", soil_type.unwrap_or("Soil")),
            message: format!(
                "Your farm has {} soil. Apply appropriate amendments for optimal crop growth.",
                soil
            ),
        },
        GeneratedAlert {
            level: AlertLevel::Warning,
            title: if has_irrigation {
                "Optimize Irrigation".to_string()
            } else {
                "Water Management Critical".to_string()
            },
            message: if has_irrigation {
                "Review irrigation schedule and ensure proper water distribution across all plots."
                    .to_string()
            } else {
                "Implement water conservation strategies and monitor soil moisture carefully."
                    .to_string()
            },
        },
        GeneratedAlert {
            level: AlertLevel::Info,
            title: "Preventive Care Schedule".to_string(),
            message: "Schedule regular field inspections weekly and maintain detailed records of all farm activities.".to_string(),
        },
    ]
}
