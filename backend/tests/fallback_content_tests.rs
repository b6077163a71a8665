//! Fallback content integration tests
//!
//! With zero providers configured the pipeline must still hand every caller
//! a populated, deterministic batch keyed on the farm profile.

use proptest::prelude::*;

use shared::{
    default_alert_batch, default_recommendation_batch, AlertLevel, CropAnalysis,
    RecommendationPriority, Severity, STEWARDSHIP_TYPES,
};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Two identical farm inputs produce the same alert batch
    #[test]
    fn test_alert_fallback_deterministic() {
        let first = default_alert_batch(Some("12.5"), Some("loam"), true);
        let second = default_alert_batch(Some("12.5"), Some("loam"), true);
        assert_eq!(first, second);
    }

    /// The alert batch interpolates the farm profile
    #[test]
    fn test_alert_fallback_interpolation() {
        let batch = default_alert_batch(Some("8"), Some("clay"), false);

        assert_eq!(batch.len(), 4);
        assert!(batch[0].message.contains("8ha"));
        assert_eq!(batch[1].title, "clay Management Alert");
        assert!(batch[1].message.contains("clay soil"));
    }

    /// Missing profile fields fall back to generic wording
    #[test]
    fn test_alert_fallback_without_profile() {
        let batch = default_alert_batch(None, None, true);

        assert!(batch[0].message.contains("your farm"));
        assert_eq!(batch[1].title, "Soil Management Alert");
        assert!(batch[1].message.contains("mixed soil"));
    }

    /// Alert levels follow the documented critical/warning/warning/info shape
    #[test]
    fn test_alert_fallback_levels() {
        let levels: Vec<AlertLevel> = default_alert_batch(None, None, false)
            .into_iter()
            .map(|a| a.level)
            .collect();

        assert_eq!(
            levels,
            vec![
                AlertLevel::Critical,
                AlertLevel::Warning,
                AlertLevel::Warning,
                AlertLevel::Info,
            ]
        );
    }

    /// A farm without irrigation gets an install recommendation, not an
    /// optimization one
    #[test]
    fn test_recommendation_irrigation_branching() {
        let without = default_recommendation_batch(false);
        let with = default_recommendation_batch(true);

        assert_eq!(without[2].title, "Install Drip Irrigation");
        assert_eq!(without[2].rec_type, "irrigation");
        assert_eq!(with[2].title, "Optimize Irrigation System");
    }

    /// Every fallback recommendation stays inside the stewardship allow-list
    #[test]
    fn test_recommendation_fallback_types() {
        for rec in default_recommendation_batch(false) {
            assert!(STEWARDSHIP_TYPES.allowed.contains(&rec.rec_type.as_str()));
            assert_eq!(rec.priority, RecommendationPriority::High);
        }
    }

    /// The placeholder analysis is explicit about its pending state
    #[test]
    fn test_analysis_fallback_record() {
        let analysis = CropAnalysis::fallback();

        assert_eq!(analysis.disease, "Analysis pending");
        assert_eq!(analysis.severity, Severity::Low);
        assert_eq!(analysis.confidence, 0);
        assert!(analysis.is_complete());
    }

    /// The fallback analysis serializes with the camelCase wire keys
    #[test]
    fn test_analysis_fallback_wire_shape() {
        let json = serde_json::to_value(CropAnalysis::fallback()).unwrap();

        assert!(json.get("cropType").is_some());
        assert!(json.get("immediateActions").is_some());
        assert!(json.get("recommendedProducts").is_some());
        assert!(json.get("crop_type").is_none());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for optional short profile strings
    fn profile_strategy() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-z]{1,12}")
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The alert fallback is deterministic for any farm profile
        #[test]
        fn prop_alert_fallback_deterministic(
            area in profile_strategy(),
            soil in profile_strategy(),
            has_irrigation in any::<bool>()
        ) {
            let first = default_alert_batch(area.as_deref(), soil.as_deref(), has_irrigation);
            let second = default_alert_batch(area.as_deref(), soil.as_deref(), has_irrigation);
            prop_assert_eq!(first, second);
        }

        /// The alert fallback is never empty and always fully populated
        #[test]
        fn prop_alert_fallback_populated(
            area in profile_strategy(),
            soil in profile_strategy(),
            has_irrigation in any::<bool>()
        ) {
            let batch = default_alert_batch(area.as_deref(), soil.as_deref(), has_irrigation);
            prop_assert!(!batch.is_empty());
            for alert in batch {
                prop_assert!(!alert.title.is_empty());
                prop_assert!(!alert.message.is_empty());
            }
        }

        /// The recommendation fallback always carries five populated records
        #[test]
        fn prop_recommendation_fallback_populated(has_irrigation in any::<bool>()) {
            let batch = default_recommendation_batch(has_irrigation);
            prop_assert_eq!(batch.len(), 5);
            for rec in batch {
                prop_assert!(!rec.title.is_empty());
                prop_assert!(!rec.description.is_empty());
            }
        }
    }
}
