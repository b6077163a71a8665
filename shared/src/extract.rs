//! JSON extraction from free-form model output
//!
//! Language models wrap their JSON in prose, markdown fences, and trailing
//! commentary. This module locates balanced top-level JSON objects inside a
//! text blob so the per-record normalizers can pick the block they expect.

use serde_json::Value;

/// Remove markdown code fence markers so fenced JSON scans like bare JSON.
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}

/// Byte ranges of every balanced top-level `{...}` block, in order.
///
/// The scan tracks string literals and escape sequences, so braces inside
/// string values do not unbalance the count. Unterminated blocks are dropped.
fn balanced_blocks(text: &str) -> Vec<(usize, usize)> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if depth > 0 && in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    blocks.push((start, i + c.len_utf8()));
                }
            }
            '"' if depth > 0 => in_string = true,
            _ => {}
        }
    }

    blocks
}

/// Every parseable top-level JSON object in the text, in order of appearance.
pub fn json_candidates(text: &str) -> Vec<Value> {
    let cleaned = strip_code_fences(text);
    if cleaned.trim().is_empty() {
        return Vec::new();
    }

    balanced_blocks(&cleaned)
        .into_iter()
        .filter_map(|(start, end)| serde_json::from_str(&cleaned[start..end]).ok())
        .collect()
}

/// Items of the first parseable object whose `key` member is an array.
///
/// Blocks without the key (or with a non-array value under it) are skipped,
/// so commentary objects ahead of the payload do not shadow it.
pub fn first_array_with_key(text: &str, key: &str) -> Option<Vec<Value>> {
    json_candidates(text).into_iter().find_map(|v| match v.get(key) {
        Some(Value::Array(items)) => Some(items.clone()),
        _ => None,
    })
}

/// Read a string member, trimmed. Absent, null, non-string, or empty values
/// all read as `None`.
pub fn string_member(v: &Value, key: &str) -> Option<String> {
    let s = v.get(key)?.as_str()?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Coerce a member into a list of strings: arrays keep their non-empty
/// string items, a lone string becomes a one-element list, anything else is
/// an empty list.
pub fn string_list_member(v: &Value, key: &str) -> Vec<String> {
    match v.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

/// Coerce a confidence-like member into an integer in [0, 100].
///
/// Numbers are rounded and clamped. Strings are parsed after stripping every
/// non-digit character, so "about 80%" reads as 80. Anything else, including
/// digit runs too long to parse, reads as 0.
pub fn clamped_percent(v: &Value, key: &str) -> i32 {
    match v.get(key) {
        Some(Value::Number(n)) => {
            let value = n.as_f64().unwrap_or(0.0);
            value.round().clamp(0.0, 100.0) as i32
        }
        Some(Value::String(s)) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            digits
                .parse::<i64>()
                .map(|n| n.clamp(0, 100) as i32)
                .unwrap_or(0)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidates_from_plain_json() {
        let candidates = json_candidates(r#"{"disease": "Rust", "confidence": 90}"#);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["disease"], "Rust");
    }

    #[test]
    fn test_candidates_strip_fences_and_prose() {
        let text = "Sure! Here's the data:\n```json\n{\"alerts\": [{\"level\": \"critical\"}]}\n```\nLet me know.";
        let candidates = json_candidates(text);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0]["alerts"].is_array());
    }

    #[test]
    fn test_candidates_handle_nested_objects() {
        let text = r#"prefix {"outer": {"inner": {"deep": 1}}, "list": [{"a": 1}, {"b": 2}]} suffix"#;
        let candidates = json_candidates(text);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["outer"]["inner"]["deep"], 1);
    }

    #[test]
    fn test_candidates_ignore_braces_inside_strings() {
        let text = r#"{"message": "watch out for } and { in text", "ok": true}"#;
        let candidates = json_candidates(text);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["ok"], true);
    }

    #[test]
    fn test_candidates_skip_unparseable_blocks() {
        let text = r#"{not json at all} and then {"valid": 1}"#;
        let candidates = json_candidates(text);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0]["valid"], 1);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(json_candidates("").is_empty());
        assert!(json_candidates("   \n\t ").is_empty());
        assert!(json_candidates("I cannot analyze this image.").is_empty());
    }

    #[test]
    fn test_unterminated_block_is_dropped() {
        assert!(json_candidates(r#"{"open": "never closes"#).is_empty());
    }

    #[test]
    fn test_first_array_with_key_skips_other_blocks() {
        let text = r#"{"note": "ignore me"} {"alerts": [{"title": "A"}]}"#;
        let items = first_array_with_key(text, "alerts").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "A");
    }

    #[test]
    fn test_first_array_with_key_rejects_non_array() {
        let text = r#"{"alerts": "not a list"}"#;
        assert!(first_array_with_key(text, "alerts").is_none());
    }

    #[test]
    fn test_string_member_trims_and_rejects_empty() {
        let v = json!({"title": "  Pest Risk  ", "blank": "   ", "num": 4});
        assert_eq!(string_member(&v, "title").as_deref(), Some("Pest Risk"));
        assert!(string_member(&v, "blank").is_none());
        assert!(string_member(&v, "num").is_none());
        assert!(string_member(&v, "missing").is_none());
    }

    #[test]
    fn test_string_list_member_wraps_lone_string() {
        let v = json!({"symptoms": "yellowing leaves"});
        assert_eq!(string_list_member(&v, "symptoms"), vec!["yellowing leaves"]);
    }

    #[test]
    fn test_string_list_member_filters_non_strings() {
        let v = json!({"symptoms": ["spots", 42, "", "wilting"]});
        assert_eq!(string_list_member(&v, "symptoms"), vec!["spots", "wilting"]);
        assert!(string_list_member(&v, "missing").is_empty());
    }

    #[test]
    fn test_clamped_percent_numbers() {
        assert_eq!(clamped_percent(&json!({"confidence": 85}), "confidence"), 85);
        assert_eq!(clamped_percent(&json!({"confidence": 85.6}), "confidence"), 86);
        assert_eq!(clamped_percent(&json!({"confidence": 140}), "confidence"), 100);
        assert_eq!(clamped_percent(&json!({"confidence": -3}), "confidence"), 0);
    }

    #[test]
    fn test_clamped_percent_strings() {
        assert_eq!(clamped_percent(&json!({"confidence": "about 80%"}), "confidence"), 80);
        assert_eq!(clamped_percent(&json!({"confidence": "95"}), "confidence"), 95);
        assert_eq!(clamped_percent(&json!({"confidence": "high"}), "confidence"), 0);
        assert_eq!(clamped_percent(&json!({"confidence": null}), "confidence"), 0);
        assert_eq!(clamped_percent(&json!({}), "confidence"), 0);
    }
}
