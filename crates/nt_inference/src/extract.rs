use lazy_static::lazy_static;
use nt_core::{NEUTRAL_BIAS, NO_SUMMARY};
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref SUMMARY_RE: Regex =
        Regex::new(r#""summary"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid summary regex");
    static ref BIAS_RE: Regex =
        Regex::new(r#""(?:emotional_bias|counterarguments)"\s*:\s*"((?:[^"\\]|\\.)*)""#)
            .expect("valid bias regex");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisFields {
    pub summary: String,
    pub emotional_bias: String,
}

/// Pulls `summary` and `emotional_bias` out of free-form model output.
///
/// Tries, in order: the whole text as JSON, the outermost balanced `{...}`
/// span as JSON, then per-field regexes. Missing fields take the defaults.
/// Never fails.
pub fn extract(raw: &str) -> AnalysisFields {
    let raw = raw.trim();

    if let Some(fields) = from_json(raw) {
        return fields;
    }
    if let Some(fields) = outermost_object(raw).and_then(from_json) {
        return fields;
    }

    tracing::debug!("model output is not JSON, scanning for fields");
    AnalysisFields {
        summary: capture(&SUMMARY_RE, raw).unwrap_or_else(|| NO_SUMMARY.to_string()),
        emotional_bias: capture(&BIAS_RE, raw).unwrap_or_else(|| NEUTRAL_BIAS.to_string()),
    }
}

fn from_json(text: &str) -> Option<AnalysisFields> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;

    let summary = object.get("summary").map(as_text);
    let bias = object
        .get("emotional_bias")
        .or_else(|| object.get("counterarguments"))
        .map(as_text);
    if summary.is_none() && bias.is_none() {
        return None;
    }

    Some(AnalysisFields {
        summary: summary.unwrap_or_else(|| NO_SUMMARY.to_string()),
        emotional_bias: bias.unwrap_or_else(|| NEUTRAL_BIAS.to_string()),
    })
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(as_text).collect::<Vec<_>>().join("\n"),
        other => other.to_string(),
    }
}

/// The span from the first `{` to its matching `}`, skipping braces that
/// appear inside string literals.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    let inner = re.captures(text)?.get(1)?.as_str();
    // Reuse the JSON string grammar for escapes; keep the raw text otherwise.
    let unescaped = serde_json::from_str::<String>(&format!("\"{}\"", inner))
        .unwrap_or_else(|_| inner.to_string());
    Some(unescaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(summary: &str, bias: &str) -> AnalysisFields {
        AnalysisFields {
            summary: summary.to_string(),
            emotional_bias: bias.to_string(),
        }
    }

    #[test]
    fn test_strict_json() {
        let raw = r#"{"summary":"S","emotional_bias":"B"}"#;
        assert_eq!(extract(raw), fields("S", "B"));
    }

    #[test]
    fn test_json_wrapped_in_prose() {
        let raw = "Sure! Here is the analysis:\n```json\n{\"summary\": \"Rates {held}\", \"emotional_bias\": \"Calm\"}\n```\nHope that helps.";
        assert_eq!(extract(raw), fields("Rates {held}", "Calm"));
    }

    #[test]
    fn test_counterarguments_alias_and_missing_summary() {
        let raw = r#"{"counterarguments": ["one", "two"]}"#;
        assert_eq!(extract(raw), fields(NO_SUMMARY, "one\ntwo"));
    }

    #[test]
    fn test_broken_json_falls_back_to_regex() {
        let raw = r#"{"summary": "Line \"quoted\"", "emotional_bias": "Mild", oops"#;
        assert_eq!(extract(raw), fields("Line \"quoted\"", "Mild"));
    }

    #[test]
    fn test_plain_prose_gets_defaults() {
        assert_eq!(
            extract("The article is about the weather."),
            fields(NO_SUMMARY, NEUTRAL_BIAS)
        );
        assert_eq!(extract(""), fields(NO_SUMMARY, NEUTRAL_BIAS));
    }

    #[test]
    fn test_object_without_known_keys_is_ignored() {
        let raw = r#"{"other": 1} then "summary": "late""#;
        assert_eq!(extract(raw), fields("late", NEUTRAL_BIAS));
    }

    #[test]
    fn test_outermost_object_ignores_braces_in_strings() {
        let text = r#"x {"a": "}{", "b": {"c": 1}} y"#;
        assert_eq!(outermost_object(text), Some(r#"{"a": "}{", "b": {"c": 1}}"#));
        assert_eq!(outermost_object("{ unclosed"), None);
    }
}
