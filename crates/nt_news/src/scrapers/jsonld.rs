use scraper::{Html, Selector};
use serde_json::Value;

/// Extracts the first image URL declared in JSON-LD metadata.
///
/// Handles `"image": "url"`, `"image": {"url": ...}` and arrays of either,
/// at the top level or inside an `@graph`.
pub fn extract_image(document: &Html) -> Option<String> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;

    document.select(&selector).find_map(|script| {
        let json = serde_json::from_str::<Value>(script.text().collect::<String>().trim()).ok()?;
        match json.get("@graph").and_then(Value::as_array) {
            Some(graph) => graph.iter().find_map(|node| node.get("image").and_then(image_value)),
            None => json.get("image").and_then(image_value),
        }
    })
}

fn image_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(obj) => obj.get("url").and_then(image_value),
        Value::Array(arr) => arr.iter().find_map(image_value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_image_shapes() {
        let html = r#"<script type="application/ld+json">{"@type": "NewsArticle", "image": {"url": "https://x/a.jpg"}}</script>"#;
        assert_eq!(extract_image(&Html::parse_document(html)).as_deref(), Some("https://x/a.jpg"));

        let html = r#"<script type="application/ld+json">{"@graph": [{"@type": "WebPage"}, {"image": ["https://x/b.jpg"]}]}</script>"#;
        assert_eq!(extract_image(&Html::parse_document(html)).as_deref(), Some("https://x/b.jpg"));

        let html = r#"<script type="application/ld+json">not json</script>"#;
        assert!(extract_image(&Html::parse_document(html)).is_none());
    }
}
