//! Text extraction from the response shapes OpenAI-compatible servers emit.
//!
//! Each matcher is a pure function over the decoded JSON; they are tried in
//! order and the first non-empty string wins.

use serde_json::Value;

pub type ShapeMatcher = fn(&Value) -> Option<String>;

/// Matchers in priority order
pub const SHAPE_MATCHERS: &[(&str, ShapeMatcher)] = &[
    ("chat_content_string", chat_content_string),
    ("chat_content_parts", chat_content_parts),
    ("output_text", output_text),
    ("output_items", output_items),
];

pub fn extract_text(payload: &Value) -> Option<String> {
    SHAPE_MATCHERS.iter().find_map(|(name, matcher)| {
        let text = matcher(payload)?;
        tracing::trace!(shape = name, "Matched reasoning response shape");
        Some(text)
    })
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn choice_contents(payload: &Value) -> impl Iterator<Item = &Value> {
    payload
        .get("choices")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|choice| {
            choice
                .get("message")
                .and_then(|m| m.get("content"))
                .or_else(|| choice.get("delta").and_then(|d| d.get("content")))
        })
}

/// `choices[].message.content` (or `delta.content`) as a plain string
pub fn chat_content_string(payload: &Value) -> Option<String> {
    choice_contents(payload).find_map(|content| content.as_str().and_then(non_empty))
}

/// `choices[].message.content` as an array of `{ text }` parts.
/// Every text part of the first non-empty choice is joined in order, with no separator.
pub fn chat_content_parts(payload: &Value) -> Option<String> {
    choice_contents(payload).find_map(|content| {
        let joined: String = content
            .as_array()?
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();
        non_empty(&joined)
    })
}

/// Flat `output_text` string
pub fn output_text(payload: &Value) -> Option<String> {
    payload
        .get("output_text")
        .and_then(Value::as_str)
        .and_then(non_empty)
}

/// `output[]` message items with `output_text` content parts
pub fn output_items(payload: &Value) -> Option<String> {
    let joined: String = payload
        .get("output")?
        .as_array()?
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    non_empty(&joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_completion_string() {
        let payload = json!({"choices": [{"message": {"role": "assistant", "content": "  Hello.  "}}]});
        assert_eq!(extract_text(&payload).as_deref(), Some("Hello."));
    }

    #[test]
    fn streaming_delta_content() {
        let payload = json!({"choices": [{"delta": {"content": "Hi"}}]});
        assert_eq!(extract_text(&payload).as_deref(), Some("Hi"));
    }

    #[test]
    fn content_parts_are_joined() {
        let payload = json!({"choices": [{"message": {"content": [
            {"type": "text", "text": "Hello "},
            {"type": "text", "text": "world."}
        ]}}]});
        assert_eq!(extract_text(&payload).as_deref(), Some("Hello world."));
    }

    #[test]
    fn flat_output_text() {
        let payload = json!({"output_text": "Cleaned."});
        assert_eq!(extract_text(&payload).as_deref(), Some("Cleaned."));
    }

    #[test]
    fn structured_output_items() {
        let payload = json!({"output": [
            {"type": "reasoning", "content": [{"type": "output_text", "text": "ignored"}]},
            {"type": "message", "content": [
                {"type": "output_text", "text": "Final "},
                {"type": "refusal", "text": "nope"},
                {"type": "output_text", "text": "answer."}
            ]}
        ]});
        assert_eq!(extract_text(&payload).as_deref(), Some("Final answer."));
    }

    #[test]
    fn empty_chat_content_falls_through_to_next_shape() {
        let payload = json!({
            "choices": [{"message": {"content": "   "}}],
            "output_text": "From output_text"
        });
        assert_eq!(extract_text(&payload).as_deref(), Some("From output_text"));
    }

    #[test]
    fn priority_prefers_chat_content() {
        let payload = json!({
            "choices": [{"message": {"content": "From choices"}}],
            "output_text": "From output_text"
        });
        assert_eq!(extract_text(&payload).as_deref(), Some("From choices"));
    }

    #[test]
    fn unknown_shape_yields_none() {
        assert_eq!(extract_text(&json!({"result": "text"})), None);
        assert_eq!(extract_text(&json!({"choices": []})), None);
        assert_eq!(extract_text(&json!(null)), None);
    }
}
