use super::*;

#[test]
fn parse_text_response() {
    let json = serde_json::json!({
        "content": [{ "type": "text", "text": "Hello!" }],
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 12, "output_tokens": 3 }
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text, "Hello!");
    assert_eq!(resp.model, "claude-sonnet-4-5-20250929");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.total_tokens(), 15);
}

#[test]
fn text_blocks_are_concatenated_and_others_skipped() {
    let json = serde_json::json!({
        "content": [
            { "type": "thinking", "thinking": "hmm" },
            { "type": "text", "text": "graph TD\n" },
            { "type": "text", "text": "A-->B" }
        ],
        "model": "m",
        "stop_reason": "max_tokens",
        "usage": { "input_tokens": 1, "output_tokens": 1 }
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text, "graph TD\nA-->B");
    assert_eq!(resp.stop_reason, "max_tokens");
}

#[test]
fn null_stop_reason_defaults_to_end_turn() {
    let json = serde_json::json!({
        "content": [],
        "model": "m",
        "stop_reason": null,
        "usage": { "input_tokens": 0, "output_tokens": 0 }
    })
    .to_string();
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.text, "");
    assert_eq!(resp.stop_reason, "end_turn");
}

#[test]
fn parse_missing_usage_fails() {
    let json = serde_json::json!({ "content": [], "model": "m" }).to_string();
    assert!(matches!(parse_response(&json), Err(LlmError::ApiParse(_))));
}

#[test]
fn request_omits_empty_system() {
    let messages = vec![Message::user("hi")];
    let body = ApiRequest { model: "m", max_tokens: 10, temperature: 0.7, system: "", messages: &messages };
    let json = serde_json::to_value(&body).unwrap();
    assert!(json.get("system").is_none());
    assert_eq!(json["messages"][0], serde_json::json!({ "role": "user", "content": "hi" }));
}
