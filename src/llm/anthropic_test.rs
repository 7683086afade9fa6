use super::*;
use crate::llm::types::{Content, ImageSource};

fn make_response(content: serde_json::Value) -> String {
    serde_json::json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": content,
        "model": "claude-sonnet-4-5-20250929",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 100, "output_tokens": 50 }
    })
    .to_string()
}

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "Hello world" }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Hello world"));
    assert_eq!(resp.model, "claude-sonnet-4-5-20250929");
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 100);
    assert_eq!(resp.output_tokens, 50);
}

#[test]
fn parse_thinking_then_text() {
    let json = make_response(serde_json::json!([
        { "type": "thinking", "thinking": "layout first" },
        { "type": "text", "text": "```tsx\n<div/>\n```" }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 2);
    assert_eq!(resp.text(), "```tsx\n<div/>\n```");
}

#[test]
fn parse_unknown_content_filtered() {
    let json = make_response(serde_json::json!([
        { "type": "text", "text": "hi" },
        { "type": "some_future_type", "data": {} }
    ]));
    let resp = parse_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
}

#[test]
fn parse_invalid_json_errors() {
    assert!(matches!(parse_response("{"), Err(LlmError::ApiParse(_))));
}

#[test]
fn request_serializes_images_as_base64_sources() {
    let messages = vec![Message {
        role: "user".into(),
        content: Content::Blocks(vec![
            ContentBlock::Text { text: "match this".into() },
            ContentBlock::Image {
                source: ImageSource::Base64 { media_type: "image/webp".into(), data: "UklG".into() },
            },
        ]),
    }];
    let body = ApiRequest { model: "m", max_tokens: 10, temperature: 0.7, system: "", messages: &messages };
    let json = serde_json::to_value(&body).unwrap();
    assert!(json.get("system").is_none());
    assert_eq!(json["messages"][0]["content"][1]["source"]["media_type"], "image/webp");
    assert_eq!(json["messages"][0]["content"][1]["type"], "image");
}
