use super::*;
use crate::llm::types::ImageSource;

// ===== request building =====

#[test]
fn system_prompt_leads_messages() {
    let messages = vec![Message { role: "user".into(), content: Content::Text("make a form".into()) }];
    let built = build_chat_completions_messages("be helpful", &messages);
    let json = serde_json::to_value(&built).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            { "role": "system", "content": "be helpful" },
            { "role": "user", "content": "make a form" }
        ])
    );
}

#[test]
fn blank_system_prompt_is_omitted() {
    let messages = vec![Message { role: "user".into(), content: Content::Text("hi".into()) }];
    let built = build_chat_completions_messages("  ", &messages);
    assert_eq!(built.len(), 1);
}

#[test]
fn images_become_image_url_parts() {
    let messages = vec![Message {
        role: "user".into(),
        content: Content::Blocks(vec![
            ContentBlock::Text { text: "like this".into() },
            ContentBlock::Image {
                source: ImageSource::Base64 { media_type: "image/png".into(), data: "AAAA".into() },
            },
        ]),
    }];
    let json = serde_json::to_value(build_chat_completions_messages("", &messages)).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "role": "user",
            "content": [
                { "type": "text", "text": "like this" },
                { "type": "image_url", "image_url": { "url": "data:image/png;base64,AAAA" } }
            ]
        }])
    );
}

#[test]
fn text_only_blocks_flatten_to_string() {
    let messages = vec![Message {
        role: "assistant".into(),
        content: Content::Blocks(vec![
            ContentBlock::Thinking { thinking: "plan".into() },
            ContentBlock::Text { text: "done".into() },
        ]),
    }];
    let json = serde_json::to_value(build_chat_completions_messages("", &messages)).unwrap();
    assert_eq!(json, serde_json::json!([{ "role": "assistant", "content": "done" }]));
}

#[test]
fn request_carries_sampling_settings() {
    let body = CcRequest { model: "m", max_tokens: 1024, temperature: 0.5, messages: &[] };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["max_tokens"], 1024);
    assert_eq!(json["temperature"], 0.5);
    assert_eq!(json["model"], "m");
}

// ===== response parsing =====

#[test]
fn cc_parse_text_response() {
    let json = serde_json::json!({
        "model": "llama-3.3-70b-versatile",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Hello!" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Hello!"));
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
    assert_eq!(resp.model, "llama-3.3-70b-versatile");
}

#[test]
fn cc_parse_length_finish() {
    let json = serde_json::json!({
        "choices": [{ "message": { "content": "partial" }, "finish_reason": "length" }]
    })
    .to_string();
    assert_eq!(parse_chat_completions_response(&json).unwrap().stop_reason, "max_tokens");
}

#[test]
fn cc_parse_null_content_is_empty() {
    let json = serde_json::json!({
        "choices": [{ "message": { "content": null }, "finish_reason": "stop" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert!(resp.content.is_empty());
    assert_eq!(resp.text(), "");
}

#[test]
fn cc_parse_missing_choices() {
    let json = serde_json::json!({ "model": "m", "choices": [] }).to_string();
    assert!(parse_chat_completions_response(&json).is_err());
}

#[test]
fn cc_parse_invalid_json() {
    assert!(matches!(parse_chat_completions_response("not json"), Err(LlmError::ApiParse(_))));
}
