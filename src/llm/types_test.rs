use super::*;
use crate::error::ErrorCode;

// =============================================================================
// LlmError::error_code
// =============================================================================

#[test]
fn error_codes_are_stable() {
    let cases: [(LlmError, &str); 6] = [
        (LlmError::ConfigParse("bad".into()), "E_CONFIG_PARSE"),
        (LlmError::MissingApiKey { var: "KEY".into() }, "E_MISSING_API_KEY"),
        (LlmError::ApiRequest("timeout".into()), "E_API_REQUEST"),
        (LlmError::ApiResponse { status: 500, body: "oops".into() }, "E_API_RESPONSE"),
        (LlmError::ApiParse("json".into()), "E_API_PARSE"),
        (LlmError::HttpClientBuild("tls".into()), "E_HTTP_CLIENT_BUILD"),
    ];
    for (err, code) in cases {
        assert_eq!(err.error_code(), code);
    }
}

// =============================================================================
// LlmError::retryable
// =============================================================================

#[test]
fn retryable_api_request() {
    assert!(LlmError::ApiRequest("conn refused".into()).retryable());
}

#[test]
fn retryable_api_response_429_and_5xx() {
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
}

#[test]
fn not_retryable_client_errors() {
    assert!(!LlmError::ApiResponse { status: 400, body: String::new() }.retryable());
    assert!(!LlmError::MissingApiKey { var: "K".into() }.retryable());
    assert!(!LlmError::ApiParse("x".into()).retryable());
}

#[test]
fn display_includes_details() {
    let err = LlmError::MissingApiKey { var: "GROQ_API_KEY".into() };
    assert_eq!(err.to_string(), "missing API key: env var GROQ_API_KEY not set");
}

// =============================================================================
// IMAGES
// =============================================================================

#[test]
fn data_uri_round_trips() {
    let uri = "data:image/png;base64,iVBORw0KGgo=";
    let source = ImageSource::from_data_uri(uri).unwrap();
    assert_eq!(source, ImageSource::Base64 { media_type: "image/png".into(), data: "iVBORw0KGgo=".into() });
    assert_eq!(source.data_uri(), uri);
}

#[test]
fn non_image_or_remote_uris_are_rejected() {
    assert_eq!(ImageSource::from_data_uri("https://example.com/a.png"), None);
    assert_eq!(ImageSource::from_data_uri("data:text/html;base64,PGI+"), None);
    assert_eq!(ImageSource::from_data_uri("data:image/png,raw"), None);
    assert_eq!(ImageSource::from_data_uri("data:image/png;base64,"), None);
}

#[test]
fn image_block_serializes_in_anthropic_shape() {
    let block = ContentBlock::Image {
        source: ImageSource::Base64 { media_type: "image/jpeg".into(), data: "AAAA".into() },
    };
    assert_eq!(
        serde_json::to_value(&block).unwrap(),
        serde_json::json!({
            "type": "image",
            "source": { "type": "base64", "media_type": "image/jpeg", "data": "AAAA" }
        })
    );
}

// =============================================================================
// RESPONSES
// =============================================================================

#[test]
fn response_text_joins_text_blocks() {
    let resp = ChatResponse {
        content: vec![
            ContentBlock::Thinking { thinking: "hmm".into() },
            ContentBlock::Text { text: "a".into() },
            ContentBlock::Text { text: "b".into() },
        ],
        model: "m".into(),
        stop_reason: "end_turn".into(),
        input_tokens: 0,
        output_tokens: 0,
    };
    assert_eq!(resp.text(), "ab");
}

#[test]
fn unknown_blocks_deserialize() {
    let block: ContentBlock = serde_json::from_value(serde_json::json!({ "type": "redacted_thinking" })).unwrap();
    assert!(matches!(block, ContentBlock::Unknown));
}
