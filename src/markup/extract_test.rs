use super::*;

#[test]
fn returns_interior_of_tagged_fence() {
    let reply = "Here you go:\n```tsx\n<Button>Hi</Button>\n```\nEnjoy!";
    assert_eq!(extract_code(reply), "<Button>Hi</Button>\n");
    assert_eq!(fenced_language(reply), Some("tsx"));
}

#[test]
fn untagged_fence_has_no_language() {
    let reply = "```\n<div />\n```";
    assert_eq!(extract_code(reply), "<div />\n");
    assert_eq!(fenced_language(reply), None);
}

#[test]
fn only_first_fence_is_used() {
    let reply = "```jsx\n<A />\n```\ntext\n```jsx\n<B />\n```";
    assert_eq!(extract_code(reply), "<A />\n");
}

#[test]
fn no_fence_returns_reply_unchanged() {
    let reply = "<div>plain</div>";
    assert_eq!(extract_code(reply), reply);
}

#[test]
fn unterminated_fence_counts_as_not_found() {
    let reply = "```tsx\n<div>never closed</div>";
    assert_eq!(extract_code(reply), reply);
    assert_eq!(fenced_language(reply), None);
}

#[test]
fn single_line_fence_is_an_untagged_span() {
    let reply = "Here: ```<div>hi</div>``` done";
    assert_eq!(extract_code(reply), "<div>hi</div>");
    assert_eq!(fenced_language(reply), None);
}

#[test]
fn marker_without_newline_or_close_counts_as_not_found() {
    let reply = "dangling ```tsx";
    assert_eq!(extract_code(reply), reply);
}

#[test]
fn empty_body_is_returned_as_empty() {
    assert_eq!(extract_code("```tsx\n```"), "");
}
