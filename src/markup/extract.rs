//! Fenced code span extraction from a free-text model reply.

const FENCE: &str = "```";

/// Location of the first complete fenced span.
struct Fence<'a> {
    language: &'a str,
    body: &'a str,
}

fn first_fence(reply: &str) -> Option<Fence<'_>> {
    let open = reply.find(FENCE)?;
    let after_marker = &reply[open + FENCE.len()..];

    // A fence closed on its opening line is an untagged span: ```<b>x</b>```
    let line_end = after_marker.find('\n').unwrap_or(after_marker.len());
    if let Some(close) = after_marker[..line_end].find(FENCE) {
        return Some(Fence { language: "", body: &after_marker[..close] });
    }

    // Otherwise the tag line runs to the newline and the body follows it.
    let newline = after_marker.find('\n')?;
    let language = after_marker[..newline].trim();
    let rest = &after_marker[newline + 1..];

    let close = rest.find(FENCE)?;
    Some(Fence { language, body: &rest[..close] })
}

/// Return the interior of the first fenced code span, or the whole reply when
/// there is no complete fence.
#[must_use]
pub fn extract_code(reply: &str) -> &str {
    first_fence(reply).map_or(reply, |fence| fence.body)
}

/// Language tag of the first complete fence (`tsx`, `jsx`, …), if any.
#[must_use]
pub fn fenced_language(reply: &str) -> Option<&str> {
    first_fence(reply)
        .map(|fence| fence.language)
        .filter(|lang| !lang.is_empty())
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
