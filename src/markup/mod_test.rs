//! End-to-end tests for the reply → tree pipeline.

use super::*;

fn run(reply: &str) -> Outcome {
    compile_reply(reply, &CompileLimits::default())
}

#[test]
fn fenced_component_compiles() {
    let reply = r#"Sure! Here's a login form:

```tsx
import { Button } from "@/components/ui/button";

export default function Login() {
  const [email, setEmail] = useState("");
  return (
    <div className="space-y-4">
      <Label htmlFor="email">Email</Label>
      <Input id="email" type="email" value={email} onChange={(e) => setEmail(e.target.value)} />
      <Button variant="default" disabled={false}>Sign in</Button>
    </div>
  );
}
```

Let me know if you want changes."#;
    let outcome = run(reply);
    let Some(TreeNode::Element { name, props, children }) = outcome.tree() else {
        panic!("expected element, got {outcome:?}");
    };
    assert_eq!(name, "div");
    assert_eq!(props["className"], PropValue::Str("space-y-4".into()));
    assert_eq!(children.len(), 3);

    let TreeNode::Element { props: input_props, .. } = &children[1] else { panic!("expected input") };
    assert!(!input_props.contains_key("value"));
    assert!(!input_props.contains_key("onChange"));
    assert_eq!(input_props["type"], PropValue::Str("email".into()));
    assert_eq!(outcome.parse_error(), None);
}

#[test]
fn bare_markup_without_fence() {
    let outcome = run("<Card><CardTitle>Hello</CardTitle></Card>");
    assert_eq!(outcome.label(), "compiled");
}

#[test]
fn sequence_of_elements_is_not_located() {
    // A comma expression is not itself a markup node.
    let outcome = run("```\n<div>a</div>, <div>b</div>\n```");
    assert_eq!(outcome, Outcome::NoMatch);
}

#[test]
fn no_markup_is_empty_not_error() {
    let outcome = run("```ts\nconst answer = 42;\n```");
    assert_eq!(outcome, Outcome::NoMatch);
    assert_eq!(outcome.tree(), None);
    assert_eq!(outcome.parse_error(), None);
}

#[test]
fn unparseable_reply_reports_diagnostic() {
    let outcome = run("I can't help with that request.");
    assert_eq!(outcome.tree(), None);
    let diagnostic = outcome.parse_error().expect("diagnostic");
    assert!(!diagnostic.is_empty());
    assert!(diagnostic.ends_with(')'), "{diagnostic}");
}

#[test]
fn bare_safety_token_is_not_markup() {
    assert_eq!(run("safe"), Outcome::NoMatch);
}

#[test]
fn deeply_nested_reply_fails_closed() {
    let depth = 10_000;
    let reply = format!("{}{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let outcome = run(&reply);
    assert!(matches!(outcome, Outcome::ParseFailed(_)));
}

#[test]
fn truncation_is_reported() {
    let reply = format!("<ul>{}</ul>", "<li>x</li>".repeat(3_000));
    let outcome = run(&reply);
    assert!(outcome.truncated());
    assert!(outcome.tree().is_some());
}

#[test]
fn tree_serializes_to_tagged_json() {
    let outcome = run(r#"<Button size="sm" count={2} on>Go</Button>"#);
    let json = serde_json::to_value(outcome.tree().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "element",
            "name": "Button",
            "props": { "count": 2.0, "on": true, "size": "sm" },
            "children": [{ "type": "text", "value": "Go" }]
        })
    );
}
