use super::*;
use crate::markup::PropValue;

fn run(source: &str) -> Preview {
    preview(source, &CompileLimits::default(), &Registry::builtin())
}

#[test]
fn literal_markup_previews() {
    let out = run(r#"<Button variant="outline">Hi</Button>"#);
    let Some(TreeNode::Element { name, props, children }) = &out.tree else { panic!("expected element") };
    assert_eq!(name, "Button");
    assert_eq!(props["variant"], PropValue::Str("outline".into()));
    assert_eq!(children, &vec![TreeNode::text("Hi")]);
    assert_eq!(out.parse_error, None);
    assert!(out.html.unwrap().contains("border border-input"));
    assert!(!out.truncated);
}

#[test]
fn whitespace_only_children_vanish() {
    let out = run("<div>   </div>");
    assert_eq!(out.tree, Some(TreeNode::element("div", Default::default(), Vec::new())));
    assert_eq!(out.html.as_deref(), Some("<div></div>"));
}

#[test]
fn no_markup_is_empty_state() {
    let out = run("const x = 1;");
    assert_eq!(out, Preview { tree: None, parse_error: None, html: None, truncated: false });
}

#[test]
fn parse_failure_is_reported() {
    let out = run("this is not code at all");
    assert!(out.tree.is_none());
    assert!(!out.parse_error.unwrap().is_empty());
}

#[test]
fn serializes_camel_case() {
    let json = serde_json::to_value(run("nope nope")).unwrap();
    assert!(json.get("parseError").is_some());
    assert_eq!(json["tree"], serde_json::Value::Null);
    assert_eq!(json["truncated"], false);
}
