use super::*;
use crate::markup::{CompileLimits, PropValue, compile_reply};

fn html_for(source: &str) -> String {
    let outcome = compile_reply(source, &CompileLimits::default());
    render_html(outcome.tree(), &Registry::builtin()).expect("tree")
}

#[test]
fn absent_tree_renders_nothing() {
    assert_eq!(render(None, &Registry::builtin()), None);
}

#[test]
fn registry_hit_instantiates_component() {
    let node = TreeNode::element("Button", Props::new(), vec![TreeNode::text("Go")]);
    let Rendered::Element { tag, attrs, children } = resolve(&node, &Registry::builtin()) else {
        panic!("expected element");
    };
    assert_eq!(tag, "button");
    assert!(attrs["className"].as_str().unwrap().contains("bg-primary"));
    assert_eq!(children, vec![Rendered::text("Go")]);
}

#[test]
fn unknown_name_falls_back_to_literal_tag() {
    let mut props = Props::new();
    props.insert("title".into(), PropValue::Str("t".into()));
    let node = TreeNode::element("Card", props.clone(), vec![TreeNode::text("body")]);
    assert_eq!(
        resolve(&node, &Registry::builtin()),
        Rendered::element("Card", props, vec![Rendered::text("body")])
    );
}

#[test]
fn empty_registry_renders_everything_literally() {
    let node = TreeNode::element("Button", Props::new(), Vec::new());
    assert_eq!(resolve(&node, &Registry::empty()), Rendered::element("Button", Props::new(), Vec::new()));
}

#[test]
fn fragment_children_are_keyed_by_position() {
    let node = TreeNode::Fragment { children: vec![TreeNode::text("a"), TreeNode::text("b")] };
    let Rendered::Fragment(children) = resolve(&node, &Registry::builtin()) else {
        panic!("expected fragment");
    };
    let keys: Vec<usize> = children.iter().map(|c| c.key).collect();
    assert_eq!(keys, vec![0, 1]);
}

#[test]
fn compound_names_resolve_like_flat_names() {
    let a = html_for(r#"<Tabs.List className="w-full"><Tabs.Trigger value="a">A</Tabs.Trigger></Tabs.List>"#);
    let b = html_for(r#"<TabsList className="w-full"><TabsTrigger value="a">A</TabsTrigger></TabsList>"#);
    assert_eq!(a, b);
    assert!(a.starts_with("<div "));
    assert!(a.contains(r#"role="tablist""#));
}

#[test]
fn uppercase_url_attributes_are_sanitized_end_to_end() {
    let html = html_for(r#"<svg><a HREF="javascript:alert(1)" xlink:HREF="javascript:alert(2)"><animate attributeName="href" values="javascript:alert(3)" /></a><button FormAction="javascript:alert(4)">go</button></svg>"#);
    assert!(!html.contains("javascript:"), "{html}");
    assert!(!html.contains("<animate"), "{html}");
    assert!(html.contains("go</button>"), "{html}");
}

#[test]
fn end_to_end_html_is_inert() {
    let html = html_for(
        r#"```tsx
export default function X() {
  return (
    <div className="p-4" onClick={() => alert(1)}>
      <a href="javascript:alert(1)">link</a>
      <script>alert(1)</script>
      <Button variant="outline" size="sm">Save</Button>
    </div>
  );
}
```"#,
    );
    assert!(!html.contains("onClick"));
    assert!(!html.contains("javascript:"));
    assert!(!html.contains("<script"));
    assert!(html.contains("<a>link</a>"));
    assert!(html.contains("border border-input"));
    assert!(html.contains(">Save</button>"));
}
