use super::*;
use crate::markup::locate::locate_markup;
use crate::markup::parse::parse_program;
use crate::markup::syntax::JsxName;

fn compile_src(src: &str) -> Compiled {
    let program = parse_program(src).expect("parse");
    let markup = locate_markup(&program).expect("markup");
    compile_markup(markup, &CompileLimits::default())
}

fn tree(src: &str) -> TreeNode {
    compile_src(src).tree
}

fn props_of(node: &TreeNode) -> &Props {
    match node {
        TreeNode::Element { props, .. } => props,
        other => panic!("expected element, got {other:?}"),
    }
}

fn children_of(node: &TreeNode) -> &[TreeNode] {
    match node {
        TreeNode::Element { children, .. } | TreeNode::Fragment { children } => children,
        TreeNode::Text { .. } => &[],
    }
}

// =============================================================================
// ELEMENTS AND NAMES
// =============================================================================

#[test]
fn button_with_variant() {
    let expected = TreeNode::element(
        "Button",
        Props::from([("variant".to_owned(), PropValue::Str("outline".into()))]),
        vec![TreeNode::text("Hi")],
    );
    assert_eq!(tree(r#"<Button variant="outline">Hi</Button>"#), expected);
}

#[test]
fn whitespace_only_children_are_omitted() {
    assert_eq!(tree("<div>   </div>"), TreeNode::element("div", Props::new(), vec![]));
}

#[test]
fn member_names_are_dot_joined() {
    let TreeNode::Element { name, .. } = tree("<Tabs.List></Tabs.List>") else { panic!("expected element") };
    assert_eq!(name, "Tabs.List");
    let TreeNode::Element { name, .. } = tree("<a.b.c />") else { panic!("expected element") };
    assert_eq!(name, "a.b.c");
}

#[test]
fn fragments_have_no_name_or_props() {
    let node = tree("<><b>x</b>y</>");
    let TreeNode::Fragment { children } = node else { panic!("expected fragment") };
    assert_eq!(children.len(), 2);
    assert_eq!(children[1], TreeNode::text("y"));
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

#[test]
fn literal_attributes_pass_through() {
    let node = tree(r#"<X s="a" n={42} f={1.5} t={true} b={false} z={null} tpl={`static`} flag />"#);
    let props = props_of(&node);
    assert_eq!(props["s"], PropValue::Str("a".into()));
    assert_eq!(props["n"], PropValue::Num(42.0));
    assert_eq!(props["f"], PropValue::Num(1.5));
    assert_eq!(props["t"], PropValue::Bool(true));
    assert_eq!(props["b"], PropValue::Bool(false));
    assert_eq!(props["z"], PropValue::Null);
    assert_eq!(props["tpl"], PropValue::Str("static".into()));
    assert_eq!(props["flag"], PropValue::Bool(true));
}

#[test]
fn expression_attributes_are_dropped() {
    let node = tree(
        r#"<X
            onClick={() => alert(1)}
            v={value}
            c={compute()}
            t={`a${b}`}
            sum={1 + 2}
            neg={-1}
            big={10n}
            el={<Y />}
            obj={{ a: 1 }}
            empty={}
            {...rest}
            keep="yes"
        />"#,
    );
    let props = props_of(&node);
    assert_eq!(props.len(), 1, "{props:?}");
    assert_eq!(props["keep"], PropValue::Str("yes".into()));
}

#[test]
fn attribute_strings_decode_entities() {
    let node = tree(r#"<X title="Fish &amp; Chips" />"#);
    assert_eq!(props_of(&node)["title"], PropValue::Str("Fish & Chips".into()));
}

#[test]
fn repeated_attribute_keeps_last_literal_or_is_removed() {
    let node = tree(r#"<X a="1" a="2" b="1" b={dynamic} />"#);
    let props = props_of(&node);
    assert_eq!(props["a"], PropValue::Str("2".into()));
    assert!(!props.contains_key("b"));
}

// =============================================================================
// CHILDREN
// =============================================================================

#[test]
fn text_whitespace_is_collapsed_and_trimmed() {
    let node = tree("<p>\n    Hello,\n    world   !\n  </p>");
    assert_eq!(children_of(&node), &[TreeNode::text("Hello, world !")]);
}

#[test]
fn literal_expression_children_become_text() {
    let node = tree(r#"<p>{"a"}{2}{true}{null}{`t`}{" "}</p>"#);
    let texts: Vec<_> = children_of(&node)
        .iter()
        .map(|child| match child {
            TreeNode::Text { value } => value.as_str(),
            other => panic!("expected text, got {other:?}"),
        })
        .collect();
    assert_eq!(texts, ["a", "2", "true", "null", "t"]);
}

#[test]
fn non_literal_expression_children_are_dropped() {
    let node = tree("<ul>{items.map(i => <li>{i}</li>)}{cond && <b />}{name}<li>kept</li></ul>");
    assert_eq!(children_of(&node).len(), 1);
}

// =============================================================================
// LIMITS
// =============================================================================

fn nested_element(depth: usize) -> JsxElement {
    let mut element =
        JsxElement { name: JsxName::Ident("div".into()), attributes: vec![], children: vec![], self_closing: false };
    for _ in 1..depth {
        element = JsxElement {
            name: JsxName::Ident("div".into()),
            attributes: vec![],
            children: vec![JsxChild::Element(element)],
            self_closing: false,
        };
    }
    element
}

/// Tear a deep syntax tree down without recursive drops.
fn dismantle(root: JsxElement) {
    let mut stack = vec![root];
    while let Some(mut element) = stack.pop() {
        for child in element.children.drain(..) {
            if let JsxChild::Element(inner) = child {
                stack.push(inner);
            }
        }
    }
}

#[test]
fn ten_thousand_nested_children_are_truncated_not_fatal() {
    let root = nested_element(10_000);
    let compiled = compile_markup(Markup::Element(&root), &CompileLimits::default());
    dismantle(root);

    assert!(compiled.truncated);
    assert_eq!(compiled.tree.depth(), 64);
}

#[test]
fn ten_thousand_siblings_hit_the_node_budget() {
    let src = format!("<ul>{}</ul>", "<li />".repeat(10_000));
    let compiled = compile_src(&src);
    assert!(compiled.truncated);
    assert_eq!(compiled.tree.node_count(), 4096);
}

#[test]
fn custom_limits_apply() {
    let program = parse_program("<a><b><c><d /></c></b></a>").unwrap();
    let markup = locate_markup(&program).unwrap();
    let compiled = compile_markup(markup, &CompileLimits { max_depth: 2, max_nodes: 100 });
    assert!(compiled.truncated);
    assert_eq!(compiled.tree.depth(), 2);
}

#[test]
fn within_limits_is_not_truncated() {
    assert!(!compile_src("<a><b>text</b></a>").truncated);
}

#[test]
fn literal_rule_rejects_interpolated_templates() {
    let program = parse_program("`a${b}c`").unwrap();
    let Some(crate::markup::syntax::Stmt::Expr(expr)) = program.body.first() else { panic!("expected expr") };
    assert_eq!(literal_value(expr), None);
}
