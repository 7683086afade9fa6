use super::*;

fn parse_ok(src: &str) -> Program {
    parse_program(src).unwrap_or_else(|err| panic!("parse failed: {err}\n{src}"))
}

fn only_expr(src: &str) -> Expr {
    let program = parse_ok(src);
    assert_eq!(program.body.len(), 1, "expected one statement");
    match program.body.into_iter().next() {
        Some(Stmt::Expr(expr)) => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn jsx(expr: Expr) -> JsxElement {
    match expr {
        Expr::Jsx(element) => element,
        other => panic!("expected JSX element, got {other:?}"),
    }
}

// =============================================================================
// JSX
// =============================================================================

#[test]
fn parses_bare_element_with_attributes() {
    let element = jsx(only_expr(r#"<Button variant="outline" disabled size={"sm"}>Hi</Button>"#));
    assert_eq!(element.name, JsxName::Ident("Button".into()));
    assert_eq!(element.attributes.len(), 3);
    assert!(matches!(&element.attributes[1], JsxAttribute::Attr { name, value: None } if name == "disabled"));
    assert!(matches!(&element.children[..], [JsxChild::Text(t)] if t == "Hi"));
}

#[test]
fn parses_member_and_namespaced_names() {
    let element = jsx(only_expr("<Tabs.List><svg:rect /></Tabs.List>"));
    assert_eq!(element.name.to_string(), "Tabs.List");
    let JsxChild::Element(inner) = &element.children[0] else { panic!("expected element child") };
    assert_eq!(inner.name, JsxName::Namespaced("svg".into(), "rect".into()));
    assert!(inner.self_closing);
}

#[test]
fn parses_fragments_and_expression_children() {
    let Expr::JsxFragment(fragment) = only_expr("<>a{1}{/* note */}{...rest}<b/></>") else {
        panic!("expected fragment");
    };
    assert!(matches!(fragment.children[0], JsxChild::Text(_)));
    assert!(matches!(fragment.children[1], JsxChild::Expr(Expr::Num(_))));
    assert!(matches!(fragment.children[2], JsxChild::Empty));
    assert!(matches!(fragment.children[3], JsxChild::Spread(_)));
    assert!(matches!(fragment.children[4], JsxChild::Element(_)));
}

#[test]
fn parses_spread_and_element_attributes() {
    let element = jsx(only_expr("<Card {...props} icon=<Icon /> />"));
    assert!(matches!(element.attributes[0], JsxAttribute::Spread(_)));
    assert!(matches!(&element.attributes[1], JsxAttribute::Attr { value: Some(JsxAttrValue::Element(_)), .. }));
}

#[test]
fn child_text_keeps_apostrophes_and_decodes_entities() {
    let element = jsx(only_expr("<p>Don't panic &amp; carry on</p>"));
    assert!(matches!(&element.children[..], [JsxChild::Text(t)] if t == "Don't panic & carry on"));
}

#[test]
fn mismatched_closing_tag_is_rejected() {
    let err = parse_program("<div><span></div></span>").unwrap_err();
    assert!(err.message.contains("closing tag for <span>"), "{err}");
}

#[test]
fn unterminated_element_is_rejected() {
    let err = parse_program("<div>hello").unwrap_err();
    assert!(err.message.contains("unterminated"), "{err}");
}

#[test]
fn jsx_inside_map_callback() {
    parse_ok(
        r#"
        const List = ({ items }: { items: string[] }) => (
          <ul className="list">
            {items.map((item, i) => <li key={i}>{item}</li>)}
          </ul>
        );
        "#,
    );
}

// =============================================================================
// TYPESCRIPT
// =============================================================================

#[test]
fn skips_type_declarations() {
    let program = parse_ok(
        r"
        interface Props { title: string; onClick?: () => void }
        type Variant = 'a' | 'b' | Array<Record<string, number>>;
        enum Color { Red, Green = 2 }
        declare const VERSION: string;
        namespace Util { export const x = 1; }
        ",
    );
    assert!(program.body.iter().all(|stmt| matches!(stmt, Stmt::Other)));
}

#[test]
fn typed_function_component() {
    let program = parse_ok(
        r#"
        import React, { useState } from "react";
        import type { FC } from "react";

        export default function Counter({ start = 0 }: { start?: number }): JSX.Element {
          const [count, setCount] = useState<number>(start);
          return <Button onClick={() => setCount(count + 1)}>{count}</Button>;
        }
        "#,
    );
    assert_eq!(program.body.len(), 3);
    let Stmt::Export { default: true, decl } = &program.body[2] else { panic!("expected default export") };
    let Stmt::Function(function) = decl.as_ref() else { panic!("expected function") };
    assert_eq!(function.name.as_deref(), Some("Counter"));
    let body = function.body.as_ref().unwrap();
    assert!(matches!(body.last(), Some(Stmt::Return(Some(Expr::Jsx(_))))));
}

#[test]
fn generic_call_versus_comparison() {
    let Expr::Call { .. } = only_expr("useRef<HTMLDivElement | null>(null)") else {
        panic!("expected call with type arguments");
    };
    let Expr::Binary { op, .. } = only_expr("a < b") else { panic!("expected comparison") };
    assert_eq!(op, "<");
}

#[test]
fn nested_type_arguments_split_shift_tokens() {
    parse_ok("const m = new Map<string, Array<number>>();");
    parse_ok("let x: Promise<Array<Set<number>>> = load();");
}

#[test]
fn as_satisfies_and_non_null() {
    let Expr::TypeAssertion(_) = only_expr("config satisfies Config") else { panic!("expected assertion") };
    parse_ok("const el = document.getElementById('root')!;\nconst v = x as const;");
}

#[test]
fn generic_arrow_in_tsx() {
    let program = parse_ok("const id = <T,>(value: T): T => value;");
    let Stmt::Var(decl) = &program.body[0] else { panic!("expected var") };
    assert!(matches!(decl.declarators[0].init, Some(Expr::Arrow(_))));
}

#[test]
fn class_component_members() {
    let program = parse_ok(
        r"
        class Panel extends React.Component<Props> {
          static defaultProps = { open: false };
          private count = 0;
          #secret?: string;
          get label() { return 'x'; }
          async load(): Promise<void> {}
          render() { return <div>{this.props.title}</div>; }
        }
        ",
    );
    let Stmt::Class(class) = &program.body[0] else { panic!("expected class") };
    assert_eq!(class.name.as_deref(), Some("Panel"));
    assert_eq!(class.members.len(), 6);
}

// =============================================================================
// STATEMENTS AND EXPRESSIONS
// =============================================================================

#[test]
fn automatic_semicolon_insertion() {
    let program = parse_ok("const a = 1\nconst b = 2\nfoo()\n");
    assert_eq!(program.body.len(), 3);
}

#[test]
fn missing_semicolon_on_same_line_fails() {
    assert!(parse_program("const a = 1 const b = 2").is_err());
}

#[test]
fn control_flow_statements() {
    parse_ok(
        r"
        outer: for (let i = 0; i < 10; i++) {
          for (const k in obj) { if (k) continue outer; else break; }
          for await (const item of stream) {}
        }
        while (x) x--;
        do { y++ } while (y < 3)
        switch (kind) { case 'a': f(); break; default: g(); }
        try { risky(); } catch (e: unknown) { log(e); } finally { done(); }
        ",
    );
}

#[test]
fn regex_templates_and_operators() {
    parse_ok(
        r"
        const re = /a\/b[/]/g.test(s) ? `${a}-${b ?? 'c'}` : tag`raw`;
        const n = 2 ** 3 ** 2, big = 10n, hex = 0xff;
        x ||= y?.z?.[0]?.(1);
        const { a, b: [c, ...d], ...rest } = obj;
        ",
    );
}

#[test]
fn object_literal_members() {
    let Expr::Object(members) = only_expr("({ a, b: 1, [k]: 2, m() {}, get g() { return 1 }, ...o })") else {
        panic!("expected object");
    };
    assert_eq!(members.len(), 6);
}

#[test]
fn prose_is_not_a_program() {
    assert!(parse_program("Here is the component you asked for.").is_err());
}

// =============================================================================
// STRATEGIES AND LIMITS
// =============================================================================

#[test]
fn program_strategy_wins_when_it_parses() {
    let (_, strategy) = parse_with_strategies("<div />").unwrap();
    assert_eq!(strategy, ParseStrategy::Program);
}

#[test]
fn assignment_strategy_recovers_object_like_markup() {
    // A leading `{` is a block statement in program position.
    let (program, strategy) = parse_with_strategies("{ a: 1, b: 2 }").unwrap();
    assert_eq!(strategy, ParseStrategy::AssignmentRhs);
    assert!(matches!(&program.body[0], Stmt::Var(_)));
}

#[test]
fn final_error_is_relative_to_original_text() {
    let err = parse_with_strategies("<div>\n  <span>\n</div>").unwrap_err();
    assert_eq!(err.line, 3, "{err}");
    assert!(!err.message.is_empty());
}

#[test]
fn deep_nesting_fails_closed() {
    let depth = 10_000;
    let src = format!("{}{}", "<div>".repeat(depth), "</div>".repeat(depth));
    let err = parse_with_strategies(&src).unwrap_err();
    assert!(err.message.contains("nesting too deep") || err.message == OUT_OF_FUEL, "{err}");
}

#[test]
fn deep_parentheses_fail_closed() {
    let src = format!("{}1{}", "(".repeat(5_000), ")".repeat(5_000));
    assert!(parse_program(&src).is_err());
}

#[test]
fn nested_parenthesized_defaults_parse_within_budget() {
    let depth = 14;
    let src = format!("const x = {}1{};", "(a = ".repeat(depth), ")".repeat(depth));
    let program = parse_ok(&src);
    let Stmt::Var(decl) = &program.body[0] else { panic!("expected var") };
    assert!(matches!(decl.declarators[0].init, Some(Expr::Assign { .. })));

    let arrows = format!("const f = {}1{};", "(a = (b) => ".repeat(depth), ")".repeat(depth));
    parse_ok(&arrows);
}

#[test]
fn moderate_nesting_is_accepted() {
    let depth = 30;
    let src = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
    parse_ok(&src);
}
