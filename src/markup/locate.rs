//! Find the first renderable markup node among top-level statements.
//!
//! Replies wrap their markup in whatever shape the model felt like: a bare
//! expression, a `const` initializer, a component function's `return`. The
//! locator looks through those wrappers in source order and stops at the
//! first hit. Finding nothing is a normal outcome.

use super::syntax::{ArrowBody, Expr, Function, JsxElement, JsxFragment, Program, Stmt};

/// A located markup node, borrowed from the syntax tree.
#[derive(Debug, Clone, Copy)]
pub enum Markup<'a> {
    Element(&'a JsxElement),
    Fragment(&'a JsxFragment),
}

/// Return the first markup node across the program's top-level statements.
#[must_use]
pub fn locate_markup(program: &Program) -> Option<Markup<'_>> {
    program.body.iter().find_map(locate_in_statement)
}

fn locate_in_statement(stmt: &Stmt) -> Option<Markup<'_>> {
    match stmt {
        Stmt::Expr(expr) => as_markup(expr),
        Stmt::Var(decl) => decl
            .declarators
            .iter()
            .filter_map(|declarator| declarator.init.as_ref())
            .find_map(locate_in_binding),
        Stmt::Function(function) => locate_in_function(function),
        Stmt::Export { default: true, decl } => match decl.as_ref() {
            // `export default () => <App />` binds an anonymous value.
            Stmt::Expr(expr) => locate_in_binding(expr),
            other => locate_in_statement(other),
        },
        Stmt::Export { default: false, decl } => locate_in_statement(decl),
        _ => None,
    }
}

/// Markup reachable from a value that is being bound to a name.
fn locate_in_binding(init: &Expr) -> Option<Markup<'_>> {
    match init {
        Expr::Arrow(arrow) => match &arrow.body {
            ArrowBody::Expr(body) => as_markup(body),
            ArrowBody::Block(stmts) => first_returned_markup(stmts),
        },
        Expr::Function(function) => locate_in_function(function),
        other => as_markup(other),
    }
}

fn locate_in_function(function: &Function) -> Option<Markup<'_>> {
    function.body.as_deref().and_then(first_returned_markup)
}

/// Only direct statements of the body are scanned; returns nested in
/// branches or loops do not count.
fn first_returned_markup(body: &[Stmt]) -> Option<Markup<'_>> {
    body.iter().find_map(|stmt| match stmt {
        Stmt::Return(Some(expr)) => as_markup(expr),
        _ => None,
    })
}

fn as_markup(expr: &Expr) -> Option<Markup<'_>> {
    match expr {
        Expr::Jsx(element) => Some(Markup::Element(element)),
        Expr::JsxFragment(fragment) => Some(Markup::Fragment(fragment)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "locate_test.rs"]
mod tests;
