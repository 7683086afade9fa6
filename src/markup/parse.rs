//! Recursive descent parser for TSX source.
//!
//! Permissive by intent: it accepts what model replies actually contain
//! (module syntax, TypeScript annotations, JSX) and recognizes type-level
//! syntax only to skip over it. Parsing is attempted with an ordered list of
//! [`ParseStrategy`] values; the first that succeeds wins.

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::debug;

use super::lexer::{Lexer, OUT_OF_FUEL, SyntaxError, Token, TokenKind};
use super::syntax::{
    Arrow, ArrowBody, Class, ClassMember, Declarator, Expr, Function, JsxAttrValue, JsxAttribute, JsxChild,
    JsxElement, JsxFragment, JsxName, MemberProp, ObjectMember, Pattern, Program, PropKey, Stmt, Template, VarDecl,
    VarKind,
};

/// Maximum nesting of statements, expressions, JSX elements and types.
pub const MAX_NESTING: usize = 100;

/// Words that can never be an identifier reference.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "continue", "debugger", "default", "do", "else", "enum", "export", "extends", "finally",
    "for", "if", "in", "instanceof", "return", "switch", "throw", "try", "var", "const", "while", "with",
];

const ASSIGN_OPS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=", "||=", "??="];

const CLASS_MODIFIERS: &[&str] =
    &["static", "public", "private", "protected", "readonly", "abstract", "override", "declare", "accessor"];

const PARAM_MODIFIERS: &[&str] = &["public", "private", "protected", "readonly", "override"];

const TYPE_PREFIX_OPERATORS: &[&str] = &["keyof", "typeof", "readonly", "unique", "infer", "asserts", "new", "abstract"];

// =============================================================================
// STRATEGIES
// =============================================================================

/// One way of presenting extracted code to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The code as a complete module.
    Program,
    /// The code as the right-hand side of a single assignment, which
    /// recovers bare markup that is not a valid statement on its own.
    AssignmentRhs,
}

/// Strategies in the order they are attempted.
pub const STRATEGIES: [ParseStrategy; 2] = [ParseStrategy::Program, ParseStrategy::AssignmentRhs];

const WRAP_PREFIX: &str = "const __preview = (\n";
const WRAP_SUFFIX: &str = "\n);";

impl ParseStrategy {
    fn source(self, code: &str) -> Cow<'_, str> {
        match self {
            Self::Program => Cow::Borrowed(code),
            Self::AssignmentRhs => Cow::Owned(format!("{WRAP_PREFIX}{code}{WRAP_SUFFIX}")),
        }
    }

    /// Lines the strategy adds in front of the original code.
    fn line_offset(self) -> usize {
        match self {
            Self::Program => 0,
            Self::AssignmentRhs => 1,
        }
    }
}

/// Parse with each strategy in turn. On total failure, the error of the last
/// attempt is returned, positioned relative to the original code.
///
/// # Errors
///
/// Returns the final strategy's [`SyntaxError`] when no strategy succeeds.
pub fn parse_with_strategies(code: &str) -> Result<(Program, ParseStrategy), SyntaxError> {
    let mut failure = None;
    for strategy in STRATEGIES {
        match parse_program(&strategy.source(code)) {
            Ok(program) => return Ok((program, strategy)),
            Err(mut err) => {
                err.line = err.line.saturating_sub(strategy.line_offset()).max(1);
                debug!(?strategy, error = %err, "parse: strategy failed");
                failure = Some(err);
            }
        }
    }
    Err(failure.unwrap_or_else(|| SyntaxError { message: "no parse strategy".into(), line: 1, column: 1 }))
}

/// Parse a complete module.
///
/// # Errors
///
/// Returns a [`SyntaxError`] describing the first problem found.
pub fn parse_program(src: &str) -> Result<Program, SyntaxError> {
    let mut parser = Parser::new(src)?;
    let mut body = Vec::new();
    while parser.cur.kind != TokenKind::Eof {
        body.push(parser.parse_statement()?);
    }
    Ok(Program { body })
}

// =============================================================================
// PARSER STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    JsxTag,
    JsxChild,
}

struct Snapshot {
    pos: usize,
    cur: Token,
    depth: usize,
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    depth: usize,
    /// Token offsets where an arrow head was already tried and rejected.
    failed_arrows: HashSet<usize>,
}

type PResult<T> = Result<T, SyntaxError>;

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> PResult<Self> {
        let mut lexer = Lexer::new(src);
        let cur = lexer.next_token()?;
        Ok(Self { lexer, cur, depth: 0, failed_arrows: HashSet::new() })
    }

    // -------------------------------------------------------------------------
    // Token plumbing
    // -------------------------------------------------------------------------

    fn advance(&mut self) -> PResult<Token> {
        self.advance_in(Mode::Normal)
    }

    fn advance_in(&mut self, mode: Mode) -> PResult<Token> {
        let next = match mode {
            Mode::Normal => self.lexer.next_token()?,
            Mode::JsxTag => self.lexer.next_jsx_tag_token()?,
            Mode::JsxChild => self.lexer.next_jsx_child_token()?,
        };
        Ok(std::mem::replace(&mut self.cur, next))
    }

    /// Look at the token after `cur` without consuming anything.
    fn peek(&mut self) -> PResult<Token> {
        let pos = self.lexer.pos();
        let next = self.lexer.next_token();
        self.lexer.reset(pos);
        next
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot { pos: self.lexer.pos(), cur: self.cur.clone(), depth: self.depth }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.lexer.reset(snapshot.pos);
        self.cur = snapshot.cur;
        self.depth = snapshot.depth;
    }

    /// Run `f` speculatively; on failure rewind as if nothing happened.
    /// Fuel spent by the attempt is not refunded.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<Option<T>>) -> PResult<Option<T>> {
        let snapshot = self.snapshot();
        match f(self) {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) => {
                self.restore(snapshot);
                Ok(None)
            }
            Err(err) if err.message == OUT_OF_FUEL => Err(err),
            Err(_) => {
                self.restore(snapshot);
                Ok(None)
            }
        }
    }

    fn is_punct(&self, p: &str) -> bool {
        self.cur.is_punct(p)
    }

    fn is_ident(&self, name: &str) -> bool {
        self.cur.is_ident(name)
    }

    fn eat_punct(&mut self, p: &str) -> PResult<bool> {
        if self.is_punct(p) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn eat_ident(&mut self, name: &str) -> PResult<bool> {
        if self.is_ident(name) {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect_punct(&mut self, p: &str) -> PResult<Token> {
        self.expect_punct_in(p, Mode::Normal)
    }

    fn expect_punct_in(&mut self, p: &str, mode: Mode) -> PResult<Token> {
        if !self.is_punct(p) {
            return Err(self.error(format!("expected `{p}` but found {}", self.cur.kind)));
        }
        self.advance_in(mode)
    }

    fn expect_ident(&mut self) -> PResult<String> {
        match &self.cur.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            other => Err(self.error(format!("expected identifier but found {other}"))),
        }
    }

    fn error(&self, message: impl Into<String>) -> SyntaxError {
        self.lexer.error_at(message, self.cur.start)
    }

    fn unexpected(&self) -> SyntaxError {
        self.error(format!("unexpected {}", self.cur.kind))
    }

    fn enter(&mut self) -> PResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(self.error("nesting too deep"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Automatic semicolon insertion: a `;`, a closing brace, end of input,
    /// or a line break ends a statement.
    fn consume_semicolon(&mut self) -> PResult<()> {
        if self.eat_punct(";")? {
            return Ok(());
        }
        if self.is_punct("}") || self.cur.kind == TokenKind::Eof || self.cur.newline_before {
            return Ok(());
        }
        Err(self.error(format!("unexpected {}, expected `;`", self.cur.kind)))
    }

    /// Consume one `>` from the current token, splitting `>>`, `>=` and
    /// friends so nested type arguments close one level at a time.
    fn eat_gt(&mut self) -> PResult<()> {
        let rest = match &self.cur.kind {
            TokenKind::Punct(">") => {
                self.advance()?;
                return Ok(());
            }
            TokenKind::Punct(">>") => ">",
            TokenKind::Punct(">>>") => ">>",
            TokenKind::Punct(">=") => "=",
            TokenKind::Punct(">>=") => ">=",
            TokenKind::Punct(">>>=") => ">>=",
            _ => return Err(self.error(format!("expected `>` but found {}", self.cur.kind))),
        };
        self.cur.kind = TokenKind::Punct(rest);
        self.cur.start += 1;
        self.cur.newline_before = false;
        Ok(())
    }

    fn at_gt_family(&self) -> bool {
        matches!(&self.cur.kind, TokenKind::Punct(">" | ">>" | ">>>" | ">=" | ">>=" | ">>>="))
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn parse_statement(&mut self) -> PResult<Stmt> {
        self.enter()?;
        let stmt = self.parse_statement_inner();
        self.leave();
        stmt
    }

    fn parse_statement_inner(&mut self) -> PResult<Stmt> {
        let keyword = match &self.cur.kind {
            TokenKind::Punct("{") => return Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Punct(";") => {
                self.advance()?;
                return Ok(Stmt::Other);
            }
            TokenKind::Punct("@") => {
                self.skip_decorators()?;
                return self.parse_statement_inner();
            }
            TokenKind::Ident(name) => name.clone(),
            _ => return self.parse_expression_statement(),
        };

        match keyword.as_str() {
            "var" | "const" => {
                if keyword == "const" && self.peek()?.is_ident("enum") {
                    self.advance()?;
                    return self.skip_enum();
                }
                self.parse_var_statement()
            }
            "let" => {
                let next = self.peek()?;
                if matches!(next.kind, TokenKind::Ident(_)) || next.is_punct("[") || next.is_punct("{") {
                    self.parse_var_statement()
                } else {
                    self.parse_expression_statement()
                }
            }
            "function" => Ok(Stmt::Function(self.parse_function(false)?)),
            "async" if self.peek_is_function_on_same_line()? => {
                self.advance()?;
                Ok(Stmt::Function(self.parse_function(true)?))
            }
            "class" => Ok(Stmt::Class(self.parse_class()?)),
            "abstract" if self.peek()?.is_ident("class") => {
                self.advance()?;
                Ok(Stmt::Class(self.parse_class()?))
            }
            "if" => self.parse_if(),
            "for" => self.parse_for(),
            "while" => {
                self.advance()?;
                self.parse_paren_expression()?;
                let body = self.parse_statement()?;
                Ok(Stmt::Loop { body: Box::new(body) })
            }
            "do" => {
                self.advance()?;
                let body = self.parse_statement()?;
                if !self.eat_ident("while")? {
                    return Err(self.error("expected `while` after do-block"));
                }
                self.parse_paren_expression()?;
                self.eat_punct(";")?;
                Ok(Stmt::Loop { body: Box::new(body) })
            }
            "return" => {
                self.advance()?;
                let argument = if self.is_punct(";")
                    || self.is_punct("}")
                    || self.cur.kind == TokenKind::Eof
                    || self.cur.newline_before
                {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_semicolon()?;
                Ok(Stmt::Return(argument))
            }
            "break" | "continue" => {
                self.advance()?;
                if matches!(self.cur.kind, TokenKind::Ident(_)) && !self.cur.newline_before {
                    self.advance()?;
                }
                self.consume_semicolon()?;
                Ok(Stmt::Other)
            }
            "throw" => {
                self.advance()?;
                let argument = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Stmt::Throw(argument))
            }
            "try" => self.parse_try(),
            "switch" => self.parse_switch(),
            "debugger" => {
                self.advance()?;
                self.consume_semicolon()?;
                Ok(Stmt::Other)
            }
            "import" => {
                let next = self.peek()?;
                if next.is_punct("(") || next.is_punct(".") {
                    self.parse_expression_statement()
                } else {
                    self.skip_import()
                }
            }
            "export" => self.parse_export(),
            "interface" if self.peek_is_name_on_same_line()? => self.skip_interface(),
            "type" if self.peek_is_name_on_same_line()? => self.skip_type_alias(),
            "enum" if self.peek_is_name_on_same_line()? => self.skip_enum(),
            "declare" if self.peek_is_name_on_same_line()? => {
                self.advance()?;
                if self.eat_ident("global")? {
                    self.skip_balanced()?;
                } else {
                    self.parse_statement()?;
                }
                Ok(Stmt::Other)
            }
            "namespace" | "module" if self.peek_is_namespace_name()? => self.skip_namespace(),
            _ => {
                if self.peek()?.is_punct(":") && !RESERVED.contains(&keyword.as_str()) {
                    self.advance()?;
                    self.advance()?;
                    let body = self.parse_statement()?;
                    return Ok(Stmt::Labeled { label: keyword, body: Box::new(body) });
                }
                self.parse_expression_statement()
            }
        }
    }

    fn peek_is_function_on_same_line(&mut self) -> PResult<bool> {
        let next = self.peek()?;
        Ok(next.is_ident("function") && !next.newline_before)
    }

    fn peek_is_name_on_same_line(&mut self) -> PResult<bool> {
        let next = self.peek()?;
        Ok(matches!(next.kind, TokenKind::Ident(_)) && !next.newline_before)
    }

    fn peek_is_namespace_name(&mut self) -> PResult<bool> {
        let next = self.peek()?;
        Ok(matches!(next.kind, TokenKind::Ident(_) | TokenKind::Str(_)) && !next.newline_before)
    }

    fn parse_expression_statement(&mut self) -> PResult<Stmt> {
        let expr = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Stmt::Expr(expr))
    }

    fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        self.expect_punct("{")?;
        let mut body = Vec::new();
        while !self.is_punct("}") {
            if self.cur.kind == TokenKind::Eof {
                return Err(self.error("unterminated block, expected `}`"));
            }
            body.push(self.parse_statement()?);
        }
        self.advance()?;
        Ok(body)
    }

    fn parse_paren_expression(&mut self) -> PResult<Expr> {
        self.expect_punct("(")?;
        let expr = self.parse_expression()?;
        self.expect_punct(")")?;
        Ok(expr)
    }

    fn parse_var_statement(&mut self) -> PResult<Stmt> {
        let decl = self.parse_var_decl()?;
        self.consume_semicolon()?;
        Ok(Stmt::Var(decl))
    }

    fn parse_var_decl(&mut self) -> PResult<VarDecl> {
        let kind = match self.expect_ident()?.as_str() {
            "var" => VarKind::Var,
            "let" => VarKind::Let,
            _ => VarKind::Const,
        };
        let mut declarators = Vec::new();
        loop {
            let target = self.parse_binding_target()?;
            if !self.cur.newline_before {
                self.eat_punct("!")?;
            }
            if self.eat_punct(":")? {
                self.skip_type()?;
            }
            let init = if self.eat_punct("=")? { Some(self.parse_assignment()?) } else { None };
            declarators.push(Declarator { target, init });
            if !self.eat_punct(",")? {
                break;
            }
        }
        Ok(VarDecl { kind, declarators })
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        self.advance()?;
        let test = self.parse_paren_expression()?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat_ident("else")? { Some(Box::new(self.parse_statement()?)) } else { None };
        Ok(Stmt::If { test, consequent, alternate })
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        self.advance()?;
        self.eat_ident("await")?;
        self.expect_punct("(")?;

        if !self.is_punct(";") {
            if self.is_ident("var") || self.is_ident("let") || self.is_ident("const") {
                self.parse_var_decl()?;
            } else {
                self.parse_expression()?;
            }
        }

        if self.eat_ident("of")? || self.eat_ident("in")? {
            self.parse_assignment()?;
            self.expect_punct(")")?;
        } else if !self.eat_punct(")")? {
            // `for (x in y)` parsed as a binary `in` ends up here already closed.
            self.expect_punct(";")?;
            if !self.is_punct(";") {
                self.parse_expression()?;
            }
            self.expect_punct(";")?;
            if !self.is_punct(")") {
                self.parse_expression()?;
            }
            self.expect_punct(")")?;
        }

        let body = self.parse_statement()?;
        Ok(Stmt::Loop { body: Box::new(body) })
    }

    fn parse_try(&mut self) -> PResult<Stmt> {
        self.advance()?;
        let block = self.parse_block()?;
        let handler = if self.eat_ident("catch")? {
            if self.eat_punct("(")? {
                self.parse_binding_target()?;
                if self.eat_punct(":")? {
                    self.skip_type()?;
                }
                self.expect_punct(")")?;
            }
            Some(self.parse_block()?)
        } else {
            None
        };
        let finalizer = if self.eat_ident("finally")? { Some(self.parse_block()?) } else { None };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error("expected `catch` or `finally` after try-block"));
        }
        Ok(Stmt::Try { block, handler, finalizer })
    }

    fn parse_switch(&mut self) -> PResult<Stmt> {
        self.advance()?;
        let discriminant = self.parse_paren_expression()?;
        self.expect_punct("{")?;
        let mut cases = Vec::new();
        while !self.is_punct("}") {
            if self.eat_ident("case")? {
                self.parse_expression()?;
            } else if !self.eat_ident("default")? {
                return Err(self.error(format!("expected `case` or `default` but found {}", self.cur.kind)));
            }
            self.expect_punct(":")?;
            let mut body = Vec::new();
            while !(self.is_ident("case") || self.is_ident("default") || self.is_punct("}")) {
                if self.cur.kind == TokenKind::Eof {
                    return Err(self.error("unterminated switch statement"));
                }
                body.push(self.parse_statement()?);
            }
            cases.push(body);
        }
        self.advance()?;
        Ok(Stmt::Switch { discriminant, cases })
    }

    // -------------------------------------------------------------------------
    // Modules
    // -------------------------------------------------------------------------

    fn skip_import(&mut self) -> PResult<Stmt> {
        self.advance()?;
        if matches!(self.cur.kind, TokenKind::Str(_)) {
            self.advance()?;
            self.skip_import_attributes()?;
            self.consume_semicolon()?;
            return Ok(Stmt::Other);
        }
        loop {
            match &self.cur.kind {
                TokenKind::Eof => return Err(self.error("unterminated import declaration")),
                TokenKind::Ident(name) if name == "from" => {
                    self.advance()?;
                    break;
                }
                TokenKind::Punct("=") => {
                    // `import x = require("y")`
                    self.advance()?;
                    self.parse_expression()?;
                    self.consume_semicolon()?;
                    return Ok(Stmt::Other);
                }
                TokenKind::Punct("{") => self.skip_balanced()?,
                TokenKind::Punct(";") => return Err(self.error("import declaration is missing `from`")),
                _ => {
                    self.advance()?;
                }
            }
        }
        if !matches!(self.cur.kind, TokenKind::Str(_)) {
            return Err(self.error(format!("expected module specifier but found {}", self.cur.kind)));
        }
        self.advance()?;
        self.skip_import_attributes()?;
        self.consume_semicolon()?;
        Ok(Stmt::Other)
    }

    fn skip_import_attributes(&mut self) -> PResult<()> {
        if (self.is_ident("with") || self.is_ident("assert")) && !self.cur.newline_before {
            self.advance()?;
            self.skip_balanced()?;
        }
        Ok(())
    }

    fn parse_export(&mut self) -> PResult<Stmt> {
        self.advance()?;

        if self.eat_ident("default")? {
            let decl = if self.is_ident("function") {
                Stmt::Function(self.parse_function(false)?)
            } else if self.is_ident("async") && self.peek_is_function_on_same_line()? {
                self.advance()?;
                Stmt::Function(self.parse_function(true)?)
            } else if self.is_ident("class") {
                Stmt::Class(self.parse_class()?)
            } else if self.is_ident("abstract") && self.peek()?.is_ident("class") {
                self.advance()?;
                Stmt::Class(self.parse_class()?)
            } else if self.is_ident("interface") && self.peek_is_name_on_same_line()? {
                self.skip_interface()?
            } else {
                let expr = self.parse_assignment()?;
                self.consume_semicolon()?;
                Stmt::Expr(expr)
            };
            return Ok(Stmt::Export { default: true, decl: Box::new(decl) });
        }

        if self.is_ident("type") && self.peek()?.is_punct("{") {
            self.advance()?;
        }
        if self.eat_punct("*")? {
            if self.eat_ident("as")? {
                self.advance()?;
            }
            self.skip_reexport_source(true)?;
            return Ok(Stmt::Other);
        }
        if self.is_punct("{") {
            self.skip_balanced()?;
            self.skip_reexport_source(false)?;
            return Ok(Stmt::Other);
        }
        if self.eat_punct("=")? {
            self.parse_expression()?;
            self.consume_semicolon()?;
            return Ok(Stmt::Other);
        }

        let decl = self.parse_statement()?;
        Ok(Stmt::Export { default: false, decl: Box::new(decl) })
    }

    fn skip_reexport_source(&mut self, required: bool) -> PResult<()> {
        if self.eat_ident("from")? {
            if !matches!(self.cur.kind, TokenKind::Str(_)) {
                return Err(self.error(format!("expected module specifier but found {}", self.cur.kind)));
            }
            self.advance()?;
            self.skip_import_attributes()?;
        } else if required {
            return Err(self.error("expected `from`"));
        }
        self.consume_semicolon()
    }

    // -------------------------------------------------------------------------
    // TypeScript declarations (skipped)
    // -------------------------------------------------------------------------

    fn skip_interface(&mut self) -> PResult<Stmt> {
        self.advance()?;
        self.expect_ident()?;
        if self.is_punct("<") {
            self.skip_type_params()?;
        }
        if self.eat_ident("extends")? {
            loop {
                self.skip_type()?;
                if !self.eat_punct(",")? {
                    break;
                }
            }
        }
        if !self.is_punct("{") {
            return Err(self.error(format!("expected `{{` but found {}", self.cur.kind)));
        }
        self.skip_balanced()?;
        Ok(Stmt::Other)
    }

    fn skip_type_alias(&mut self) -> PResult<Stmt> {
        self.advance()?;
        self.expect_ident()?;
        if self.is_punct("<") {
            self.skip_type_params()?;
        }
        self.expect_punct("=")?;
        self.skip_type()?;
        self.consume_semicolon()?;
        Ok(Stmt::Other)
    }

    fn skip_enum(&mut self) -> PResult<Stmt> {
        self.advance()?;
        self.expect_ident()?;
        if !self.is_punct("{") {
            return Err(self.error(format!("expected `{{` but found {}", self.cur.kind)));
        }
        self.skip_balanced()?;
        Ok(Stmt::Other)
    }

    fn skip_namespace(&mut self) -> PResult<Stmt> {
        self.advance()?;
        self.advance()?;
        while self.eat_punct(".")? {
            self.expect_ident()?;
        }
        if self.is_punct("{") {
            self.parse_block()?;
        } else {
            self.consume_semicolon()?;
        }
        Ok(Stmt::Other)
    }

    fn skip_decorators(&mut self) -> PResult<()> {
        while self.eat_punct("@")? {
            self.expect_ident()?;
            while self.eat_punct(".")? {
                self.expect_ident()?;
            }
            if self.is_punct("(") {
                self.parse_arguments()?;
            }
        }
        Ok(())
    }

    /// Skip a bracketed region starting at the current opening token,
    /// honoring nesting of all bracket kinds and template literals.
    fn skip_balanced(&mut self) -> PResult<()> {
        let mut stack: Vec<&'static str> = Vec::new();
        loop {
            let closer = match &self.cur.kind {
                TokenKind::Punct("{") => Some("}"),
                TokenKind::Punct("(") => Some(")"),
                TokenKind::Punct("[") => Some("]"),
                _ => None,
            };
            if let Some(closer) = closer {
                stack.push(closer);
                self.advance()?;
                continue;
            }
            if stack.is_empty() {
                return Err(self.error(format!("expected a bracket but found {}", self.cur.kind)));
            }
            match &self.cur.kind {
                TokenKind::Eof => return Err(self.error("unbalanced brackets")),
                TokenKind::Punct(p @ ("}" | ")" | "]")) => {
                    if stack.last() != Some(p) {
                        return Err(self.error(format!("mismatched `{p}`")));
                    }
                    stack.pop();
                    self.advance()?;
                    if stack.is_empty() {
                        return Ok(());
                    }
                }
                TokenKind::Backtick => self.skip_template()?,
                _ => {
                    self.advance()?;
                }
            }
        }
    }

    /// Skip a template literal whose opening backtick is the current token.
    fn skip_template(&mut self) -> PResult<()> {
        loop {
            let chunk = self.lexer.read_template_chunk()?;
            if chunk.tail {
                break;
            }
            self.advance()?;
            let mut depth = 0usize;
            loop {
                match &self.cur.kind {
                    TokenKind::Eof => return Err(self.error("unterminated template literal")),
                    TokenKind::Punct("{") => {
                        depth += 1;
                        self.advance()?;
                    }
                    TokenKind::Punct("}") if depth == 0 => break,
                    TokenKind::Punct("}") => {
                        depth -= 1;
                        self.advance()?;
                    }
                    TokenKind::Backtick => self.skip_template()?,
                    _ => {
                        self.advance()?;
                    }
                }
            }
        }
        self.advance()?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Types (skipped)
    // -------------------------------------------------------------------------

    fn skip_type(&mut self) -> PResult<()> {
        self.enter()?;
        let result = self.skip_type_inner();
        self.leave();
        result
    }

    fn skip_type_inner(&mut self) -> PResult<()> {
        if self.is_punct("|") || self.is_punct("&") {
            self.advance()?;
        }
        loop {
            self.skip_type_operand()?;
            if self.is_punct("|") || self.is_punct("&") {
                self.advance()?;
                continue;
            }
            if self.is_ident("extends") && !self.cur.newline_before {
                self.advance()?;
                self.skip_type_operand()?;
                if self.eat_punct("?")? {
                    self.skip_type()?;
                    self.expect_punct(":")?;
                    self.skip_type()?;
                }
            }
            return Ok(());
        }
    }

    fn skip_type_operand(&mut self) -> PResult<()> {
        while let TokenKind::Ident(name) = &self.cur.kind {
            if !TYPE_PREFIX_OPERATORS.contains(&name.as_str()) {
                break;
            }
            let next = self.peek()?;
            let starts_type = matches!(next.kind, TokenKind::Ident(_) | TokenKind::Str(_))
                || next.is_punct("(")
                || next.is_punct("[")
                || next.is_punct("{");
            if !starts_type {
                break;
            }
            self.advance()?;
        }

        match &self.cur.kind {
            TokenKind::Punct("(") => {
                self.skip_balanced()?;
                if self.eat_punct("=>")? {
                    self.skip_type()?;
                }
            }
            TokenKind::Punct("<") => {
                self.skip_type_params()?;
                if !self.is_punct("(") {
                    return Err(self.error("expected parameter list after type parameters"));
                }
                self.skip_balanced()?;
                self.expect_punct("=>")?;
                self.skip_type()?;
            }
            TokenKind::Punct("{" | "[") => self.skip_balanced()?,
            TokenKind::Backtick => self.skip_template()?,
            TokenKind::Punct("-") => {
                self.advance()?;
                if !matches!(self.cur.kind, TokenKind::Num(_) | TokenKind::BigInt(_)) {
                    return Err(self.error("expected number in type"));
                }
                self.advance()?;
            }
            TokenKind::Ident(_) => {
                self.advance()?;
                while self.is_punct(".") {
                    self.advance()?;
                    self.expect_ident()?;
                }
                if self.is_ident("is") && !self.cur.newline_before {
                    self.advance()?;
                    self.skip_type()?;
                    return Ok(());
                }
            }
            TokenKind::Str(_) | TokenKind::Num(_) | TokenKind::BigInt(_) => {
                self.advance()?;
            }
            _ => return Err(self.error(format!("expected a type but found {}", self.cur.kind))),
        }

        loop {
            if self.is_punct("<") && !self.cur.newline_before {
                self.skip_type_args()?;
            } else if self.is_punct("[") && !self.cur.newline_before {
                self.skip_balanced()?;
            } else if self.is_punct(".") {
                self.advance()?;
                self.expect_ident()?;
            } else {
                return Ok(());
            }
        }
    }

    /// `<A, B<C>>` in type position.
    fn skip_type_args(&mut self) -> PResult<()> {
        self.expect_punct("<")?;
        if self.at_gt_family() {
            return self.eat_gt();
        }
        loop {
            self.skip_type()?;
            if !self.eat_punct(",")? {
                break;
            }
            if self.at_gt_family() {
                break;
            }
        }
        self.eat_gt()
    }

    /// `<T extends X = Y, const U>` in declaration position.
    fn skip_type_params(&mut self) -> PResult<()> {
        self.expect_punct("<")?;
        loop {
            if self.at_gt_family() {
                break;
            }
            while self.is_ident("const") || self.is_ident("in") || self.is_ident("out") {
                if matches!(self.peek()?.kind, TokenKind::Ident(_)) {
                    self.advance()?;
                } else {
                    break;
                }
            }
            self.expect_ident()?;
            if self.eat_ident("extends")? {
                self.skip_type()?;
            }
            if self.eat_punct("=")? {
                self.skip_type()?;
            }
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.eat_gt()
    }

    // =========================================================================
    // FUNCTIONS AND CLASSES
    // =========================================================================

    /// Parse `function [*] [name] <T>(params): R { body }`; the current token
    /// is `function`.
    fn parse_function(&mut self, is_async: bool) -> PResult<Function> {
        self.advance()?;
        let is_generator = self.eat_punct("*")?;
        let name = match &self.cur.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance()?;
                Some(name)
            }
            _ => None,
        };
        let (params, body) = self.parse_function_rest()?;
        Ok(Function { name, params, body, is_async, is_generator })
    }

    /// Type parameters, parameter list, return type and optional body.
    fn parse_function_rest(&mut self) -> PResult<(Vec<Pattern>, Option<Vec<Stmt>>)> {
        if self.is_punct("<") {
            self.skip_type_params()?;
        }
        let params = self.parse_params()?;
        if self.eat_punct(":")? {
            self.skip_type()?;
        }
        let body = if self.is_punct("{") {
            Some(self.parse_block()?)
        } else {
            self.consume_semicolon()?;
            None
        };
        Ok((params, body))
    }

    fn parse_params(&mut self) -> PResult<Vec<Pattern>> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        while !self.is_punct(")") {
            self.skip_decorators()?;
            while let TokenKind::Ident(name) = &self.cur.kind {
                if !PARAM_MODIFIERS.contains(&name.as_str()) {
                    break;
                }
                let next = self.peek()?;
                if matches!(next.kind, TokenKind::Ident(_)) || next.is_punct("{") || next.is_punct("[") {
                    self.advance()?;
                } else {
                    break;
                }
            }

            let param = if self.eat_punct("...")? {
                let target = self.parse_binding_target()?;
                self.eat_punct("?")?;
                if self.eat_punct(":")? {
                    self.skip_type()?;
                }
                Pattern::Rest(Box::new(target))
            } else {
                let target = self.parse_binding_target()?;
                self.eat_punct("?")?;
                if self.eat_punct(":")? {
                    self.skip_type()?;
                }
                if self.eat_punct("=")? {
                    Pattern::Default(Box::new(target), Box::new(self.parse_assignment()?))
                } else {
                    target
                }
            };
            params.push(param);
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok(params)
    }

    fn parse_binding_target(&mut self) -> PResult<Pattern> {
        self.enter()?;
        let result = self.parse_binding_target_inner();
        self.leave();
        result
    }

    fn parse_binding_target_inner(&mut self) -> PResult<Pattern> {
        match &self.cur.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(Pattern::Ident(name))
            }
            TokenKind::Punct("{") => {
                self.advance()?;
                let mut props = Vec::new();
                while !self.is_punct("}") {
                    if self.eat_punct("...")? {
                        props.push(Pattern::Rest(Box::new(self.parse_binding_target()?)));
                    } else {
                        let key = self.parse_prop_key()?;
                        let target = if self.eat_punct(":")? {
                            self.parse_binding_target()?
                        } else if let PropKey::Ident(name) = key {
                            Pattern::Ident(name)
                        } else {
                            return Err(self.error("expected `:` in object pattern"));
                        };
                        props.push(self.parse_binding_default(target)?);
                    }
                    if !self.eat_punct(",")? {
                        break;
                    }
                }
                self.expect_punct("}")?;
                Ok(Pattern::Object(props))
            }
            TokenKind::Punct("[") => {
                self.advance()?;
                let mut elements = Vec::new();
                while !self.is_punct("]") {
                    if self.eat_punct(",")? {
                        elements.push(None);
                        continue;
                    }
                    let element = if self.eat_punct("...")? {
                        Pattern::Rest(Box::new(self.parse_binding_target()?))
                    } else {
                        let target = self.parse_binding_target()?;
                        self.parse_binding_default(target)?
                    };
                    elements.push(Some(element));
                    if !self.eat_punct(",")? {
                        break;
                    }
                }
                self.expect_punct("]")?;
                Ok(Pattern::Array(elements))
            }
            other => Err(self.error(format!("expected binding pattern but found {other}"))),
        }
    }

    fn parse_binding_default(&mut self, target: Pattern) -> PResult<Pattern> {
        if self.eat_punct("=")? {
            return Ok(Pattern::Default(Box::new(target), Box::new(self.parse_assignment()?)));
        }
        Ok(target)
    }

    fn parse_prop_key(&mut self) -> PResult<PropKey> {
        let key = match &self.cur.kind {
            TokenKind::Ident(name) => PropKey::Ident(name.clone()),
            TokenKind::Str(value) => PropKey::Str(value.clone()),
            TokenKind::Num(value) => PropKey::Num(*value),
            TokenKind::BigInt(value) => PropKey::Str(value.clone()),
            TokenKind::PrivateName(name) => PropKey::Private(name.clone()),
            TokenKind::Punct("[") => {
                self.advance()?;
                let expr = self.parse_assignment()?;
                self.expect_punct("]")?;
                return Ok(PropKey::Computed(Box::new(expr)));
            }
            other => return Err(self.error(format!("expected property name but found {other}"))),
        };
        self.advance()?;
        Ok(key)
    }

    /// Does the token after a `get`/`set`/`async`/modifier word start a
    /// property key (making the word a prefix rather than the key itself)?
    fn peek_starts_key(&mut self) -> PResult<bool> {
        let next = self.peek()?;
        if next.newline_before {
            return Ok(false);
        }
        Ok(matches!(
            next.kind,
            TokenKind::Ident(_) | TokenKind::Str(_) | TokenKind::Num(_) | TokenKind::PrivateName(_)
        ) || next.is_punct("[")
            || next.is_punct("*"))
    }

    fn parse_class(&mut self) -> PResult<Class> {
        self.advance()?;
        let name = match &self.cur.kind {
            TokenKind::Ident(name) if name != "extends" && name != "implements" => {
                let name = name.clone();
                self.advance()?;
                Some(name)
            }
            _ => None,
        };
        if self.is_punct("<") {
            self.skip_type_params()?;
        }
        let super_class = if self.eat_ident("extends")? {
            let expr = self.parse_call_member(false)?;
            if self.is_punct("<") {
                self.skip_type_args()?;
            }
            Some(Box::new(expr))
        } else {
            None
        };
        if self.eat_ident("implements")? {
            loop {
                self.skip_type()?;
                if !self.eat_punct(",")? {
                    break;
                }
            }
        }

        self.expect_punct("{")?;
        let mut members = Vec::new();
        while !self.is_punct("}") {
            if self.cur.kind == TokenKind::Eof {
                return Err(self.error("unterminated class body"));
            }
            if self.eat_punct(";")? {
                continue;
            }
            members.push(self.parse_class_member()?);
        }
        self.advance()?;
        Ok(Class { name, super_class, members })
    }

    fn parse_class_member(&mut self) -> PResult<ClassMember> {
        self.skip_decorators()?;
        while let TokenKind::Ident(name) = &self.cur.kind {
            if !CLASS_MODIFIERS.contains(&name.as_str()) || !self.peek_starts_key()? {
                break;
            }
            self.advance()?;
        }
        if self.is_ident("static") && self.peek()?.is_punct("{") {
            self.advance()?;
            return Ok(ClassMember::StaticBlock(self.parse_block()?));
        }

        let is_async = self.is_ident("async") && self.peek_starts_key()?;
        if is_async {
            self.advance()?;
        }
        let is_generator = self.eat_punct("*")?;
        if (self.is_ident("get") || self.is_ident("set")) && self.peek_starts_key()? {
            self.advance()?;
        }

        let key = self.parse_prop_key()?;
        if !self.eat_punct("?")? {
            self.eat_punct("!")?;
        }

        if self.is_punct("(") || self.is_punct("<") {
            let (params, body) = self.parse_function_rest()?;
            let function = Function { name: None, params, body, is_async, is_generator };
            return Ok(ClassMember::Method { key, function });
        }

        if self.eat_punct(":")? {
            self.skip_type()?;
        }
        let value = if self.eat_punct("=")? { Some(self.parse_assignment()?) } else { None };
        self.consume_semicolon()?;
        Ok(ClassMember::Field { key, value })
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    fn parse_expression(&mut self) -> PResult<Expr> {
        let first = self.parse_assignment()?;
        if !self.is_punct(",") {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat_punct(",")? {
            exprs.push(self.parse_assignment()?);
        }
        Ok(Expr::Sequence(exprs))
    }

    fn parse_assignment(&mut self) -> PResult<Expr> {
        self.enter()?;
        let result = self.parse_assignment_inner();
        self.leave();
        result
    }

    fn parse_assignment_inner(&mut self) -> PResult<Expr> {
        if let Some(arrow) = self.try_arrow()? {
            return Ok(Expr::Arrow(Box::new(arrow)));
        }

        if self.is_ident("yield") {
            self.advance()?;
            let ends = self.cur.newline_before
                || self.cur.kind == TokenKind::Eof
                || [")", "]", "}", ",", ";", ":"].iter().any(|p| self.is_punct(p));
            if ends {
                return Ok(Expr::Yield(None));
            }
            self.eat_punct("*")?;
            return Ok(Expr::Yield(Some(Box::new(self.parse_assignment()?))));
        }

        let left = self.parse_conditional()?;
        let op = match &self.cur.kind {
            TokenKind::Punct(p) if ASSIGN_OPS.contains(p) => *p,
            _ => return Ok(left),
        };
        self.advance()?;
        let value = self.parse_assignment()?;
        Ok(Expr::Assign { op, target: Box::new(left), value: Box::new(value) })
    }

    /// Recognize the arrow function forms; `None` leaves the parser untouched.
    ///
    /// Rejections are remembered per token offset, so nested parenthesized
    /// defaults are speculated on once rather than once per enclosing attempt.
    fn try_arrow(&mut self) -> PResult<Option<Arrow>> {
        let start = self.cur.start;
        if self.failed_arrows.contains(&start) {
            return Ok(None);
        }
        let arrow = self.try_arrow_head()?;
        if arrow.is_none() {
            self.failed_arrows.insert(start);
        }
        Ok(arrow)
    }

    fn try_arrow_head(&mut self) -> PResult<Option<Arrow>> {
        match &self.cur.kind {
            TokenKind::Ident(name) if name == "async" => {
                let next = self.peek()?;
                if next.newline_before {
                    return Ok(None);
                }
                if matches!(next.kind, TokenKind::Ident(_)) || next.is_punct("(") || next.is_punct("<") {
                    return self.attempt(|p| {
                        p.advance()?;
                        p.parse_arrow_after_head(true)
                    });
                }
                self.attempt(|p| p.parse_arrow_after_head(false))
            }
            TokenKind::Ident(name) if !RESERVED.contains(&name.as_str()) => {
                let next = self.peek()?;
                if next.is_punct("=>") && !next.newline_before {
                    return self.attempt(|p| p.parse_arrow_after_head(false));
                }
                Ok(None)
            }
            TokenKind::Punct("(" | "<") => self.attempt(|p| p.parse_arrow_after_head(false)),
            _ => Ok(None),
        }
    }

    fn parse_arrow_after_head(&mut self, is_async: bool) -> PResult<Option<Arrow>> {
        let params = match &self.cur.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance()?;
                vec![Pattern::Ident(name)]
            }
            TokenKind::Punct("<") => {
                self.skip_type_params()?;
                self.parse_params()?
            }
            TokenKind::Punct("(") => self.parse_params()?,
            _ => return Ok(None),
        };
        if self.is_punct(":") {
            self.advance()?;
            self.skip_type()?;
        }
        if !self.is_punct("=>") || self.cur.newline_before {
            return Ok(None);
        }
        self.advance()?;
        let body = if self.is_punct("{") {
            ArrowBody::Block(self.parse_block()?)
        } else {
            ArrowBody::Expr(Box::new(self.parse_assignment()?))
        };
        Ok(Some(Arrow { params, body, is_async }))
    }

    fn parse_conditional(&mut self) -> PResult<Expr> {
        let test = self.parse_binary(0)?;
        if !self.eat_punct("?")? {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect_punct(":")?;
        let alternate = self.parse_assignment()?;
        Ok(Expr::Conditional { test: Box::new(test), consequent: Box::new(consequent), alternate: Box::new(alternate) })
    }

    fn binary_operator(&self) -> Option<(u8, &'static str)> {
        let op = match &self.cur.kind {
            TokenKind::Punct(p) => *p,
            TokenKind::Ident(name) if name == "instanceof" => "instanceof",
            TokenKind::Ident(name) if name == "in" => "in",
            _ => return None,
        };
        let precedence = match op {
            "??" => 1,
            "||" => 2,
            "&&" => 3,
            "|" => 4,
            "^" => 5,
            "&" => 6,
            "==" | "!=" | "===" | "!==" => 7,
            "<" | ">" | "<=" | ">=" | "instanceof" | "in" => 8,
            "<<" | ">>" | ">>>" => 9,
            "+" | "-" => 10,
            "*" | "/" | "%" => 11,
            "**" => 12,
            _ => return None,
        };
        Some((precedence, op))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> PResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            if (self.is_ident("as") || self.is_ident("satisfies")) && !self.cur.newline_before && min_precedence <= 8
            {
                self.advance()?;
                if !self.eat_ident("const")? {
                    self.skip_type()?;
                }
                left = Expr::TypeAssertion(Box::new(left));
                continue;
            }
            let Some((precedence, op)) = self.binary_operator() else { break };
            if precedence < min_precedence {
                break;
            }
            self.advance()?;
            let next_min = if op == "**" { precedence } else { precedence + 1 };
            let right = self.parse_binary(next_min)?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match &self.cur.kind {
            TokenKind::Punct(p @ ("!" | "~" | "+" | "-")) => Some(*p),
            TokenKind::Ident(name) if name == "typeof" => Some("typeof"),
            TokenKind::Ident(name) if name == "void" => Some("void"),
            TokenKind::Ident(name) if name == "delete" => Some("delete"),
            _ => None,
        };
        if let Some(op) = op {
            self.advance()?;
            self.enter()?;
            let arg = self.parse_unary();
            self.leave();
            return Ok(Expr::Unary { op, arg: Box::new(arg?) });
        }

        if let TokenKind::Punct(op @ ("++" | "--")) = &self.cur.kind {
            let op = *op;
            self.advance()?;
            self.enter()?;
            let arg = self.parse_unary();
            self.leave();
            return Ok(Expr::Update { op, prefix: true, arg: Box::new(arg?) });
        }

        if self.is_ident("await") {
            let next = self.peek()?;
            let is_operand = !next.is_punct(")")
                && !next.is_punct(";")
                && !next.is_punct(",")
                && !next.is_punct("=")
                && !next.is_punct(".")
                && next.kind != TokenKind::Eof;
            if is_operand {
                self.advance()?;
                self.enter()?;
                let arg = self.parse_unary();
                self.leave();
                return Ok(Expr::Await(Box::new(arg?)));
            }
        }

        let expr = self.parse_call_member(true)?;
        if let TokenKind::Punct(op @ ("++" | "--")) = &self.cur.kind {
            if !self.cur.newline_before {
                let op = *op;
                self.advance()?;
                return Ok(Expr::Update { op, prefix: false, arg: Box::new(expr) });
            }
        }
        Ok(expr)
    }

    /// Member access, calls, and postfix type operators. With `allow_call`
    /// off (the callee of `new`, a class heritage) argument lists end the
    /// chain.
    fn parse_call_member(&mut self, allow_call: bool) -> PResult<Expr> {
        let mut expr = if self.is_ident("new") { self.parse_new()? } else { self.parse_primary()? };
        loop {
            match &self.cur.kind {
                TokenKind::Punct(".") => {
                    self.advance()?;
                    let property = self.parse_member_name()?;
                    expr = Expr::Member { object: Box::new(expr), property, optional: false };
                }
                TokenKind::Punct("?.") => {
                    self.advance()?;
                    if self.is_punct("(") {
                        let args = self.parse_arguments()?;
                        expr = Expr::Call { callee: Box::new(expr), args, optional: true };
                    } else if self.eat_punct("[")? {
                        let index = self.parse_expression()?;
                        self.expect_punct("]")?;
                        expr = Expr::Member {
                            object: Box::new(expr),
                            property: MemberProp::Computed(Box::new(index)),
                            optional: true,
                        };
                    } else {
                        let property = self.parse_member_name()?;
                        expr = Expr::Member { object: Box::new(expr), property, optional: true };
                    }
                }
                TokenKind::Punct("[") => {
                    self.advance()?;
                    let index = self.parse_expression()?;
                    self.expect_punct("]")?;
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property: MemberProp::Computed(Box::new(index)),
                        optional: false,
                    };
                }
                TokenKind::Punct("(") if allow_call => {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call { callee: Box::new(expr), args, optional: false };
                }
                TokenKind::Backtick => {
                    let template = self.parse_template()?;
                    expr = Expr::TaggedTemplate { tag: Box::new(expr), template };
                }
                TokenKind::Punct("!") if !self.cur.newline_before => {
                    self.advance()?;
                    expr = Expr::TypeAssertion(Box::new(expr));
                }
                TokenKind::Punct("<") if matches!(expr, Expr::Ident(_) | Expr::Member { .. }) => {
                    // `f<T>(x)`: explicit type arguments, otherwise a comparison.
                    let explicit = self.attempt(|p| {
                        p.skip_type_args()?;
                        let call_follows = p.is_punct("(") || p.cur.kind == TokenKind::Backtick;
                        Ok(call_follows.then_some(()))
                    })?;
                    if explicit.is_none() {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_member_name(&mut self) -> PResult<MemberProp> {
        match &self.cur.kind {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(MemberProp::Ident(name))
            }
            TokenKind::PrivateName(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(MemberProp::Private(name))
            }
            other => Err(self.error(format!("expected property name but found {other}"))),
        }
    }

    fn parse_new(&mut self) -> PResult<Expr> {
        self.advance()?;
        if self.eat_punct(".")? {
            if !self.eat_ident("target")? {
                return Err(self.error("expected `new.target`"));
            }
            return Ok(Expr::MetaProperty("new.target"));
        }
        self.enter()?;
        let callee = self.parse_call_member(false);
        self.leave();
        let callee = callee?;
        let args = if self.is_punct("(") { self.parse_arguments()? } else { Vec::new() };
        Ok(Expr::New { callee: Box::new(callee), args })
    }

    fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        self.expect_punct("(")?;
        let mut args = Vec::new();
        while !self.is_punct(")") {
            if self.eat_punct("...")? {
                args.push(Expr::Spread(Box::new(self.parse_assignment()?)));
            } else {
                args.push(self.parse_assignment()?);
            }
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let expr = match &self.cur.kind {
            TokenKind::Ident(name) => match name.clone().as_str() {
                "function" => return Ok(Expr::Function(Box::new(self.parse_function(false)?))),
                "async" if self.peek_is_function_on_same_line()? => {
                    self.advance()?;
                    return Ok(Expr::Function(Box::new(self.parse_function(true)?)));
                }
                "class" => return Ok(Expr::Class(Box::new(self.parse_class()?))),
                "import" => return self.parse_import_expression(),
                "this" => Expr::This,
                "super" => Expr::Super,
                "null" => Expr::Null,
                "true" => Expr::Bool(true),
                "false" => Expr::Bool(false),
                word if RESERVED.contains(&word) => return Err(self.unexpected()),
                word => Expr::Ident(word.to_owned()),
            },
            TokenKind::Str(value) => Expr::Str(value.clone()),
            TokenKind::Num(value) => Expr::Num(*value),
            TokenKind::BigInt(value) => Expr::BigInt(value.clone()),
            TokenKind::PrivateName(name) => Expr::Ident(format!("#{name}")),
            TokenKind::Backtick => return Ok(Expr::Template(self.parse_template()?)),
            TokenKind::Punct("(") => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect_punct(")")?;
                return Ok(inner);
            }
            TokenKind::Punct("[") => return self.parse_array(),
            TokenKind::Punct("{") => return self.parse_object(),
            TokenKind::Punct("/" | "/=") => {
                let (pattern, flags) = self.lexer.read_regex(self.cur.start)?;
                Expr::Regex { pattern, flags }
            }
            TokenKind::Punct("<") => return self.parse_jsx(Mode::Normal),
            _ => return Err(self.unexpected()),
        };
        self.advance()?;
        Ok(expr)
    }

    fn parse_import_expression(&mut self) -> PResult<Expr> {
        self.advance()?;
        if self.eat_punct(".")? {
            if !self.eat_ident("meta")? {
                return Err(self.error("expected `import.meta`"));
            }
            return Ok(Expr::MetaProperty("import.meta"));
        }
        self.expect_punct("(")?;
        let source = self.parse_assignment()?;
        if self.eat_punct(",")? && !self.is_punct(")") {
            self.parse_assignment()?;
            self.eat_punct(",")?;
        }
        self.expect_punct(")")?;
        Ok(Expr::Import(Box::new(source)))
    }

    fn parse_array(&mut self) -> PResult<Expr> {
        self.advance()?;
        let mut elements = Vec::new();
        while !self.is_punct("]") {
            if self.eat_punct(",")? {
                elements.push(None);
                continue;
            }
            let element = if self.eat_punct("...")? {
                Expr::Spread(Box::new(self.parse_assignment()?))
            } else {
                self.parse_assignment()?
            };
            elements.push(Some(element));
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.expect_punct("]")?;
        Ok(Expr::Array(elements))
    }

    fn parse_object(&mut self) -> PResult<Expr> {
        self.advance()?;
        let mut members = Vec::new();
        while !self.is_punct("}") {
            members.push(self.parse_object_member()?);
            if !self.eat_punct(",")? {
                break;
            }
        }
        self.expect_punct("}")?;
        Ok(Expr::Object(members))
    }

    fn parse_object_member(&mut self) -> PResult<ObjectMember> {
        if self.eat_punct("...")? {
            return Ok(ObjectMember::Spread(self.parse_assignment()?));
        }

        let is_async = self.is_ident("async") && self.peek_starts_key()?;
        if is_async {
            self.advance()?;
        }
        let is_generator = self.eat_punct("*")?;
        if (self.is_ident("get") || self.is_ident("set")) && self.peek_starts_key()? {
            self.advance()?;
        }

        let key = self.parse_prop_key()?;
        if self.is_punct("(") || self.is_punct("<") {
            let (params, body) = self.parse_function_rest()?;
            let function = Function { name: None, params, body, is_async, is_generator };
            return Ok(ObjectMember::Method { key, function });
        }
        if self.eat_punct(":")? {
            let value = self.parse_assignment()?;
            return Ok(ObjectMember::Property { key, value });
        }

        let PropKey::Ident(name) = key else {
            return Err(self.error(format!("expected `:` but found {}", self.cur.kind)));
        };
        if self.eat_punct("=")? {
            // Shorthand with default, only meaningful in destructuring.
            let value = self.parse_assignment()?;
            let target = Box::new(Expr::Ident(name.clone()));
            return Ok(ObjectMember::Property {
                key: PropKey::Ident(name),
                value: Expr::Assign { op: "=", target, value: Box::new(value) },
            });
        }
        Ok(ObjectMember::Shorthand(name))
    }

    /// Parse a template literal whose opening backtick is the current token.
    fn parse_template(&mut self) -> PResult<Template> {
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        loop {
            let chunk = self.lexer.read_template_chunk()?;
            quasis.push(chunk.cooked);
            if chunk.tail {
                break;
            }
            self.advance()?;
            exprs.push(self.parse_expression()?);
            if !self.is_punct("}") {
                return Err(self.error(format!("expected `}}` in template literal but found {}", self.cur.kind)));
            }
        }
        self.advance()?;
        Ok(Template { quasis, exprs })
    }

    // =========================================================================
    // JSX
    // =========================================================================

    /// Parse a JSX element or fragment whose `<` is the current token.
    /// `after` is the lexing mode for the token following the closing `>`.
    fn parse_jsx(&mut self, after: Mode) -> PResult<Expr> {
        self.advance_in(Mode::JsxTag)?;
        self.parse_jsx_after_lt(after)
    }

    fn parse_jsx_after_lt(&mut self, after: Mode) -> PResult<Expr> {
        self.enter()?;
        let result = self.parse_jsx_after_lt_inner(after);
        self.leave();
        result
    }

    fn parse_jsx_after_lt_inner(&mut self, after: Mode) -> PResult<Expr> {
        if self.is_punct(">") {
            self.advance_in(Mode::JsxChild)?;
            let children = self.parse_jsx_children(None, after)?;
            return Ok(Expr::JsxFragment(JsxFragment { children }));
        }

        let name = self.parse_jsx_name()?;
        let mut attributes = Vec::new();
        loop {
            match &self.cur.kind {
                TokenKind::Punct("/") => {
                    self.advance_in(Mode::JsxTag)?;
                    if !self.is_punct(">") {
                        return Err(self.error(format!("expected `>` but found {}", self.cur.kind)));
                    }
                    self.advance_in(after)?;
                    return Ok(Expr::Jsx(JsxElement { name, attributes, children: Vec::new(), self_closing: true }));
                }
                TokenKind::Punct(">") => {
                    self.advance_in(Mode::JsxChild)?;
                    let children = self.parse_jsx_children(Some(&name), after)?;
                    return Ok(Expr::Jsx(JsxElement { name, attributes, children, self_closing: false }));
                }
                TokenKind::Punct("{") => {
                    self.advance()?;
                    self.expect_punct("...")?;
                    let expr = self.parse_assignment()?;
                    self.expect_punct_in("}", Mode::JsxTag)?;
                    attributes.push(JsxAttribute::Spread(expr));
                }
                TokenKind::Ident(attr) => {
                    let mut attr_name = attr.clone();
                    self.advance_in(Mode::JsxTag)?;
                    if self.is_punct(":") {
                        self.advance_in(Mode::JsxTag)?;
                        let TokenKind::Ident(local) = &self.cur.kind else {
                            return Err(self.error("expected attribute name after `:`"));
                        };
                        attr_name = format!("{attr_name}:{local}");
                        self.advance_in(Mode::JsxTag)?;
                    }
                    let value = if self.is_punct("=") {
                        self.advance_in(Mode::JsxTag)?;
                        Some(self.parse_jsx_attr_value()?)
                    } else {
                        None
                    };
                    attributes.push(JsxAttribute::Attr { name: attr_name, value });
                }
                TokenKind::Eof => return Err(self.error(format!("unterminated JSX tag <{name}>"))),
                other => return Err(self.error(format!("unexpected {other} in JSX tag <{name}>"))),
            }
        }
    }

    fn parse_jsx_attr_value(&mut self) -> PResult<JsxAttrValue> {
        match &self.cur.kind {
            TokenKind::Str(value) => {
                let value = value.clone();
                self.advance_in(Mode::JsxTag)?;
                Ok(JsxAttrValue::Str(value))
            }
            TokenKind::Punct("{") => {
                self.advance()?;
                let expr = if self.is_punct("}") { None } else { Some(self.parse_assignment()?) };
                self.expect_punct_in("}", Mode::JsxTag)?;
                Ok(JsxAttrValue::Expr(expr))
            }
            TokenKind::Punct("<") => match self.parse_jsx(Mode::JsxTag)? {
                Expr::Jsx(element) => Ok(JsxAttrValue::Element(Box::new(element))),
                Expr::JsxFragment(fragment) => Ok(JsxAttrValue::Fragment(fragment)),
                _ => Err(self.error("expected JSX attribute value")),
            },
            other => Err(self.error(format!("expected JSX attribute value but found {other}"))),
        }
    }

    fn parse_jsx_name(&mut self) -> PResult<JsxName> {
        let TokenKind::Ident(first) = &self.cur.kind else {
            return Err(self.error(format!("expected JSX element name but found {}", self.cur.kind)));
        };
        let first = first.clone();
        self.advance_in(Mode::JsxTag)?;

        if self.is_punct(":") {
            self.advance_in(Mode::JsxTag)?;
            let TokenKind::Ident(local) = &self.cur.kind else {
                return Err(self.error("expected name after `:`"));
            };
            let name = JsxName::Namespaced(first, local.clone());
            self.advance_in(Mode::JsxTag)?;
            return Ok(name);
        }

        let mut name = JsxName::Ident(first);

        while self.is_punct(".") {
            self.advance_in(Mode::JsxTag)?;
            let TokenKind::Ident(property) = &self.cur.kind else {
                return Err(self.error("expected member name after `.`"));
            };
            name = JsxName::Member(Box::new(name), property.clone());
            self.advance_in(Mode::JsxTag)?;
        }
        Ok(name)
    }

    /// Children up to and including the closing tag. `opening` is `None` for
    /// fragments.
    fn parse_jsx_children(&mut self, opening: Option<&JsxName>, after: Mode) -> PResult<Vec<JsxChild>> {
        let mut children = Vec::new();
        loop {
            match &self.cur.kind {
                TokenKind::JsxText(text) => {
                    children.push(JsxChild::Text(text.clone()));
                    self.advance_in(Mode::JsxChild)?;
                }
                TokenKind::Punct("{") => {
                    self.advance()?;
                    if self.is_punct("}") {
                        children.push(JsxChild::Empty);
                    } else if self.eat_punct("...")? {
                        children.push(JsxChild::Spread(self.parse_expression()?));
                    } else {
                        children.push(JsxChild::Expr(self.parse_expression()?));
                    }
                    self.expect_punct_in("}", Mode::JsxChild)?;
                }
                TokenKind::Punct("<") => {
                    self.advance_in(Mode::JsxTag)?;
                    if self.is_punct("/") {
                        self.advance_in(Mode::JsxTag)?;
                        self.parse_jsx_closing(opening)?;
                        self.advance_in(after)?;
                        return Ok(children);
                    }
                    match self.parse_jsx_after_lt(Mode::JsxChild)? {
                        Expr::Jsx(element) => children.push(JsxChild::Element(element)),
                        Expr::JsxFragment(fragment) => children.push(JsxChild::Fragment(fragment)),
                        _ => return Err(self.error("expected JSX child")),
                    }
                }
                TokenKind::Eof => {
                    let what = opening.map_or_else(|| "<>".to_owned(), |name| format!("<{name}>"));
                    return Err(self.error(format!("unterminated JSX contents of {what}")));
                }
                other => return Err(self.error(format!("unexpected {other} in JSX children"))),
            }
        }
    }

    /// Validate a closing tag; leaves the final `>` as the current token.
    fn parse_jsx_closing(&mut self, opening: Option<&JsxName>) -> PResult<()> {
        match opening {
            None => {
                if !self.is_punct(">") {
                    return Err(self.error("expected corresponding closing tag for <>"));
                }
            }
            Some(opening) => {
                if self.is_punct(">") {
                    return Err(self.error(format!("expected corresponding closing tag for <{opening}>")));
                }
                let closing = self.parse_jsx_name()?;
                if &closing != opening {
                    return Err(self.error(format!("expected corresponding closing tag for <{opening}>")));
                }
                if !self.is_punct(">") {
                    return Err(self.error(format!("expected `>` but found {}", self.cur.kind)));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
