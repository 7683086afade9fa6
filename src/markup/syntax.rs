//! Generic syntax tree for TSX source.
//!
//! Only the shapes the locator and compiler care about keep their structure
//! (declarations, functions, returns, JSX, literals). Everything else is kept
//! coarsely so that a well-formed program still parses end to end. Type-level
//! syntax never reaches this tree; the parser skips it.

/// A parsed program: ordered top-level statements.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Var(VarDecl),
    Function(Function),
    Class(Class),
    Return(Option<Expr>),
    Block(Vec<Stmt>),
    If { test: Expr, consequent: Box<Stmt>, alternate: Option<Box<Stmt>> },
    Loop { body: Box<Stmt> },
    Switch { discriminant: Expr, cases: Vec<Vec<Stmt>> },
    Try { block: Vec<Stmt>, handler: Option<Vec<Stmt>>, finalizer: Option<Vec<Stmt>> },
    Throw(Expr),
    Labeled { label: String, body: Box<Stmt> },
    /// `export <decl>` or `export default <decl | expr>`.
    Export { default: bool, decl: Box<Stmt> },
    /// Import, re-export list, `break`, `continue`, `;`, and skipped
    /// TypeScript declarations.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone)]
pub struct Declarator {
    pub target: Pattern,
    pub init: Option<Expr>,
}

/// Binding target of a declaration or parameter.
#[derive(Debug, Clone)]
pub enum Pattern {
    Ident(String),
    Object(Vec<Pattern>),
    Array(Vec<Option<Pattern>>),
    Rest(Box<Pattern>),
    Default(Box<Pattern>, Box<Expr>),
    /// Assignment-target expressions (`a.b`, `a[0]`) in loose positions.
    Expr(Box<Expr>),
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Pattern>,
    /// `None` for overload signatures and abstract members.
    pub body: Option<Vec<Stmt>>,
    pub is_async: bool,
    pub is_generator: bool,
}

#[derive(Debug, Clone)]
pub struct Arrow {
    pub params: Vec<Pattern>,
    pub body: ArrowBody,
    pub is_async: bool,
}

#[derive(Debug, Clone)]
pub enum ArrowBody {
    Expr(Box<Expr>),
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: Option<String>,
    pub super_class: Option<Box<Expr>>,
    pub members: Vec<ClassMember>,
}

#[derive(Debug, Clone)]
pub enum ClassMember {
    Method { key: PropKey, function: Function },
    Field { key: PropKey, value: Option<Expr> },
    StaticBlock(Vec<Stmt>),
}

#[derive(Debug, Clone)]
pub enum PropKey {
    Ident(String),
    Str(String),
    Num(f64),
    Private(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone)]
pub enum ObjectMember {
    Property { key: PropKey, value: Expr },
    Shorthand(String),
    Method { key: PropKey, function: Function },
    Spread(Expr),
}

/// Template literal: `quasis.len() == exprs.len() + 1`. A quasi is `None`
/// when its escape sequences are invalid (only legal in tagged templates).
#[derive(Debug, Clone)]
pub struct Template {
    pub quasis: Vec<Option<String>>,
    pub exprs: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Str(String),
    Num(f64),
    BigInt(String),
    Bool(bool),
    Null,
    Regex { pattern: String, flags: String },
    Template(Template),
    TaggedTemplate { tag: Box<Expr>, template: Template },
    Ident(String),
    This,
    Super,
    Array(Vec<Option<Expr>>),
    Object(Vec<ObjectMember>),
    Function(Box<Function>),
    Arrow(Box<Arrow>),
    Class(Box<Class>),
    Unary { op: &'static str, arg: Box<Expr> },
    Update { op: &'static str, prefix: bool, arg: Box<Expr> },
    Binary { op: &'static str, left: Box<Expr>, right: Box<Expr> },
    Assign { op: &'static str, target: Box<Expr>, value: Box<Expr> },
    Conditional { test: Box<Expr>, consequent: Box<Expr>, alternate: Box<Expr> },
    Call { callee: Box<Expr>, args: Vec<Expr>, optional: bool },
    New { callee: Box<Expr>, args: Vec<Expr> },
    Member { object: Box<Expr>, property: MemberProp, optional: bool },
    Sequence(Vec<Expr>),
    Spread(Box<Expr>),
    Await(Box<Expr>),
    Yield(Option<Box<Expr>>),
    /// `expr as T`, `expr satisfies T`, `expr!`.
    TypeAssertion(Box<Expr>),
    /// `new.target` / `import.meta`.
    MetaProperty(&'static str),
    /// Dynamic `import(…)`.
    Import(Box<Expr>),
    Jsx(JsxElement),
    JsxFragment(JsxFragment),
}

#[derive(Debug, Clone)]
pub enum MemberProp {
    Ident(String),
    Private(String),
    Computed(Box<Expr>),
}

// =============================================================================
// JSX
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsxName {
    Ident(String),
    Member(Box<JsxName>, String),
    Namespaced(String, String),
}

impl std::fmt::Display for JsxName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ident(name) => f.write_str(name),
            Self::Member(object, property) => write!(f, "{object}.{property}"),
            Self::Namespaced(ns, name) => write!(f, "{ns}:{name}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsxElement {
    pub name: JsxName,
    pub attributes: Vec<JsxAttribute>,
    pub children: Vec<JsxChild>,
    pub self_closing: bool,
}

#[derive(Debug, Clone)]
pub struct JsxFragment {
    pub children: Vec<JsxChild>,
}

#[derive(Debug, Clone)]
pub enum JsxAttribute {
    Attr { name: String, value: Option<JsxAttrValue> },
    Spread(Expr),
}

#[derive(Debug, Clone)]
pub enum JsxAttrValue {
    /// Quoted attribute string, entities already decoded.
    Str(String),
    /// `{expr}`; `None` for an empty container.
    Expr(Option<Expr>),
    Element(Box<JsxElement>),
    Fragment(JsxFragment),
}

#[derive(Debug, Clone)]
pub enum JsxChild {
    /// Raw text with entities decoded; whitespace untouched.
    Text(String),
    /// `{expr}`.
    Expr(Expr),
    /// `{}` or `{/* comment */}`.
    Empty,
    Spread(Expr),
    Element(JsxElement),
    Fragment(JsxFragment),
}
