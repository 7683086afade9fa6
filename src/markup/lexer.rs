//! On-demand TSX lexer.
//!
//! The parser pulls one token at a time and chooses the lexing mode for each
//! pull: ordinary code, the inside of a JSX tag, JSX child text, template
//! literal chunks, or a regular expression body. This keeps the context
//! sensitive corners of the language (markup text, `/` ambiguity, `${`)
//! decided by the parser, which is the only place that knows the context.
//!
//! Every pull burns one unit of fuel; fuel is proportional to the input size
//! and is never refunded on backtracking, so total work is bounded.

use std::fmt;

// =============================================================================
// ERRORS
// =============================================================================

/// A syntax error with a 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({line}:{column})")]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

// =============================================================================
// TOKENS
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifiers and keywords alike; the parser decides which is which.
    Ident(String),
    Str(String),
    Num(f64),
    BigInt(String),
    Punct(&'static str),
    PrivateName(String),
    Backtick,
    JsxText(String),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "`{name}`"),
            Self::Str(_) => f.write_str("string literal"),
            Self::Num(_) | Self::BigInt(_) => f.write_str("number literal"),
            Self::Punct(p) => write!(f, "`{p}`"),
            Self::PrivateName(name) => write!(f, "`#{name}`"),
            Self::Backtick => f.write_str("template literal"),
            Self::JsxText(_) => f.write_str("JSX text"),
            Self::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// A line terminator appeared between the previous token and this one.
    pub newline_before: bool,
}

impl Token {
    #[must_use]
    pub fn is_punct(&self, p: &str) -> bool {
        matches!(&self.kind, TokenKind::Punct(q) if *q == p)
    }

    #[must_use]
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(n) if n == name)
    }
}

/// One piece of a template literal between backticks and `${ … }` holes.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateChunk {
    /// Escape-processed text; `None` if an escape sequence was malformed.
    pub cooked: Option<String>,
    /// `true` when the chunk ended at the closing backtick.
    pub tail: bool,
}

// Longest first so that maximal munch falls out of a linear scan.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==", "!=", "<=", ">=",
    "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "**", "<<", ">>", "{", "}",
    "(", ")", "[", "]", ";", ",", "<", ">", "+", "-", "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".",
    "@",
];

const JSX_TAG_PUNCTUATORS: &[&str] = &["{", "}", "<", ">", "/", "=", ".", ":"];

/// Message of the error raised when the fuel budget runs out.
pub const OUT_OF_FUEL: &str = "input too complex";

/// Fuel granted per byte of input, plus a flat allowance.
const FUEL_PER_BYTE: usize = 64;
const FUEL_BASE: usize = 4096;

// =============================================================================
// LEXER
// =============================================================================

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    fuel: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        let mut lexer = Self { src, pos: 0, fuel: src.len().saturating_mul(FUEL_PER_BYTE) + FUEL_BASE };
        if src.starts_with("#!") {
            lexer.pos = src.find('\n').unwrap_or(src.len());
        }
        lexer
    }

    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Rewind (or fast-forward) to a byte offset previously handed out by
    /// this lexer.
    pub fn reset(&mut self, pos: usize) {
        self.pos = pos.min(self.src.len());
    }

    /// Build an error positioned at byte offset `pos`.
    #[must_use]
    pub fn error_at(&self, message: impl Into<String>, pos: usize) -> SyntaxError {
        let (line, column) = line_col(self.src, pos);
        SyntaxError { message: message.into(), line, column }
    }

    fn burn(&mut self) -> Result<(), SyntaxError> {
        if self.fuel == 0 {
            return Err(self.error_at(OUT_OF_FUEL, self.pos));
        }
        self.fuel -= 1;
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.src.get(self.pos + offset..)?.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    // -------------------------------------------------------------------------
    // Trivia
    // -------------------------------------------------------------------------

    /// Skip whitespace and comments; report whether a line break was seen.
    fn skip_trivia(&mut self) -> Result<bool, SyntaxError> {
        let mut newline = false;
        loop {
            let Some(c) = self.peek() else { return Ok(newline) };
            if is_line_terminator(c) {
                newline = true;
                self.bump();
            } else if c.is_whitespace() || c == '\u{feff}' {
                self.bump();
            } else if self.rest().starts_with("//") {
                while let Some(c) = self.peek() {
                    if is_line_terminator(c) {
                        break;
                    }
                    self.bump();
                }
            } else if self.rest().starts_with("/*") {
                let start = self.pos;
                let Some(end) = self.rest()[2..].find("*/") else {
                    return Err(self.error_at("unterminated comment", start));
                };
                let body = &self.rest()[2..2 + end];
                if body.chars().any(is_line_terminator) {
                    newline = true;
                }
                self.pos += 2 + end + 2;
            } else {
                return Ok(newline);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Normal mode
    // -------------------------------------------------------------------------

    /// Lex the next ordinary code token.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] for malformed literals, stray characters, or
    /// when the fuel budget is exhausted.
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.burn()?;
        let newline_before = self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token { kind: TokenKind::Eof, start, end: start, newline_before });
        };

        let kind = if is_ident_start(c) {
            TokenKind::Ident(self.read_ident_chars(false))
        } else if c.is_ascii_digit() || (c == '.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
            self.read_number()?
        } else if c == '"' || c == '\'' {
            TokenKind::Str(self.read_string(c)?)
        } else if c == '`' {
            self.bump();
            TokenKind::Backtick
        } else if c == '#' {
            self.bump();
            if !self.peek().is_some_and(is_ident_start) {
                return Err(self.error_at("unexpected character `#`", start));
            }
            TokenKind::PrivateName(self.read_ident_chars(false))
        } else {
            self.read_punct(PUNCTUATORS)
                .ok_or_else(|| self.error_at(format!("unexpected character `{c}`"), start))?
        };

        Ok(Token { kind, start, end: self.pos, newline_before })
    }

    fn read_punct(&mut self, table: &[&'static str]) -> Option<TokenKind> {
        let rest = self.rest();
        let found = table.iter().copied().find(|p| {
            rest.starts_with(p)
                // `a?.5:b` is a conditional, not optional chaining.
                && !(*p == "?." && rest[2..].starts_with(|d: char| d.is_ascii_digit()))
        })?;
        self.pos += found.len();
        Some(TokenKind::Punct(found))
    }

    fn read_ident_chars(&mut self, allow_dash: bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_ident_continue(c) || (allow_dash && c == '-') {
                self.bump();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_owned()
    }

    fn read_number(&mut self) -> Result<TokenKind, SyntaxError> {
        let start = self.pos;
        let rest = self.rest();
        let radix = match rest.get(..2) {
            Some("0x" | "0X") => Some(16),
            Some("0o" | "0O") => Some(8),
            Some("0b" | "0B") => Some(2),
            _ => None,
        };

        let kind = if let Some(radix) = radix {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c == '_' || c.is_digit(radix)) {
                self.bump();
            }
            let digits: String = self.src[digits_start..self.pos]
                .chars()
                .filter(|c| *c != '_')
                .collect();
            if digits.is_empty() {
                return Err(self.error_at("expected digits after radix prefix", start));
            }
            if self.peek() == Some('n') {
                self.bump();
                TokenKind::BigInt(self.src[start..self.pos - 1].replace('_', ""))
            } else {
                let value = digits
                    .chars()
                    .filter_map(|c| c.to_digit(radix))
                    .fold(0f64, |acc, d| acc * f64::from(radix) + f64::from(d));
                TokenKind::Num(value)
            }
        } else {
            let mut is_integer = true;
            self.eat_decimal_digits();
            if self.peek() == Some('.') {
                is_integer = false;
                self.bump();
                self.eat_decimal_digits();
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let save = self.pos;
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    is_integer = false;
                    self.eat_decimal_digits();
                } else {
                    self.pos = save;
                }
            }
            if is_integer && self.peek() == Some('n') {
                self.bump();
                TokenKind::BigInt(self.src[start..self.pos - 1].replace('_', ""))
            } else {
                let text = self.src[start..self.pos].replace('_', "");
                let value = text
                    .parse::<f64>()
                    .map_err(|_| self.error_at("malformed number literal", start))?;
                TokenKind::Num(value)
            }
        };

        if self.peek().is_some_and(is_ident_start) {
            return Err(self.error_at("identifier starts immediately after number literal", self.pos));
        }
        Ok(kind)
    }

    fn eat_decimal_digits(&mut self) {
        while self.peek().is_some_and(|c| c == '_' || c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String, SyntaxError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error_at("unterminated string literal", start)),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => {
                    let escape_pos = self.pos - 1;
                    self.read_escape(&mut out)
                        .map_err(|msg| self.error_at(msg, escape_pos))?;
                }
                Some('\n' | '\r') => return Err(self.error_at("unterminated string literal", start)),
                Some(c) => out.push(c),
            }
        }
    }

    /// Decode one escape sequence; the backslash is already consumed.
    fn read_escape(&mut self, out: &mut String) -> Result<(), &'static str> {
        let Some(c) = self.bump() else { return Err("unterminated escape sequence") };
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.peek().is_some_and(|d| d.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = self.read_hex_digits(2).ok_or("malformed \\x escape")?;
                out.push(char::from_u32(code).ok_or("malformed \\x escape")?);
            }
            'u' => {
                let code = self.read_unicode_escape()?;
                out.push(code);
            }
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
            }
            c if is_line_terminator(c) => {}
            c if c.is_ascii_digit() => return Err("octal escape sequences are not allowed"),
            c => out.push(c),
        }
        Ok(())
    }

    fn read_hex_digits(&mut self, count: usize) -> Option<u32> {
        let digits = self.rest().get(..count)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        self.pos += count;
        Some(value)
    }

    fn read_unicode_escape(&mut self) -> Result<char, &'static str> {
        if self.peek() == Some('{') {
            self.bump();
            let end = self.rest().find('}').ok_or("malformed \\u escape")?;
            let digits = &self.rest()[..end];
            let code = u32::from_str_radix(digits, 16).map_err(|_| "malformed \\u escape")?;
            self.pos += end + 1;
            return char::from_u32(code).ok_or("malformed \\u escape");
        }
        let high = self.read_hex_digits(4).ok_or("malformed \\u escape")?;
        if (0xD800..0xDC00).contains(&high) && self.rest().starts_with("\\u") {
            let save = self.pos;
            self.pos += 2;
            if let Some(low) = self.read_hex_digits(4).filter(|low| (0xDC00..0xE000).contains(low)) {
                let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                return char::from_u32(combined).ok_or("malformed \\u escape");
            }
            self.pos = save;
        }
        Ok(char::from_u32(high).unwrap_or('\u{fffd}'))
    }

    // -------------------------------------------------------------------------
    // Template literals
    // -------------------------------------------------------------------------

    /// Read template text up to the closing backtick or the next `${`.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the template is unterminated.
    pub fn read_template_chunk(&mut self) -> Result<TemplateChunk, SyntaxError> {
        self.burn()?;
        let start = self.pos;
        let mut cooked = Some(String::new());
        loop {
            match self.bump() {
                None => return Err(self.error_at("unterminated template literal", start)),
                Some('`') => return Ok(TemplateChunk { cooked, tail: true }),
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    return Ok(TemplateChunk { cooked, tail: false });
                }
                Some('\\') => {
                    let mut buf = String::new();
                    if self.read_escape(&mut buf).is_err() {
                        cooked = None;
                    } else if let Some(text) = cooked.as_mut() {
                        text.push_str(&buf);
                    }
                }
                Some('\r') => {
                    if self.peek() == Some('\n') {
                        self.bump();
                    }
                    if let Some(text) = cooked.as_mut() {
                        text.push('\n');
                    }
                }
                Some(c) => {
                    if let Some(text) = cooked.as_mut() {
                        text.push(c);
                    }
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Regular expressions
    // -------------------------------------------------------------------------

    /// Re-lex from `start` (which must hold a `/`) as a regular expression.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] if the expression is unterminated.
    pub fn read_regex(&mut self, start: usize) -> Result<(String, String), SyntaxError> {
        self.burn()?;
        self.pos = start + 1;
        let mut in_class = false;
        loop {
            match self.bump() {
                None => return Err(self.error_at("unterminated regular expression", start)),
                Some(c) if is_line_terminator(c) => {
                    return Err(self.error_at("unterminated regular expression", start));
                }
                Some('\\') => {
                    if self.bump().is_none_or(is_line_terminator) {
                        return Err(self.error_at("unterminated regular expression", start));
                    }
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some(_) => {}
            }
        }
        let pattern = self.src[start + 1..self.pos - 1].to_owned();
        let flags = self.read_ident_chars(false);
        Ok((pattern, flags))
    }

    // -------------------------------------------------------------------------
    // JSX modes
    // -------------------------------------------------------------------------

    /// Lex a token inside a JSX tag: names may contain `-`, strings take no
    /// escapes but decode character references.
    ///
    /// # Errors
    ///
    /// Returns a [`SyntaxError`] for unterminated strings or stray characters.
    pub fn next_jsx_tag_token(&mut self) -> Result<Token, SyntaxError> {
        self.burn()?;
        let newline_before = self.skip_trivia()?;
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token { kind: TokenKind::Eof, start, end: start, newline_before });
        };

        let kind = if is_ident_start(c) {
            TokenKind::Ident(self.read_ident_chars(true))
        } else if c == '"' || c == '\'' {
            self.bump();
            let Some(end) = self.rest().find(c) else {
                return Err(self.error_at("unterminated JSX attribute string", start));
            };
            let raw = &self.rest()[..end];
            let value = decode_entities(raw);
            self.pos += end + c.len_utf8();
            TokenKind::Str(value)
        } else {
            self.read_punct(JSX_TAG_PUNCTUATORS)
                .ok_or_else(|| self.error_at(format!("unexpected character `{c}` in JSX tag"), start))?
        };

        Ok(Token { kind, start, end: self.pos, newline_before })
    }

    /// Lex JSX child content: a run of text, or a `{` / `<` delimiter.
    ///
    /// # Errors
    ///
    /// Only fails when the fuel budget is exhausted.
    pub fn next_jsx_child_token(&mut self) -> Result<Token, SyntaxError> {
        self.burn()?;
        let start = self.pos;
        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some('{') => {
                self.bump();
                TokenKind::Punct("{")
            }
            Some('<') => {
                self.bump();
                TokenKind::Punct("<")
            }
            Some(_) => {
                let len = self.rest().find(['{', '<']).unwrap_or(self.rest().len());
                let raw = &self.rest()[..len];
                let text = decode_entities(raw);
                self.pos += len;
                TokenKind::JsxText(text)
            }
        };
        Ok(Token { kind, start, end: self.pos, newline_before: false })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_ident_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '$' || c == '_' || c == '\u{200c}' || c == '\u{200d}' || c.is_alphanumeric()
}

/// 1-based line and column (in characters) of a byte offset.
#[must_use]
pub fn line_col(src: &str, pos: usize) -> (usize, usize) {
    let pos = pos.min(src.len());
    let before = src.get(..pos).unwrap_or(src);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("copy", '©'),
    ("reg", '®'),
    ("trade", '™'),
    ("hellip", '…'),
    ("mdash", '—'),
    ("ndash", '–'),
    ("lsquo", '‘'),
    ("rsquo", '’'),
    ("ldquo", '“'),
    ("rdquo", '”'),
    ("laquo", '«'),
    ("raquo", '»'),
    ("bull", '•'),
    ("middot", '·'),
    ("times", '×'),
    ("divide", '÷'),
    ("deg", '°'),
    ("plusmn", '±'),
    ("euro", '€'),
    ("pound", '£'),
    ("yen", '¥'),
    ("cent", '¢'),
    ("sect", '§'),
    ("para", '¶'),
    ("larr", '←'),
    ("rarr", '→'),
    ("uarr", '↑'),
    ("darr", '↓'),
    ("harr", '↔'),
    ("hearts", '♥'),
];

/// Decode HTML character references in JSX text and attribute strings.
/// Unknown or malformed references are left as written.
#[must_use]
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_owned();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest[1..]
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..=semi]).map(|c| (c, semi + 2)));
        if let Some((c, consumed)) = decoded {
            out.push(c);
            rest = &rest[consumed..];
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code);
    }
    NAMED_ENTITIES
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|(_, c)| *c)
}

#[cfg(test)]
#[path = "lexer_test.rs"]
mod tests;
