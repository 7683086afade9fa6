use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(src);
    let mut out = Vec::new();
    loop {
        let token = lexer.next_token().expect("lex");
        if token.kind == TokenKind::Eof {
            return out;
        }
        out.push(token.kind);
    }
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Ident(name.to_owned())
}

// =============================================================================
// NORMAL MODE
// =============================================================================

#[test]
fn punctuators_use_maximal_munch() {
    assert_eq!(
        kinds("a >>>= b ?? c?.d"),
        vec![
            ident("a"),
            TokenKind::Punct(">>>="),
            ident("b"),
            TokenKind::Punct("??"),
            ident("c"),
            TokenKind::Punct("?."),
            ident("d"),
        ]
    );
}

#[test]
fn question_dot_before_digit_is_conditional() {
    assert_eq!(
        kinds("a?.5:b"),
        vec![ident("a"), TokenKind::Punct("?"), TokenKind::Num(0.5), TokenKind::Punct(":"), ident("b")]
    );
}

#[test]
fn numbers_in_all_radixes() {
    assert_eq!(
        kinds("42 0x1F 0o17 0b101 1_000 1.5e3 .25"),
        vec![
            TokenKind::Num(42.0),
            TokenKind::Num(31.0),
            TokenKind::Num(15.0),
            TokenKind::Num(5.0),
            TokenKind::Num(1000.0),
            TokenKind::Num(1500.0),
            TokenKind::Num(0.25),
        ]
    );
}

#[test]
fn bigint_literals_keep_their_digits() {
    assert_eq!(kinds("10n 0xffn"), vec![TokenKind::BigInt("10".into()), TokenKind::BigInt("0xff".into())]);
}

#[test]
fn identifier_glued_to_number_is_an_error() {
    let err = Lexer::new("3px").next_token().unwrap_err();
    assert!(err.message.contains("identifier starts immediately"));
}

#[test]
fn string_escapes_are_decoded() {
    assert_eq!(
        kinds(r#"'a\nb' "\x41\u0042\u{43}" '\uD83D\uDE00'"#),
        vec![TokenKind::Str("a\nb".into()), TokenKind::Str("ABC".into()), TokenKind::Str("😀".into())]
    );
}

#[test]
fn octal_escapes_are_rejected() {
    let err = Lexer::new(r"'\101'").next_token().unwrap_err();
    assert!(err.message.contains("octal"));
}

#[test]
fn unterminated_string_reports_position() {
    let err = Lexer::new("\n  'abc").next_token().unwrap_err();
    assert_eq!((err.line, err.column), (2, 3));
    assert_eq!(err.to_string(), "unterminated string literal (2:3)");
}

#[test]
fn comments_are_skipped_and_track_newlines() {
    let mut lexer = Lexer::new("a /* one\ntwo */ b // tail\nc");
    assert!(!lexer.next_token().unwrap().newline_before);
    assert!(lexer.next_token().unwrap().newline_before);
    let c = lexer.next_token().unwrap();
    assert_eq!(c.kind, ident("c"));
    assert!(c.newline_before);
}

#[test]
fn hashbang_line_is_ignored() {
    assert_eq!(kinds("#!/usr/bin/env node\nx"), vec![ident("x")]);
}

#[test]
fn private_names() {
    assert_eq!(kinds("#count"), vec![TokenKind::PrivateName("count".into())]);
}

// =============================================================================
// TEMPLATES AND REGEX
// =============================================================================

#[test]
fn template_chunks_split_at_holes() {
    let mut lexer = Lexer::new("`a${x}b`");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Backtick);

    let head = lexer.read_template_chunk().unwrap();
    assert_eq!(head, TemplateChunk { cooked: Some("a".into()), tail: false });
    assert_eq!(lexer.next_token().unwrap().kind, ident("x"));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Punct("}"));

    let tail = lexer.read_template_chunk().unwrap();
    assert_eq!(tail, TemplateChunk { cooked: Some("b".into()), tail: true });
}

#[test]
fn malformed_template_escape_has_no_cooked_value() {
    let mut lexer = Lexer::new(r"`\unicode`");
    lexer.next_token().unwrap();
    let chunk = lexer.read_template_chunk().unwrap();
    assert_eq!(chunk.cooked, None);
    assert!(chunk.tail);
}

#[test]
fn regex_is_relexed_from_slash() {
    let mut lexer = Lexer::new("/[/]+\\//gi;");
    let slash = lexer.next_token().unwrap();
    assert_eq!(slash.kind, TokenKind::Punct("/"));
    let (pattern, flags) = lexer.read_regex(slash.start).unwrap();
    assert_eq!(pattern, "[/]+\\/");
    assert_eq!(flags, "gi");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Punct(";"));
}

#[test]
fn unterminated_regex_fails() {
    let mut lexer = Lexer::new("/abc\n/");
    let slash = lexer.next_token().unwrap();
    assert!(lexer.read_regex(slash.start).is_err());
}

// =============================================================================
// JSX MODES
// =============================================================================

#[test]
fn jsx_tag_names_allow_dashes_and_strings_decode_entities() {
    let mut lexer = Lexer::new(r#"aria-label="Tom &amp; Jerry" />"#);
    assert_eq!(lexer.next_jsx_tag_token().unwrap().kind, ident("aria-label"));
    assert_eq!(lexer.next_jsx_tag_token().unwrap().kind, TokenKind::Punct("="));
    assert_eq!(lexer.next_jsx_tag_token().unwrap().kind, TokenKind::Str("Tom & Jerry".into()));
    assert_eq!(lexer.next_jsx_tag_token().unwrap().kind, TokenKind::Punct("/"));
    assert_eq!(lexer.next_jsx_tag_token().unwrap().kind, TokenKind::Punct(">"));
}

#[test]
fn jsx_attribute_strings_take_no_escapes() {
    let mut lexer = Lexer::new(r#""C:\temp""#);
    assert_eq!(lexer.next_jsx_tag_token().unwrap().kind, TokenKind::Str(r"C:\temp".into()));
}

#[test]
fn jsx_child_text_runs_until_brace_or_angle() {
    let mut lexer = Lexer::new("Don't stop &gt; go{x}<b>");
    assert_eq!(lexer.next_jsx_child_token().unwrap().kind, TokenKind::JsxText("Don't stop > go".into()));
    assert_eq!(lexer.next_jsx_child_token().unwrap().kind, TokenKind::Punct("{"));
}

// =============================================================================
// HELPERS
// =============================================================================

#[test]
fn entities_decode_named_decimal_and_hex() {
    assert_eq!(decode_entities("&lt;b&gt; &#65;&#x42; &copy;"), "<b> AB ©");
}

#[test]
fn unknown_entities_are_left_alone() {
    assert_eq!(decode_entities("a &bogus; b & c"), "a &bogus; b & c");
}

#[test]
fn line_col_counts_characters() {
    let src = "ab\nçd|";
    assert_eq!(line_col(src, 0), (1, 1));
    assert_eq!(line_col(src, src.find('|').unwrap()), (2, 3));
}

#[test]
fn fuel_is_bounded() {
    let mut lexer = Lexer::new("a");
    let mut result = Ok(());
    for _ in 0..10_000 {
        lexer.reset(0);
        if let Err(err) = lexer.next_token() {
            result = Err(err);
            break;
        }
    }
    assert_eq!(result.unwrap_err().message, OUT_OF_FUEL);
}
