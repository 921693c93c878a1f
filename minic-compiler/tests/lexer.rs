use minic_compiler::frontend::keyword::Keyword;
use minic_compiler::frontend::lexer::LexerState;
use minic_compiler::{tokenize, LexicalErrorKind, Lexer, Token};

/// Tokens of an input that must lex cleanly.
fn tokens(source: &str) -> Vec<Token> {
    tokenize(source)
        .map(|item| item.map(|(_, tok, _)| tok))
        .collect::<Result<_, _>>()
        .expect("input should lex without errors")
}

fn single(source: &str) -> Token {
    let toks = tokens(source);
    assert_eq!(toks.len(), 1, "expected one token for {source:?}, got {toks:?}");
    toks.into_iter().next().unwrap()
}

fn float_value(source: &str) -> f64 {
    match single(source) {
        Token::Float(x) => x,
        other => panic!("expected a float for {source:?}, got {other:?}"),
    }
}

// ── Integers ─────────────────────────────────────────────────────────────

#[test]
fn decimal_integers() {
    assert_eq!(single("1934"), Token::Int(1934));
    assert_eq!(single("90000000000004"), Token::Int(90000000000004));
    assert_eq!(single("0"), Token::Int(0));
}

#[test]
fn octal_and_hex_integers() {
    assert_eq!(single("034"), Token::Int(28));
    assert_eq!(single("0x8a44000000000040"), Token::Int(0x8a44_0000_0000_0040));
    assert_eq!(single("0XFF"), Token::Int(255));
}

#[test]
fn integer_suffixes_do_not_change_value() {
    assert_eq!(
        tokens("10u 0x1FULL 017l 5i64 7LLU"),
        vec![
            Token::Int(10),
            Token::Int(31),
            Token::Int(15),
            Token::Int(5),
            Token::Int(7),
        ]
    );
}

#[test]
fn oversized_integer_is_reported_and_skipped() {
    let items: Vec<_> = tokenize("99999999999999999999 1").collect();
    assert_eq!(items.len(), 2);
    let err = items[0].clone().unwrap_err();
    assert_eq!(err.kind, LexicalErrorKind::InvalidIntegerConstant);
    assert_eq!(err.lexeme, "99999999999999999999");
    assert!(err.is_recoverable());
    assert_eq!(items[1], Ok((21, Token::Int(1), 22)));
}

// ── Floats ───────────────────────────────────────────────────────────────

#[test]
fn fractional_floats() {
    assert_eq!(float_value("15.75"), 15.75);
    assert_eq!(float_value("1."), 1.0);
    assert_eq!(float_value(".54"), 0.54);
}

#[test]
fn exponent_floats() {
    assert_eq!(float_value("1.575E1"), 15.75);
    assert_eq!(float_value("1575e-2"), 15.75);
    assert_eq!(float_value("2.5e-3"), 0.0025);
    assert_eq!(float_value("25E-4"), 0.0025);
}

#[test]
fn float_suffixes_are_dropped() {
    assert_eq!(float_value("2.5f"), 2.5);
    assert_eq!(float_value("1e3L"), 1000.0);
}

// ── Strings ──────────────────────────────────────────────────────────────

#[test]
fn string_keeps_exact_source_slice() {
    let source = r#""hello \"world\"""#;
    assert_eq!(single(source), Token::Str(source.to_string()));
}

#[test]
fn escaped_backslash_does_not_close_string() {
    let source = r#""a\\" b"#;
    assert_eq!(
        tokens(source),
        vec![Token::Str(r#""a\\""#.to_string()), Token::Ident("b".into())]
    );
}

#[test]
fn string_span_covers_both_quotes() {
    let items: Vec<_> = tokenize(r#"x "ab" y"#).collect();
    assert_eq!(items[1], Ok((2, Token::Str(r#""ab""#.into()), 6)));
}

#[test]
fn lone_backslash_in_string_is_reported_and_skipped() {
    let source = r#""a\qb""#;
    let items: Vec<_> = tokenize(source).collect();
    assert_eq!(items.len(), 2);
    let err = items[0].clone().unwrap_err();
    assert_eq!(err.kind, LexicalErrorKind::UnexpectedCharacter);
    assert_eq!(err.unexpected_char, '\\');
    assert_eq!(items[1], Ok((0, Token::Str(source.to_string()), 6)));
}

#[test]
fn unterminated_string_ends_the_scan() {
    let mut lexer = tokenize("x = \"abc");
    assert!(matches!(lexer.next(), Some(Ok((_, Token::Ident(_), _)))));
    assert!(matches!(lexer.next(), Some(Ok((_, Token::Assign, _)))));

    let err = lexer.next().unwrap().unwrap_err();
    assert_eq!(err.kind, LexicalErrorKind::UnterminatedString);
    assert_eq!(err.location, 4);
    assert!(!err.is_recoverable());
    assert!(lexer.next().is_none());
}

#[test]
fn lexer_reports_its_mode() {
    let mut lexer = Lexer::new(r#""a\q" 1"#);
    assert_eq!(lexer.state(), LexerState::Normal);

    // the stray backslash is reported from inside the string
    assert!(lexer.next().unwrap().is_err());
    assert_eq!(lexer.state(), LexerState::InString);

    assert!(matches!(lexer.next(), Some(Ok((_, Token::Str(_), _)))));
    assert_eq!(lexer.state(), LexerState::Normal);
}

// ── Identifiers and keywords ─────────────────────────────────────────────

#[test]
fn keywords_are_reclassified() {
    let tok = single("auto");
    assert_eq!(tok, Token::Keyword(Keyword::Auto));
    assert_eq!(tok.to_string(), "auto");
    assert_eq!(single("__declspec"), Token::Keyword(Keyword::MsDeclspec));
    assert_eq!(single("_Bool"), Token::Keyword(Keyword::Bool));
}

#[test]
fn non_keywords_are_identifiers() {
    assert_eq!(single("LastNum"), Token::Ident("LastNum".into()));
    assert_eq!(single("_tmp1"), Token::Ident("_tmp1".into()));
    assert_eq!(single("integer"), Token::Ident("integer".into()));
}

// ── Operators ────────────────────────────────────────────────────────────

#[test]
fn compound_operators_win_over_single_characters() {
    assert_eq!(
        tokens("a<=b&&c!=d||!e"),
        vec![
            Token::Ident("a".into()),
            Token::Le,
            Token::Ident("b".into()),
            Token::AndAnd,
            Token::Ident("c".into()),
            Token::Ne,
            Token::Ident("d".into()),
            Token::OrOr,
            Token::Bang,
            Token::Ident("e".into()),
        ]
    );
}

#[test]
fn every_single_character_operator() {
    let toks = tokens("*+-%/&!~|^=,(){};<>");
    assert_eq!(toks.len(), 19);
    let rendered: String = toks.iter().map(Token::to_string).collect();
    assert_eq!(rendered, "*+-%/&!~|^=,(){};<>");
}

// ── Whitespace, comments and recovery ────────────────────────────────────

#[test]
fn whitespace_and_line_comments_are_skipped() {
    assert_eq!(
        tokens("x\t// note\n  y"),
        vec![Token::Ident("x".into()), Token::Ident("y".into())]
    );
}

#[test]
fn unexpected_character_is_reported_once_and_skipped() {
    let items: Vec<_> = tokenize("int @ x;").collect();
    let errors: Vec<_> = items.iter().filter_map(|i| i.as_ref().err()).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].unexpected_char, '@');
    assert_eq!(errors[0].location, 4);
    assert_eq!((errors[0].line, errors[0].column), (1, 5));

    let toks: Vec<_> = items.into_iter().filter_map(Result::ok).map(|t| t.1).collect();
    assert_eq!(
        toks,
        vec![
            Token::Keyword(Keyword::Int),
            Token::Ident("x".into()),
            Token::Semicolon,
        ]
    );
}

#[test]
fn relexing_is_deterministic() {
    let source = "int main() { float f = 1.5e2; f = f / 034; }";
    let first: Vec<_> = tokenize(source).collect();
    let second: Vec<_> = tokenize(source).collect();
    assert_eq!(first, second);
}
