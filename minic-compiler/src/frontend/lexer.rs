use logos::Logos;
use std::fmt;
use std::ops::Range;

use super::keyword::{self, Keyword, KeywordMap};

/// Tokens handed to the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- Literals and names ---
    Int(u64),
    Float(f64),
    /// Exact source slice of a string literal, quotes and escapes included.
    Str(String),
    Ident(String),
    Keyword(Keyword),

    // --- Single-character operators ---
    Star,
    Plus,
    Minus,
    Percent,
    Slash,
    Amp,
    Bang,
    Tilde,
    Pipe,
    Caret,
    Assign,
    Comma,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Semicolon,
    Lt,
    Gt,

    // --- Two-character operators ---
    AndAnd,
    OrOr,
    Le,
    Ge,
    EqEq,
    Ne,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(n) => write!(f, "{n}"),
            Token::Float(x) => write!(f, "{x:?}"),
            Token::Str(s) => write!(f, "{s}"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Keyword(kw) => write!(f, "{kw}"),
            Token::Star => write!(f, "*"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Percent => write!(f, "%"),
            Token::Slash => write!(f, "/"),
            Token::Amp => write!(f, "&"),
            Token::Bang => write!(f, "!"),
            Token::Tilde => write!(f, "~"),
            Token::Pipe => write!(f, "|"),
            Token::Caret => write!(f, "^"),
            Token::Assign => write!(f, "="),
            Token::Comma => write!(f, ","),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Semicolon => write!(f, ";"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::Le => write!(f, "<="),
            Token::Ge => write!(f, ">="),
            Token::EqEq => write!(f, "=="),
            Token::Ne => write!(f, "!="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexicalErrorKind {
    #[default]
    UnexpectedCharacter,
    /// Lexically an integer, but the digits do not fit the base or `u64`.
    InvalidIntegerConstant,
    /// End of input reached inside a string literal.
    UnterminatedString,
}

impl fmt::Display for LexicalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexicalErrorKind::UnexpectedCharacter => write!(f, "UnexpectedCharacter"),
            LexicalErrorKind::InvalidIntegerConstant => write!(f, "InvalidIntegerConstant"),
            LexicalErrorKind::UnterminatedString => write!(f, "UnterminatedString"),
        }
    }
}

// Normal mode. `Quote` never leaves the lexer: it switches to string mode.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexicalErrorKind)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    #[regex(r"[_a-zA-Z][_a-zA-Z0-9]*")]
    Word,

    #[regex(
        r"(0[xX][0-9a-fA-F]+|[0-9]+)([uU]([lL]|ll|LL|i64|I64)?|([lL]|ll|LL)[uU]?|i64|I64)?",
        parse_integer
    )]
    Int(u64),

    #[regex(r"([0-9]*\.[0-9]+|[0-9]+\.)([eE][+-]?[0-9]+)?[fFlL]?", parse_float)]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[fFlL]?", parse_float)]
    Float(f64),

    #[token("\"")]
    Quote,

    #[token("&&", |_| Token::AndAnd)]
    #[token("||", |_| Token::OrOr)]
    #[token("<=", |_| Token::Le)]
    #[token(">=", |_| Token::Ge)]
    #[token("==", |_| Token::EqEq)]
    #[token("!=", |_| Token::Ne)]
    #[token("*", |_| Token::Star)]
    #[token("+", |_| Token::Plus)]
    #[token("-", |_| Token::Minus)]
    #[token("%", |_| Token::Percent)]
    #[token("/", |_| Token::Slash)]
    #[token("&", |_| Token::Amp)]
    #[token("!", |_| Token::Bang)]
    #[token("~", |_| Token::Tilde)]
    #[token("|", |_| Token::Pipe)]
    #[token("^", |_| Token::Caret)]
    #[token("=", |_| Token::Assign)]
    #[token(",", |_| Token::Comma)]
    #[token("(", |_| Token::LParen)]
    #[token(")", |_| Token::RParen)]
    #[token("{", |_| Token::LBrace)]
    #[token("}", |_| Token::RBrace)]
    #[token(";", |_| Token::Semicolon)]
    #[token("<", |_| Token::Lt)]
    #[token(">", |_| Token::Gt)]
    Punct(Token),
}

// String mode: only body and closing-quote rules exist here.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexicalErrorKind)]
enum StringPart {
    #[regex(r#"[^"\\\n]+"#)]
    Chars,
    #[token(r#"\""#)]
    EscapedQuote,
    #[token(r"\\")]
    EscapedBackslash,
    #[token("\"")]
    Close,
}

/// Strip the suffix, then pick the base from the leading characters:
/// `0x`/`0X` is hex, a leading `0` with more digits is octal, else decimal.
fn integer_value(lexeme: &str) -> Result<u64, LexicalErrorKind> {
    let digits = lexeme
        .strip_suffix("i64")
        .or_else(|| lexeme.strip_suffix("I64"))
        .unwrap_or(lexeme)
        .trim_end_matches(['u', 'U', 'l', 'L']);

    let bytes = digits.as_bytes();
    let parsed = if bytes.len() > 1 && matches!(bytes[1], b'x' | b'X') {
        u64::from_str_radix(&digits[2..], 16)
    } else if bytes.len() > 1 && bytes[0] == b'0' {
        u64::from_str_radix(&digits[1..], 8)
    } else {
        digits.parse()
    };
    parsed.map_err(|_| LexicalErrorKind::InvalidIntegerConstant)
}

fn parse_integer(lex: &mut logos::Lexer<RawToken>) -> Result<u64, LexicalErrorKind> {
    integer_value(lex.slice())
}

fn parse_float(lex: &mut logos::Lexer<RawToken>) -> Option<f64> {
    lex.slice().trim_end_matches(['f', 'F', 'l', 'L']).parse().ok()
}

/// A lexical error with enough position information to print it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    pub kind: LexicalErrorKind,
    pub location: usize,
    pub line: usize,
    pub column: usize,
    pub unexpected_char: char,
    /// Offending source text (a single character unless the lexeme was a bad constant).
    pub lexeme: String,
    pub context: String,
}

impl LexicalError {
    /// Unexpected characters and bad constants are skipped; an unterminated
    /// string ends the scan.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.kind, LexicalErrorKind::UnterminatedString)
    }
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LexicalErrorKind::UnexpectedCharacter => write!(
                f,
                "Illegal character '{}' at line {}, column {} (position {})",
                self.unexpected_char, self.line, self.column, self.location
            )?,
            LexicalErrorKind::InvalidIntegerConstant => write!(
                f,
                "Invalid integer constant '{}' at line {}, column {} (position {})",
                self.lexeme, self.line, self.column, self.location
            )?,
            LexicalErrorKind::UnterminatedString => write!(
                f,
                "Unterminated string starting at line {}, column {} (position {})",
                self.line, self.column, self.location
            )?,
        }
        write!(f, "\n  Context: {}", self.context)
    }
}

impl std::error::Error for LexicalError {}

/// Convert a byte position to line and column numbers (1-based)
pub fn position_to_line_col(source: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= position {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// The trimmed source line containing `position`.
pub fn get_error_context(source: &str, position: usize) -> String {
    let position = position.min(source.len());
    let line_start = source
        .get(..position)
        .and_then(|before| before.rfind('\n'))
        .map(|pos| pos + 1)
        .unwrap_or(0);

    let line_end = source
        .get(position..)
        .and_then(|after| after.find('\n'))
        .map(|pos| position + pos)
        .unwrap_or(source.len());

    source
        .get(line_start..line_end)
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn create_lexical_error(source: &str, kind: LexicalErrorKind, span: Range<usize>) -> LexicalError {
    let (line, column) = position_to_line_col(source, span.start);
    let lexeme = source.get(span.clone()).unwrap_or_default().to_string();
    let unexpected_char = source
        .get(span.start..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or('\0');

    LexicalError {
        kind,
        location: span.start,
        line,
        column,
        unexpected_char,
        lexeme,
        context: get_error_context(source, span.start),
    }
}

// LALRPOP's expected item shape.
pub type Spanned<Tok, Loc, Error> = Result<(Loc, Tok, Loc), Error>;

/// Observable lexer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerState {
    Normal,
    InString,
}

enum Mode<'source> {
    Normal(logos::Lexer<'source, RawToken>),
    InString {
        lexer: logos::Lexer<'source, StringPart>,
        start: usize,
    },
}

/// Lazy, single-pass token stream over one source string.
///
/// Yields `Err` for every lexical error and keeps going afterwards, except
/// for an unterminated string, which is the last item produced.
pub struct Lexer<'source> {
    source: &'source str,
    keywords: &'static KeywordMap,
    mode: Option<Mode<'source>>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            keywords: keyword::keyword_map(),
            mode: Some(Mode::Normal(RawToken::lexer(source))),
        }
    }

    pub fn state(&self) -> LexerState {
        match self.mode {
            Some(Mode::InString { .. }) => LexerState::InString,
            _ => LexerState::Normal,
        }
    }

    fn word(&self, lexeme: &str) -> Token {
        match self.keywords.get(lexeme) {
            Some(kw) => Token::Keyword(*kw),
            None => Token::Ident(lexeme.to_string()),
        }
    }

    fn error(&self, kind: LexicalErrorKind, span: Range<usize>) -> LexicalError {
        create_lexical_error(self.source, kind, span)
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Spanned<Token, usize, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.mode.take()? {
                Mode::Normal(mut lexer) => {
                    let result = lexer.next()?;
                    let span = lexer.span();
                    let token = match result {
                        Ok(RawToken::Quote) => {
                            self.mode = Some(Mode::InString {
                                lexer: lexer.morph(),
                                start: span.start,
                            });
                            continue;
                        }
                        Ok(RawToken::Word) => Ok(self.word(lexer.slice())),
                        Ok(RawToken::Int(n)) => Ok(Token::Int(n)),
                        Ok(RawToken::Float(x)) => Ok(Token::Float(x)),
                        Ok(RawToken::Punct(tok)) => Ok(tok),
                        Err(kind) => Err(kind),
                    };
                    self.mode = Some(Mode::Normal(lexer));
                    return Some(match token {
                        Ok(tok) => Ok((span.start, tok, span.end)),
                        Err(kind) => Err(self.error(kind, span)),
                    });
                }
                Mode::InString { mut lexer, start } => match lexer.next() {
                    None => {
                        let kind = LexicalErrorKind::UnterminatedString;
                        return Some(Err(self.error(kind, start..self.source.len())));
                    }
                    Some(Ok(StringPart::Close)) => {
                        let end = lexer.span().end;
                        self.mode = Some(Mode::Normal(lexer.morph()));
                        let text = self.source[start..end].to_string();
                        return Some(Ok((start, Token::Str(text), end)));
                    }
                    Some(Ok(_)) => self.mode = Some(Mode::InString { lexer, start }),
                    Some(Err(kind)) => {
                        let span = lexer.span();
                        self.mode = Some(Mode::InString { lexer, start });
                        return Some(Err(self.error(kind, span)));
                    }
                },
            }
        }
    }
}

pub fn tokenize(source: &str) -> Lexer<'_> {
    Lexer::new(source)
}

/// Map a LALRPOP expected-terminal name (e.g. `"\"while\""`) to a friendly symbol.
pub fn friendly_token_name(name: &str) -> String {
    // LALRPOP wraps names in quotes
    let inner = name.trim_matches('"');
    match inner {
        "identifier" | "integer constant" | "float constant" => inner.to_string(),
        other => format!("'{other}'"),
    }
}
