use crate::frontend::lexer::{self, LexicalError, Token};
use crate::frontend::grammar;
use crate::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int,
    Float,
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimitiveType::Int => write!(f, "int"),
            PrimitiveType::Float => write!(f, "float"),
        }
    }
}

/// The single entry function: `int name() { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    /// Leading declarations of the body, in source order.
    pub declarations: Vec<Declaration>,
    /// Everything after the first non-declaration statement.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Split the body into its declaration block and statement block.
    pub fn new(name: String, items: Vec<Statement>) -> Self {
        let mut declarations = Vec::new();
        let mut rest = items.into_iter().peekable();
        while let Some(Statement::Declaration(_)) = rest.peek() {
            if let Some(Statement::Declaration(decl)) = rest.next() {
                declarations.push(decl);
            }
        }
        Program {
            name,
            declarations,
            statements: rest.collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub ty: PrimitiveType,
    pub id: String,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Declaration(Declaration),
    Assignment(Assignment),
    If {
        cond: Expr,
        body: Vec<Statement>,
    },
    IfElse {
        cond: Expr,
        then_body: Vec<Statement>,
        else_body: Vec<Statement>,
    },
    While {
        cond: Expr,
        body: Vec<Statement>,
    },
    /// `for (init cond; step) body`; `step` runs after every pass through `body`.
    For {
        init: Declaration,
        cond: Expr,
        step: Assignment,
        body: Vec<Statement>,
    },
    /// Brace-delimited list used where a single statement is expected.
    Block(Vec<Statement>),
    /// `;`
    Empty,
}

impl Statement {
    /// Flatten a control-statement body into a statement list.
    pub fn into_body(self) -> Vec<Statement> {
        match self {
            Statement::Block(body) => body,
            Statement::Empty => Vec::new(),
            other => vec![other],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(u64),
    Float(f64),
    Id(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Relational {
        op: RelOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Logical {
        op: LogicOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Literal(Literal),
}

impl Expr {
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn relational(op: RelOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Relational {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn logical(op: LogicOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Logical {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// Parsed AST along with the lexical errors recovered from on the way
#[derive(Debug, Clone)]
pub struct ParsedAst {
    pub program: Program,
    pub diagnostics: Vec<LexicalError>,
}

pub fn parse_to_ast(source: &str) -> Result<ParsedAst, CompileError> {
    let mut diagnostics = Vec::new();
    let tokens = lexer::tokenize(source).filter_map(|item| match item {
        Err(error) if error.is_recoverable() => {
            diagnostics.push(error);
            None
        }
        other => Some(other),
    });

    let program = grammar::ProgramParser::new()
        .parse(tokens)
        .map_err(|e| syntax_error(source, e))?;

    Ok(ParsedAst {
        program,
        diagnostics,
    })
}

/// Parse a standalone expression. Any lexical error is fatal here.
pub fn parse_expression(source: &str) -> Result<Expr, CompileError> {
    grammar::ExpressionParser::new()
        .parse(lexer::tokenize(source))
        .map_err(|e| syntax_error(source, e))
}

fn syntax_error(
    source: &str,
    e: lalrpop_util::ParseError<usize, Token, LexicalError>,
) -> CompileError {
    use lalrpop_util::ParseError;

    /// Build a friendly comma-separated "expected" list
    fn fmt_expected(expected: &[String]) -> String {
        expected
            .iter()
            .map(|s| lexer::friendly_token_name(s))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Helper: create CompileError::Syntax with line/col from byte position
    fn make_syntax_error(
        source: &str,
        position: usize,
        token: Option<&Token>,
        message: String,
    ) -> CompileError {
        let (line, col) = lexer::position_to_line_col(source, position);
        let context = lexer::get_error_context(source, position);
        CompileError::Syntax {
            line,
            col,
            context,
            token: token.map(Token::to_string),
            message,
        }
    }

    match e {
        ParseError::InvalidToken { location } => {
            make_syntax_error(source, location, None, "Invalid token".to_string())
        }
        ParseError::UnrecognizedEof { location, expected } => make_syntax_error(
            source,
            location,
            None,
            format!(
                "Unexpected end of input. Expected one of: {}",
                fmt_expected(&expected)
            ),
        ),
        ParseError::UnrecognizedToken {
            token: (start, tok, _end),
            expected,
        } => make_syntax_error(
            source,
            start,
            Some(&tok),
            format!(
                "Unexpected token '{}'. Expected one of: {}",
                tok,
                fmt_expected(&expected)
            ),
        ),
        ParseError::ExtraToken {
            token: (start, tok, _end),
        } => make_syntax_error(source, start, Some(&tok), format!("Extra token '{}'", tok)),
        // Lexical errors already carry line/col
        ParseError::User { error } => CompileError::Lexical(error),
    }
}
