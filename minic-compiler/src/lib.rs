pub mod frontend;
pub mod ir;
pub mod backend;

pub use frontend::lexer::{tokenize, LexicalError, LexicalErrorKind, Lexer, Token};
pub use ir::ast::{parse_to_ast as parse, ParsedAst};
pub use ir::ir_generator::lower;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Lexical error: {0}")]
    Lexical(#[from] frontend::lexer::LexicalError),

    #[error("Syntax error ({line}:{col}) - {message}\n  Context: {context}")]
    Syntax {
        line: usize,
        col: usize,
        context: String,
        /// Source text of the offending token, absent at end of input
        token: Option<String>,
        message: String,
    },

    #[error("SemanticError:{kind} '{name}' - {message}")]
    Semantic {
        kind: SemanticErrorKind,
        name: String,
        message: String,
    },

    #[error("Invalid IR: {0}")]
    InvalidIr(#[from] backend::IrError),

    #[error("Internal compiler error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
    UndeclaredIdentifier,
    Redeclaration,
}

impl std::fmt::Display for SemanticErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticErrorKind::UndeclaredIdentifier => write!(f, "UndeclaredIdentifier"),
            SemanticErrorKind::Redeclaration => write!(f, "Redeclaration"),
        }
    }
}

/// Result of a full compile: the module plus recovered lexical errors.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub module: backend::Module,
    pub diagnostics: Vec<LexicalError>,
}

/// Run the whole pipeline: lex, parse, lower, verify.
pub fn compile_to_ir(source: &str) -> Result<Compilation, CompileError> {
    let parsed = ir::ast::parse_to_ast(source)?;
    let module = ir::ir_generator::lower(&parsed.program)?;

    Ok(Compilation {
        module,
        diagnostics: parsed.diagnostics,
    })
}
