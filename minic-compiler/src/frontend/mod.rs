// minic-compiler/src/frontend/mod.rs

pub mod keyword;
pub mod lexer;

// Expose the LALRPOP-generated parser module under frontend::grammar
lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all, unused_parens)]
    pub grammar,
    "/frontend/grammar.rs"
);
