//! AST to IR lowering module.
//!
//! This module walks the AST depth-first and emits a single basic-block
//! function through the backend builder.

pub mod context;
pub mod stmt;
pub mod expr;

use crate::backend::{verify_module, Module};
use crate::ir::ast::Program;
use crate::CompileError;

/// The main Gen struct that orchestrates the lowering process.
pub use context::{Gen, Operand};

/// Entry point for lowering an AST Program to a verified IR module.
pub fn lower(program: &Program) -> Result<Module, CompileError> {
    let mut g = Gen::new(&program.name);
    g.lower_program(program)?;
    let function = g.finish()?;

    let mut module = Module::new(program.name.clone());
    module.functions.push(function);
    verify_module(&module)?;
    Ok(module)
}
