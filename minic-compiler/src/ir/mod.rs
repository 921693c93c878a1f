//! Front half of the pipeline after lexing.
//!
//! This module contains the AST definitions, the flat symbol table and the
//! AST-to-IR generator.

pub mod ast;
pub mod ir_generator;
pub mod symbol_table;
