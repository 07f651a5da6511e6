//! Symbol table and post-parse model handling.
//!
//! The parser fills a [`SymbolTable`] with declared and defined variables and
//! their equations. This module also holds the index substitution used to
//! unroll array equations, the writer that turns a table back into model text,
//! and validation run before code generation.

mod table;
mod types;
mod unroll;
mod validate;
mod writer;

pub use table::{Equation, SymbolTable, Variable};
pub use types::*;
pub use unroll::{eval_subscript, substitute_index, INDEX_VAR};
pub use validate::validate_model;
pub use writer::{statement, write_model};
