//! # Modeldef Core
//!
//! Front end for a model-definition language describing dynamical-system
//! simulations, such as pharmacokinetic or physiological models.
//!
//! This library provides:
//! - A context-sensitive parser for model documents
//! - A symbol table of declared variables and their equations
//! - Array declarations and equations unrolled into scalar elements
//! - A writer that renders a symbol table back to model text
//! - Validation of the parsed model before code generation
//!
//! ## Architecture
//!
//! - [`dsl`] - Lexer, keyword table, section state machine and statement parsers
//! - [`model`] - Symbol table, index substitution, writer and validation
//! - [`error`] - Error type, severities and diagnostics
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! modeldef model.model --emit table
//! RUST_LOG=modeldef_core=debug modeldef model.model --emit model
//! ```
//!
//! ### Library
//!
//! ```
//! use modeldef_core::{dsl, model::SymbolTable};
//!
//! let mut table = SymbolTable::new();
//! let diagnostics = dsl::parse_model(
//!     "States = { Q };\nk = 0.1;\nDynamics { dt(Q) = -k * Q; }\nEnd.\n",
//!     &mut table,
//! )
//! .unwrap();
//!
//! assert!(diagnostics.is_empty());
//! assert_eq!(table.derivative("Q"), Some("-k * Q"));
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmModel } from 'modeldef_core';
//!
//! const model = new WasmModel(modelText);
//! console.log(model.to_model_text());
//! ```

pub mod dsl;
pub mod error;
pub mod model;

// Re-export main types for convenience
pub use dsl::{parse_model, ModelReader, ParserConfig};
pub use error::{Diagnostic, ModelError, Result, Severity};
pub use model::{validate_model, write_model, SymbolTable};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmModel;

/// Longest identifier accepted in a statement.
pub const MAX_NAME_LEN: usize = 80;

/// Most elements one array range may expand to.
pub const MAX_ARRAY_LEN: usize = 100_000;
