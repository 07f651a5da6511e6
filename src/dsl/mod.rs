//! Parser for model-definition documents.
//!
//! A model document declares the variables of a dynamical system and gives
//! the equations for their derivatives, initial values and outputs. The
//! grammar is keyword driven and context sensitive: which statements are legal
//! depends on the section being parsed.
//!
//! # Grammar Overview
//!
//! ```text
//! document    = { statement } "End" [ any_text ]
//! statement   = declaration | section | derivative | inline | assignment | embedded
//! declaration = decl_kw "=" "{" [ entry { "," entry } ] "}" ";"
//! entry       = identifier [ bounds ]
//! section     = section_kw "{" { statement } "}"
//! derivative  = "dt" "(" identifier [ bounds ] ")" "=" equation ";"
//! inline      = "Inline" "(" raw_text ")" ";"
//! assignment  = identifier [ bounds ] ( "=" equation | <empty, top level only> ) ";"
//! embedded    = ( "SBMLModels" | "PKTemplate" ) "=" "{" foreign_text "}"
//! bounds      = "[" integer [ ":" integer ] "]"
//! comment     = "#" { any_char } newline
//!
//! decl_kw     = "States" | "Inputs" | "Forcings" | "Outputs" | "Compartments"
//! section_kw  = "Dynamics" | "Initialize" | "Scale" | "Jacobian" | "Jacob"
//!             | "CalcOutputs" | "Events" | "Roots"
//! ```
//!
//! # Sections
//!
//! | Section | Opened by | Once only | Closed by `}` |
//! |---------|-----------|-----------|---------------|
//! | Dynamics | `Dynamics {` | yes | yes |
//! | Initialize | `Initialize {` | yes | yes |
//! | Jacobian | `Jacobian {` | yes | yes |
//! | CalcOutputs | `CalcOutputs {` | yes | only with `close_all_sections` |
//! | Events | `Events {` | no | only with `close_all_sections` |
//! | Roots | `Roots {` | no | only with `close_all_sections` |
//!
//! # Arrays
//!
//! `x[2:5]` declares or defines `x_2`, `x_3` and `x_4`. In the equation of an
//! array statement, subscripts are evaluated per element with `j` bound to the
//! element index, so `dt(A[1:3]) = k * A[j-1];` gives `dt(A_1) = k * A_0;` and
//! `dt(A_2) = k * A_1;`.
//!
//! # Example
//!
//! ```text
//! # One-compartment model with first-order elimination
//! States  = { Q_central };
//! Inputs  = { dose_rate };
//!
//! k_elim = 0.1;
//!
//! Dynamics {
//!   dt(Q_central) = dose_rate - k_elim * Q_central;
//! }
//!
//! End.
//! ```

mod embedded;
mod keywords;
mod lexer;
mod parser;
mod section;
mod statements;

pub use embedded::{EmbeddedReader, SkippingReader};
pub use keywords::{lookup_by_code, lookup_by_text, KeywordCode, KeywordEntry, KEYWORDS, NOT_A_KEYWORD};
pub use lexer::{
    element_name, CallArgument, IndexRange, Lexer, SubscriptedName, Token, TokenKind, COMMENT, STATEMENT_END,
};
pub use parser::{has_end_line, ModelReader, ParseState, ParserConfig};
pub use section::{Section, SectionSet};

use crate::error::{Diagnostic, Result};
use crate::model::SymbolTable;

/// Parse a model document into `table` with a fresh reader.
///
/// Returns the recoverable diagnostics, or the first fatal error.
pub fn parse_model(document: &str, table: &mut SymbolTable) -> Result<Vec<Diagnostic>> {
    ModelReader::new().read(document, table)
}

/// Read a model file.
#[cfg(feature = "cli")]
pub fn read_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| crate::error::ModelError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parse a model file into `table`.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path, table: &mut SymbolTable) -> Result<Vec<Diagnostic>> {
    let content = read_file(path)?;
    parse_model(&content, table)
}
