//! Hand-off points for the two embedded sub-languages.
//!
//! `SBMLModels = { ... }` and `PKTemplate = { ... }` bodies are written in
//! their own grammars. The parser only gates entry: once `= {` has been read it
//! passes the lexer to an [`EmbeddedReader`], which must consume everything up
//! to and including the section's closing brace.

use super::lexer::{Lexer, COMMENT};
use super::TokenKind;
use crate::error::{ModelError, Result};
use crate::model::SymbolTable;

/// Reader for the bodies of embedded-format sections.
pub trait EmbeddedReader {
    /// Read an `SBMLModels` body (model-interchange format).
    fn read_interchange_models(&mut self, lexer: &mut Lexer<'_>, table: &mut SymbolTable) -> Result<()>;

    /// Read a `PKTemplate` body (pharmacokinetic template shorthand).
    fn read_template(&mut self, lexer: &mut Lexer<'_>, table: &mut SymbolTable) -> Result<()>;
}

/// Default reader: skips each body without interpreting it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkippingReader;

impl SkippingReader {
    /// Consume a brace-balanced body whose opening `{` was already read.
    /// Returns the number of tokens skipped.
    pub fn skip_body(lexer: &mut Lexer<'_>, section: &str) -> Result<usize> {
        let mut depth = 1usize;
        let mut skipped = 0usize;

        loop {
            let tok = lexer.next_token()?;
            match tok.kind {
                TokenKind::Eof => {
                    return Err(ModelError::expected_with_hint(
                        "}",
                        tok.line,
                        format!("{} section is not closed", section),
                    ));
                }
                _ if tok.is_punct(COMMENT) => {
                    lexer.skip_comment();
                    continue;
                }
                _ if tok.is_punct('{') => depth += 1,
                _ if tok.is_punct('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(skipped);
                    }
                }
                _ => {}
            }
            skipped += 1;
        }
    }
}

impl EmbeddedReader for SkippingReader {
    fn read_interchange_models(&mut self, lexer: &mut Lexer<'_>, _table: &mut SymbolTable) -> Result<()> {
        let skipped = Self::skip_body(lexer, "SBMLModels")?;
        tracing::warn!(tokens = skipped, "SBMLModels section skipped; no interchange reader configured");
        Ok(())
    }

    fn read_template(&mut self, lexer: &mut Lexer<'_>, _table: &mut SymbolTable) -> Result<()> {
        let skipped = Self::skip_body(lexer, "PKTemplate")?;
        tracing::warn!(tokens = skipped, "PKTemplate section skipped; no template reader configured");
        Ok(())
    }
}
