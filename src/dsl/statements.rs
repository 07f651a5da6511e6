//! Declaration lists and statement parsers.
//!
//! All parsers here start right after the word that selected them and leave
//! the lexer after the statement terminator. Errors are returned to the
//! dispatcher, which decides between aborting and resynchronising.

use super::lexer::{element_name, CallArgument, IndexRange, Token, TokenKind, COMMENT, STATEMENT_END};
use super::parser::Parser;
use super::section::Section;
use crate::error::{ModelError, Result};
use crate::model::{substitute_index, ArrayElement, EquationKind, VarKind};

impl<'a> Parser<'a> {
    /// Read `a, b[0:3], c }` after the opening brace of a declaration.
    pub(super) fn read_var_list(&mut self, kind: VarKind) -> Result<()> {
        loop {
            let tok = self.lexer.next_token()?;
            match tok.kind {
                TokenKind::Identifier => {
                    if self.lexer.eat_punct('[') {
                        let range = self.read_bounds()?;
                        for index in range.iter() {
                            let element = ArrayElement {
                                base: tok.text.clone(),
                                index,
                            };
                            self.table
                                .declare_variable(&element_name(&tok.text, index), kind, Some(element))?;
                        }
                    } else {
                        self.table.declare_variable(&tok.text, kind, None)?;
                    }
                }
                _ if tok.is_punct(',') => {}
                _ if tok.is_punct('}') => return Ok(()),
                _ if tok.is_punct(COMMENT) => self.lexer.skip_comment(),
                _ => {
                    return Err(ModelError::expected_with_hint(
                        "}",
                        tok.line,
                        "list must be comma-delimited and end with '}'",
                    ));
                }
            }
        }
    }

    /// `dt(x) = expr;` or `dt(x[lb:ub]) = expr;`
    pub(super) fn process_derivative(&mut self, tok: &Token) -> Result<()> {
        let line = tok.line;
        let target = match self.lexer.read_function_arg()? {
            CallArgument::Name(target) => target,
            CallArgument::Malformed(text) => return Err(ModelError::BadState { name: text, line }),
        };

        if !self.lexer.eat_punct('=') {
            return Err(ModelError::expected("=", line));
        }

        let section = self.state.section;
        match target.range {
            None => {
                if self.table.lookup_kind(&target.name) != Some(VarKind::State) {
                    return Err(ModelError::BadState {
                        name: target.name,
                        line,
                    });
                }
                let text = self.read_equation(&target.name, line)?;
                let equation = substitute_index(&text, 0)?;
                self.table
                    .define_variable(&target.name, equation, section, EquationKind::Derivative, None);
            }
            Some(range) => {
                self.check_array_len(range)?;
                let text = self.read_equation(&target.name, line)?;
                for index in range.iter() {
                    let name = element_name(&target.name, index);
                    if self.table.lookup_kind(&name) != Some(VarKind::State) {
                        return Err(ModelError::BadState {
                            name: format!("{}[{}]", target.name, index),
                            line,
                        });
                    }
                    let equation = substitute_index(&text, index)?;
                    self.table
                        .define_variable(&name, equation, section, EquationKind::Derivative, None);
                }
            }
        }

        self.expect_terminator(line)
    }

    /// Plain assignment, array assignment, or implicit-zero declaration.
    pub(super) fn process_identifier(&mut self, tok: &Token) -> Result<()> {
        let name = tok.text.as_str();
        let line = tok.line;

        if name.len() > self.config.max_name_len {
            return Err(ModelError::NameTooLong {
                name: name.to_string(),
                line,
                max: self.config.max_name_len,
            });
        }

        if !self.lexer.eat_punct('[') {
            return match self.lexer.peek_punct() {
                Some('=') => {
                    self.lexer.eat_punct('=');
                    let text = self.read_equation(name, line)?;
                    let equation = substitute_index(&text, 0)?;
                    self.define(name, equation, None);
                    self.expect_terminator(line)
                }
                Some(STATEMENT_END) => {
                    self.lexer.eat_punct(STATEMENT_END);
                    if self.state.section != Section::Global {
                        return Err(ModelError::expected("= or [", line));
                    }
                    self.define(name, "0".to_string(), None);
                    Ok(())
                }
                _ => Err(ModelError::expected("=, [ or ;", line)),
            };
        }

        let range = self.read_bounds()?;
        match self.lexer.peek_punct() {
            Some('=') => {
                self.lexer.eat_punct('=');
                let text = self.read_equation(name, line)?;
                for index in range.iter() {
                    let equation = substitute_index(&text, index)?;
                    self.define_element(name, index, equation);
                }
                self.expect_terminator(line)
            }
            Some(STATEMENT_END) => {
                self.lexer.eat_punct(STATEMENT_END);
                if self.state.section != Section::Global {
                    return Err(ModelError::expected("= or [", line));
                }
                self.define_zeroed(name, range);
                Ok(())
            }
            _ => Err(ModelError::expected("= or ;", line)),
        }
    }

    /// `Inline(code);` keeps the code verbatim, comments and line breaks
    /// included, without index substitution.
    pub(super) fn process_inline(&mut self, tok: &Token) -> Result<()> {
        let line = tok.line;
        if self.lexer.peek_punct() != Some('(') {
            return Err(ModelError::expected_with_hint("(", line, "inline code must be parenthesized"));
        }
        let (open_line, open_column) = self.lexer.position();
        self.lexer.eat_punct('(');
        let code = self.lexer.read_parenthesized(open_line, open_column)?;

        let section = self.state.section;
        self.table
            .define_variable(&tok.text, code, section, EquationKind::Inline, None);
        self.expect_terminator(line)
    }

    /// Array bounds after `[`, limited to the configured array length.
    fn read_bounds(&mut self) -> Result<IndexRange> {
        let range = self.lexer.read_array_bounds()?;
        self.check_array_len(range)?;
        Ok(range)
    }

    fn check_array_len(&self, range: IndexRange) -> Result<()> {
        if range.len() > self.config.max_array_len {
            return Err(ModelError::bad_bounds(
                self.lexer.line(),
                format!(
                    "{} elements exceed the limit of {}",
                    range.len(),
                    self.config.max_array_len
                ),
            ));
        }
        Ok(())
    }

    fn read_equation(&mut self, name: &str, line: usize) -> Result<String> {
        let text = self.lexer.read_statement_text();
        if text.is_empty() {
            return Err(ModelError::EmptyEquation {
                name: name.to_string(),
                line,
            });
        }
        Ok(text)
    }

    fn expect_terminator(&mut self, line: usize) -> Result<()> {
        if self.lexer.eat_punct(STATEMENT_END) {
            Ok(())
        } else {
            Err(ModelError::expected(";", line))
        }
    }

    fn define(&mut self, name: &str, equation: String, element: Option<ArrayElement>) {
        let section = self.state.section;
        self.table
            .define_variable(name, equation, section, EquationKind::Assignment, element);
    }

    fn define_element(&mut self, base: &str, index: i64, equation: String) {
        let element = ArrayElement {
            base: base.to_string(),
            index,
        };
        self.define(&element_name(base, index), equation, Some(element));
    }

    fn define_zeroed(&mut self, base: &str, range: IndexRange) {
        for index in range.iter() {
            self.define_element(base, index, "0".to_string());
        }
    }
}
