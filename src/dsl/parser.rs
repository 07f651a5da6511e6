//! Document driver and section dispatcher.
//!
//! The driver pulls tokens one at a time and routes identifiers to the
//! dispatcher, which checks them against the keyword table and the current
//! section before handing off to a declaration, section or statement parser.

use super::embedded::{EmbeddedReader, SkippingReader};
use super::keywords::{lookup_by_code, lookup_by_text, KeywordCode};
use super::lexer::{Lexer, Token, TokenKind, COMMENT, STATEMENT_END};
use super::section::{Section, SectionSet};
use crate::error::{Diagnostic, ModelError, Result};
use crate::model::{SymbolTable, VarKind};
use crate::{MAX_ARRAY_LEN, MAX_NAME_LEN};

/// Configuration for the parser.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Longest accepted identifier in a statement.
    pub max_name_len: usize,
    /// Most elements a single array range may expand to.
    pub max_array_len: usize,
    /// Let `}` close `CalcOutputs`, `Events` and `Roots` as well.
    ///
    /// Off by default: only `Dynamics`, `Jacobian` and `Initialize` return to
    /// the top level on `}`, and a `}` in the other blocks is reported and
    /// ignored.
    pub close_all_sections: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_name_len: MAX_NAME_LEN,
            max_array_len: MAX_ARRAY_LEN,
            close_all_sections: false,
        }
    }
}

impl ParserConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum identifier length.
    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }

    /// Set the maximum number of elements in one array range.
    pub fn with_max_array_len(mut self, max_array_len: usize) -> Self {
        self.max_array_len = max_array_len;
        self
    }

    /// Allow `}` to close every block section.
    pub fn with_close_all_sections(mut self, close_all_sections: bool) -> Self {
        self.close_all_sections = close_all_sections;
        self
    }
}

/// Per-document parser state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseState {
    /// Section currently being parsed
    pub section: Section,
    /// One-shot sections opened so far
    opened: SectionSet,
}

impl Default for ParseState {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseState {
    /// Fresh state at the top level with no sections opened.
    pub fn new() -> Self {
        Self {
            section: Section::Global,
            opened: SectionSet::empty(),
        }
    }

    /// Clear the one-shot flags and return to the top level.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Whether a one-shot section has already been opened.
    pub fn is_opened(&self, section: Section) -> bool {
        self.opened.contains(section.as_set())
    }

    fn mark_opened(&mut self, section: Section) {
        self.opened.insert(section.as_set());
    }
}

/// Reads model documents into a symbol table.
///
/// One reader can be reused for successive documents. Each document starts at
/// the top level, but the record of which one-shot sections were opened is
/// kept until [`reset`](Self::reset) is called.
pub struct ModelReader {
    config: ParserConfig,
    state: ParseState,
    embedded: Box<dyn EmbeddedReader>,
}

impl Default for ModelReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelReader {
    /// Create a reader with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            state: ParseState::new(),
            embedded: Box::new(SkippingReader),
        }
    }

    /// Replace the reader used for `SBMLModels` and `PKTemplate` bodies.
    pub fn with_embedded_reader(mut self, reader: impl EmbeddedReader + 'static) -> Self {
        self.embedded = Box::new(reader);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// State left by the last document.
    pub fn state(&self) -> &ParseState {
        &self.state
    }

    /// Forget which sections were opened. Call before every new document.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Parse one document into `table`.
    ///
    /// Returns the recoverable diagnostics on success, or the first fatal
    /// error. A failed parse leaves whatever was already added in `table`.
    #[tracing::instrument(skip_all, fields(len = document.len()))]
    pub fn read(&mut self, document: &str, table: &mut SymbolTable) -> Result<Vec<Diagnostic>> {
        let document = document.strip_prefix(BYTE_ORDER_MARK).unwrap_or(document);
        if !has_end_line(document) {
            return Err(ModelError::MissingEnd);
        }

        self.state.section = Section::Global;
        let mut parser = Parser {
            lexer: Lexer::new(document),
            state: &mut self.state,
            table,
            config: &self.config,
            embedded: self.embedded.as_mut(),
            diagnostics: Vec::new(),
        };
        parser.run()?;

        tracing::debug!(
            variables = parser.table.len(),
            equations = parser.table.equations().len(),
            diagnostics = parser.diagnostics.len(),
            "model read"
        );
        Ok(parser.diagnostics)
    }
}

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Whether some line starts, after leading whitespace, with the `End` keyword.
pub fn has_end_line(document: &str) -> bool {
    let keyword = lookup_by_code(KeywordCode::End);
    document.lines().any(|line| {
        line.trim_start()
            .strip_prefix(keyword)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'))
    })
}

/// Parser over one document.
pub(crate) struct Parser<'a> {
    pub(super) lexer: Lexer<'a>,
    pub(super) state: &'a mut ParseState,
    pub(super) table: &'a mut SymbolTable,
    pub(super) config: &'a ParserConfig,
    embedded: &'a mut dyn EmbeddedReader,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    /// Run the token loop until the document reaches `End`.
    fn run(&mut self) -> Result<()> {
        while self.state.section != Section::End {
            let tok = self.lexer.next_token()?;
            match tok.kind {
                TokenKind::Eof => self.enter(Section::End),
                TokenKind::Identifier => self.process_word(&tok)?,
                TokenKind::Punctuation | TokenKind::EquationPunctuation => self.process_punct(&tok)?,
                TokenKind::Integer | TokenKind::Float => self.report(ModelError::UnexpectedNumber {
                    token: tok.text.clone(),
                    line: tok.line,
                })?,
            }
        }
        Ok(())
    }

    fn process_punct(&mut self, tok: &Token) -> Result<()> {
        if tok.is_punct(STATEMENT_END) {
            return Ok(());
        }

        if tok.is_punct('}') {
            match self.state.section {
                Section::Dynamics | Section::Jacobian | Section::Initialize => {
                    self.enter(Section::Global);
                    return Ok(());
                }
                Section::CalcOutputs | Section::Events | Section::Roots if self.config.close_all_sections => {
                    self.enter(Section::Global);
                    return Ok(());
                }
                Section::CalcOutputs | Section::Events | Section::Roots => {
                    let hint = format!("'}}' does not close the {} section, ignoring", self.state.section);
                    return self.report(ModelError::UnexpectedToken {
                        token: tok.text.clone(),
                        line: tok.line,
                        hint: Some(hint),
                    });
                }
                _ => {}
            }
        }

        if tok.is_punct(COMMENT) {
            self.lexer.skip_comment();
            return Ok(());
        }

        self.report(ModelError::UnexpectedToken {
            token: tok.text.clone(),
            line: tok.line,
            hint: Some("ignoring".to_string()),
        })
    }

    /// Classify one identifier and run the matching handler.
    fn process_word(&mut self, tok: &Token) -> Result<()> {
        let keyword = lookup_by_text(&tok.text);

        if self.state.section == Section::End || !keyword.allowed.allows(self.state.section) {
            return Err(ModelError::BadContext {
                token: tok.text.clone(),
                line: tok.line,
            });
        }

        let outcome = match keyword.code {
            KeywordCode::End => {
                self.enter(Section::End);
                Ok(())
            }
            KeywordCode::States => self.process_declaration(VarKind::State, tok.line),
            KeywordCode::Inputs => self.process_declaration(VarKind::Input, tok.line),
            KeywordCode::Outputs => self.process_declaration(VarKind::Output, tok.line),
            KeywordCode::Compartments => self.process_declaration(VarKind::Compartment, tok.line),
            KeywordCode::Dynamics => self.open_section(Section::Dynamics, tok.line),
            KeywordCode::Initialize => self.open_section(Section::Initialize, tok.line),
            KeywordCode::Jacobian => self.open_section(Section::Jacobian, tok.line),
            KeywordCode::CalcOutputs => self.open_section(Section::CalcOutputs, tok.line),
            KeywordCode::Events => self.open_section(Section::Events, tok.line),
            KeywordCode::Roots => self.open_section(Section::Roots, tok.line),
            KeywordCode::Derivative => self.process_derivative(tok),
            KeywordCode::Inline => self.process_inline(tok),
            KeywordCode::SbmlModels | KeywordCode::PkTemplate => self.process_embedded(keyword.code, tok.line),
            KeywordCode::None => self.process_identifier(tok),
        };

        match outcome {
            Err(err) if !err.is_fatal() => {
                self.record(&err);
                self.lexer.eat_statement();
                Ok(())
            }
            other => other,
        }
    }

    fn process_declaration(&mut self, kind: VarKind, line: usize) -> Result<()> {
        if !self.lexer.eat_punct('=') {
            return Err(ModelError::expected("=", line));
        }
        if !self.lexer.eat_punct('{') {
            return Err(ModelError::expected("{", line));
        }
        self.read_var_list(kind)
    }

    fn open_section(&mut self, section: Section, line: usize) -> Result<()> {
        if section.is_one_shot() && self.state.is_opened(section) {
            return Err(ModelError::DuplicateSection {
                section: section.name().to_string(),
                line,
            });
        }
        if !self.lexer.eat_punct('{') {
            return Err(ModelError::expected_with_hint(
                "{",
                line,
                "section must be delimited by curly braces",
            ));
        }
        if section.is_one_shot() {
            self.state.mark_opened(section);
        }
        self.enter(section);
        Ok(())
    }

    fn process_embedded(&mut self, code: KeywordCode, line: usize) -> Result<()> {
        if !self.lexer.eat_punct('=') {
            return Err(ModelError::expected("=", line));
        }
        if !self.lexer.eat_punct('{') {
            return Err(ModelError::expected("{", line));
        }

        let section = lookup_by_code(code);
        let result = if code == KeywordCode::PkTemplate {
            self.embedded.read_template(&mut self.lexer, self.table)
        } else {
            self.embedded.read_interchange_models(&mut self.lexer, self.table)
        };
        // Reader failures always abort the parse
        result.map_err(|err| {
            if err.is_fatal() {
                err
            } else {
                ModelError::EmbeddedReader {
                    section: section.to_string(),
                    message: err.to_string(),
                }
            }
        })?;

        if code == KeywordCode::PkTemplate {
            self.enter(Section::TemplateDefined);
        }
        Ok(())
    }

    fn enter(&mut self, section: Section) {
        tracing::debug!(from = %self.state.section, to = %section, line = self.lexer.line(), "section");
        self.state.section = section;
    }

    /// Record a recoverable error; fatal ones are returned.
    fn report(&mut self, err: ModelError) -> Result<()> {
        if err.is_fatal() {
            return Err(err);
        }
        self.record(&err);
        Ok(())
    }

    fn record(&mut self, err: &ModelError) {
        tracing::warn!("{}", err);
        self.diagnostics.push(Diagnostic::from(err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;
    use crate::model::EquationKind;

    fn read(input: &str) -> Result<(SymbolTable, Vec<Diagnostic>)> {
        let mut table = SymbolTable::new();
        let diags = ModelReader::new().read(input, &mut table)?;
        Ok((table, diags))
    }

    #[test]
    fn test_has_end_line() {
        assert!(has_end_line("States = { x };\nEnd."));
        assert!(has_end_line("End"));
        assert!(has_end_line("x = 1;\n   \tEnd\n"));
        assert!(!has_end_line("x = 1; End."));
        assert!(!has_end_line("Endless = 1;\n"));
        assert!(!has_end_line("# End\n"));
    }

    #[test]
    fn test_missing_end_reported_first() {
        // The stray '@' would otherwise be the first diagnostic
        assert!(matches!(read("@ States = { x };"), Err(ModelError::MissingEnd)));
    }

    #[test]
    fn test_minimal_model() {
        let input = "\
# One-compartment elimination
States = { Q };
Outputs = { C };
Inputs = { dose };

V = 2.5;
k = 0.1;

Dynamics {
  dt(Q) = dose - k * Q;
}

CalcOutputs {
  C = Q / V;
}

End.
";
        let mut table = SymbolTable::new();
        let mut reader = ModelReader::with_config(ParserConfig::new().with_close_all_sections(true));
        let diags = reader.read(input, &mut table).unwrap();
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(table.lookup_kind("Q"), Some(VarKind::State));
        assert_eq!(table.lookup_kind("V"), Some(VarKind::Parameter));
        assert_eq!(table.derivative("Q"), Some("dose - k * Q"));
        assert_eq!(table.equation("C", Section::CalcOutputs), Some("Q / V"));
        assert_eq!(reader.state().section, Section::End);
    }

    #[test]
    fn test_keyword_in_wrong_context() {
        let err = read("Dynamics {\n States = { x };\n}\nEnd\n").unwrap_err();
        assert!(matches!(err, ModelError::BadContext { ref token, line: 2 } if token == "States"));

        let err = read("dt(x) = 1;\nEnd\n").unwrap_err();
        assert!(matches!(err, ModelError::BadContext { .. }));
    }

    #[test]
    fn test_content_after_end_is_ignored() {
        let (table, diags) = read("x = 1;\nEnd.\n States = { y };").unwrap();
        assert!(diags.is_empty());
        assert!(table.contains("x"));
        assert!(!table.contains("y"));
    }

    #[test]
    fn test_one_shot_sections_reject_reopening() {
        for name in ["Dynamics", "Initialize", "Jacobian", "Scale", "Jacob"] {
            let input = format!("{0} {{ }}\n{0} {{ }}\nEnd\n", name);
            let err = read(&input).unwrap_err();
            assert!(
                matches!(err, ModelError::DuplicateSection { line: 2, .. }),
                "{}: {:?}",
                name,
                err
            );
        }

        let mut reader = ModelReader::with_config(ParserConfig::new().with_close_all_sections(true));
        let mut table = SymbolTable::new();
        let err = reader
            .read("CalcOutputs { }\nCalcOutputs { }\nEnd\n", &mut table)
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateSection { ref section, .. } if section == "CalcOutputs"));
    }

    #[test]
    fn test_events_and_roots_may_repeat() {
        let mut reader = ModelReader::with_config(ParserConfig::new().with_close_all_sections(true));
        let mut table = SymbolTable::new();
        let diags = reader
            .read("Events { }\nEvents { }\nRoots { }\nRoots { }\nEnd\n", &mut table)
            .unwrap();
        assert!(diags.is_empty());
    }

    #[test]
    fn test_section_requires_brace() {
        let err = read("Dynamics\n dt(x) = 1;\nEnd\n").unwrap_err();
        assert!(matches!(err, ModelError::ExpectedToken { ref expected, .. } if expected == "{"));
    }

    #[test]
    fn test_closing_brace_without_return_path() {
        // Default configuration: '}' does not leave CalcOutputs
        let input = "Outputs = { y };\nCalcOutputs {\n y = 1;\n}\nEnd\n";
        let err = read(input).unwrap_err();
        assert!(matches!(err, ModelError::BadContext { ref token, line: 5 } if token == "End"));

        let mut reader = ModelReader::with_config(ParserConfig::new().with_close_all_sections(true));
        let mut table = SymbolTable::new();
        let diags = reader.read(input, &mut table).unwrap();
        assert!(diags.is_empty());
        assert_eq!(table.equation("y", Section::CalcOutputs), Some("1"));
    }

    #[test]
    fn test_stray_tokens_are_recoverable() {
        let (table, diags) = read("x = 1;\n42\n) y = 2;\n}\nEnd\n").unwrap();
        assert_eq!(diags.len(), 3);
        assert!(diags.iter().all(|d| d.severity == Severity::Recoverable));
        assert_eq!(diags[0].line, Some(2));
        assert!(table.contains("x"));
        assert!(table.contains("y"));
    }

    #[test]
    fn test_empty_equation_resynchronises() {
        let (table, diags) = read("a = ;\nb = 2;\nEnd\n").unwrap();
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'a'"));
        assert!(!table.contains("a"));
        assert_eq!(table.equation("b", Section::Global), Some("2"));
    }

    #[test]
    fn test_reset_between_documents() {
        let doc = "States = { x };\nDynamics { dt(x) = -x; }\nEnd\n";
        let mut reader = ModelReader::new();

        let mut first = SymbolTable::new();
        reader.read(doc, &mut first).unwrap();
        assert!(reader.state().is_opened(Section::Dynamics));

        reader.reset();
        let mut second = SymbolTable::new();
        reader.read(doc, &mut second).unwrap();

        let mut third = SymbolTable::new();
        let err = reader.read(doc, &mut third).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateSection { .. }));
    }

    #[test]
    fn test_template_section_restricts_context() {
        let (table, _) = read("PKTemplate = { one compartment { ka } }\nk = 1;\nEnd\n").unwrap();
        let eq = &table.equations()[0];
        assert_eq!(eq.section, Section::TemplateDefined);
        assert_eq!(eq.kind, EquationKind::Assignment);

        let err = read("PKTemplate = { }\nStates = { x };\nEnd\n").unwrap_err();
        assert!(matches!(err, ModelError::BadContext { .. }));

        let (_, diags) = read("PKTemplate = { }\nSBMLModels = { model { } }\nEnd\n").unwrap();
        assert!(diags.is_empty());
    }

    #[test]
    fn test_embedded_section_requires_assignment() {
        let err = read("SBMLModels { }\nEnd\n").unwrap_err();
        assert!(matches!(err, ModelError::ExpectedToken { ref expected, .. } if expected == "="));
    }

    struct CountingReader {
        calls: std::rc::Rc<std::cell::Cell<usize>>,
    }

    impl EmbeddedReader for CountingReader {
        fn read_interchange_models(&mut self, lexer: &mut Lexer<'_>, table: &mut SymbolTable) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            SkippingReader::skip_body(lexer, "SBMLModels")?;
            table.declare_variable("sbml_species", VarKind::State, None)
        }

        fn read_template(&mut self, _lexer: &mut Lexer<'_>, _table: &mut SymbolTable) -> Result<()> {
            Err(ModelError::EmptyEquation {
                name: "template".to_string(),
                line: 0,
            })
        }
    }

    #[test]
    fn test_custom_embedded_reader() {
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut reader = ModelReader::new().with_embedded_reader(CountingReader { calls: calls.clone() });
        let mut table = SymbolTable::new();
        reader.read("SBMLModels = { a { } }\nEnd\n", &mut table).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(table.lookup_kind("sbml_species"), Some(VarKind::State));

        // Recoverable errors from a reader still abort the parse
        reader.reset();
        let err = reader.read("PKTemplate = { }\nEnd\n", &mut table).unwrap_err();
        assert!(matches!(err, ModelError::EmbeddedReader { ref section, .. } if section == "PKTemplate"));
    }

    #[test]
    fn test_leading_byte_order_mark_is_ignored() {
        let (table, diags) = read("\u{feff}k = 1;\nEnd\n").unwrap();
        assert!(diags.is_empty());
        assert_eq!(table.equation("k", Section::Global), Some("1"));

        let (_, diags) = read("\u{feff}End\n").unwrap();
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unknown_character_is_recoverable() {
        let (table, diags) = read("k = 1;\n\u{b5}\nj = 2;\nEnd\n").unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Recoverable);
        assert_eq!(diags[0].line, Some(2));
        assert!(table.contains("k"));
        assert!(table.contains("j"));
    }

    #[test]
    fn test_declaration_kinds_follow_keyword() {
        let (table, _) = read("States = { s };\nForcings = { f };\nOutputs = { o };\nCompartments = { c };\nEnd\n").unwrap();
        assert_eq!(table.lookup_kind("s"), Some(VarKind::State));
        assert_eq!(table.lookup_kind("f"), Some(VarKind::Input));
        assert_eq!(table.lookup_kind("o"), Some(VarKind::Output));
        assert_eq!(table.lookup_kind("c"), Some(VarKind::Compartment));
    }
}
