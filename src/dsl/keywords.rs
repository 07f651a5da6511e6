//! Reserved words of the model-definition language.

use super::section::SectionSet;

/// Code identifying what a keyword does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCode {
    /// Not a keyword; a user-defined name
    None,
    States,
    Inputs,
    Outputs,
    Compartments,
    Dynamics,
    Initialize,
    Jacobian,
    Events,
    Roots,
    CalcOutputs,
    /// `dt(x) = ...;`
    Derivative,
    Inline,
    SbmlModels,
    PkTemplate,
    End,
}

/// One row of the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordEntry {
    pub text: &'static str,
    pub code: KeywordCode,
    pub allowed: SectionSet,
}

const fn entry(text: &'static str, code: KeywordCode, allowed: SectionSet) -> KeywordEntry {
    KeywordEntry { text, code, allowed }
}

/// Result of a failed lookup; plain identifiers are legal everywhere.
pub const NOT_A_KEYWORD: KeywordEntry = entry("", KeywordCode::None, SectionSet::ALL);

/// The keyword table. Canonical spellings come before their synonyms.
pub static KEYWORDS: &[KeywordEntry] = &[
    entry("States", KeywordCode::States, SectionSet::GLOBAL),
    entry("Inputs", KeywordCode::Inputs, SectionSet::GLOBAL),
    entry("Forcings", KeywordCode::Inputs, SectionSet::GLOBAL),
    entry("Outputs", KeywordCode::Outputs, SectionSet::GLOBAL),
    entry("Compartments", KeywordCode::Compartments, SectionSet::GLOBAL),
    entry("Dynamics", KeywordCode::Dynamics, SectionSet::GLOBAL),
    entry("Initialize", KeywordCode::Initialize, SectionSet::GLOBAL),
    entry("Scale", KeywordCode::Initialize, SectionSet::GLOBAL),
    entry("Jacobian", KeywordCode::Jacobian, SectionSet::GLOBAL),
    entry("Jacob", KeywordCode::Jacobian, SectionSet::GLOBAL),
    entry("Events", KeywordCode::Events, SectionSet::GLOBAL),
    entry("Roots", KeywordCode::Roots, SectionSet::GLOBAL),
    entry("CalcOutputs", KeywordCode::CalcOutputs, SectionSet::GLOBAL),
    // Left-hand side only in Dynamics
    entry(
        "dt",
        KeywordCode::Derivative,
        SectionSet::DYNAMICS.union(SectionSet::INPUT_DEF),
    ),
    entry("Inline", KeywordCode::Inline, SectionSet::ALL),
    entry(
        "SBMLModels",
        KeywordCode::SbmlModels,
        SectionSet::GLOBAL.union(SectionSet::TEMPLATE_DEFINED),
    ),
    entry("PKTemplate", KeywordCode::PkTemplate, SectionSet::GLOBAL),
    entry(
        "End",
        KeywordCode::End,
        SectionSet::GLOBAL.union(SectionSet::TEMPLATE_DEFINED),
    ),
];

/// Look up a word. Returns [`NOT_A_KEYWORD`] for user-defined names.
pub fn lookup_by_text(text: &str) -> KeywordEntry {
    KEYWORDS
        .iter()
        .find(|kw| kw.text == text)
        .copied()
        .unwrap_or(NOT_A_KEYWORD)
}

/// Canonical spelling of a keyword code, or `""` if there is none.
pub fn lookup_by_code(code: KeywordCode) -> &'static str {
    KEYWORDS
        .iter()
        .find(|kw| kw.code == code)
        .map(|kw| kw.text)
        .unwrap_or("")
}
