//! Core types for the symbol table.

use std::fmt;

use crate::dsl::Section;

/// What a symbol-table entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VarKind {
    /// Declared in `States`; may be the target of `dt()`
    State,
    /// Declared in `Inputs` (or `Forcings`)
    Input,
    /// Declared in `Outputs`
    Output,
    /// Declared in `Compartments`
    Compartment,
    /// Undeclared name first defined at the top level
    Parameter,
    /// Undeclared name first defined inside a section block
    Local,
}

impl VarKind {
    /// Declaration keyword for this kind, if it has one.
    pub fn declaration_keyword(&self) -> Option<&'static str> {
        match self {
            Self::State => Some("States"),
            Self::Input => Some("Inputs"),
            Self::Output => Some("Outputs"),
            Self::Compartment => Some("Compartments"),
            Self::Parameter | Self::Local => None,
        }
    }

    /// Kind given to an undeclared name first defined in `section`.
    pub fn implicit_for(section: Section) -> Self {
        match section {
            Section::Global | Section::TemplateDefined => Self::Parameter,
            _ => Self::Local,
        }
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::State => "state",
            Self::Input => "input",
            Self::Output => "output",
            Self::Compartment => "compartment",
            Self::Parameter => "parameter",
            Self::Local => "local",
        };
        f.pad(name)
    }
}

/// Position of an expanded array element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayElement {
    /// Array name without the index suffix
    pub base: String,
    /// Index within the declared range
    pub index: i64,
}

/// How an equation relates to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquationKind {
    /// `name = expr;`
    Assignment,
    /// `dt(name) = expr;`
    Derivative,
    /// `Inline(code);`
    Inline,
}
