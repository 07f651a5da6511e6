//! Document sections and sets of sections.
//!
//! A [`Section`] is the single region the parser is currently in. A
//! [`SectionSet`] is the set of regions a keyword may appear in. The two are
//! only ever connected through [`SectionSet::allows`].

use std::fmt;

use bitflags::bitflags;

/// The region of the document currently being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    /// Top level: declarations, parameters and initial values
    Global,
    /// `Dynamics { ... }`
    Dynamics,
    /// `Jacobian { ... }`
    Jacobian,
    /// `Initialize { ... }` (also spelled `Scale`)
    Initialize,
    /// `CalcOutputs { ... }`
    CalcOutputs,
    /// `Events { ... }`
    Events,
    /// `Roots { ... }`
    Roots,
    /// Inside an input definition
    InputDef,
    /// After a pharmacokinetic template has been read
    TemplateDefined,
    /// Terminal; nothing further is legal
    End,
}

impl Section {
    /// Sections that may be opened at most once per document.
    pub const ONE_SHOT: [Section; 4] = [
        Section::Dynamics,
        Section::Initialize,
        Section::Jacobian,
        Section::CalcOutputs,
    ];

    /// The singleton set holding this section.
    pub fn as_set(self) -> SectionSet {
        match self {
            Section::Global => SectionSet::GLOBAL,
            Section::Dynamics => SectionSet::DYNAMICS,
            Section::Jacobian => SectionSet::JACOBIAN,
            Section::Initialize => SectionSet::INITIALIZE,
            Section::CalcOutputs => SectionSet::CALC_OUTPUTS,
            Section::Events => SectionSet::EVENTS,
            Section::Roots => SectionSet::ROOTS,
            Section::InputDef => SectionSet::INPUT_DEF,
            Section::TemplateDefined => SectionSet::TEMPLATE_DEFINED,
            Section::End => SectionSet::END,
        }
    }

    /// Whether this section may only be opened once per document.
    pub fn is_one_shot(self) -> bool {
        Self::ONE_SHOT.contains(&self)
    }

    /// Name as written in a model document.
    pub fn name(self) -> &'static str {
        match self {
            Section::Global => "Global",
            Section::Dynamics => "Dynamics",
            Section::Jacobian => "Jacobian",
            Section::Initialize => "Initialize",
            Section::CalcOutputs => "CalcOutputs",
            Section::Events => "Events",
            Section::Roots => "Roots",
            Section::InputDef => "InputDef",
            Section::TemplateDefined => "TemplateDefined",
            Section::End => "End",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

bitflags! {
    /// A set of sections, used for "where may this keyword appear".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SectionSet: u16 {
        const GLOBAL = 1 << 0;
        const DYNAMICS = 1 << 1;
        const JACOBIAN = 1 << 2;
        const INITIALIZE = 1 << 3;
        const CALC_OUTPUTS = 1 << 4;
        const EVENTS = 1 << 5;
        const ROOTS = 1 << 6;
        const END = 1 << 7;
        /// Valid inside an input definition
        const INPUT_DEF = 1 << 8;
        /// Valid only once a template section exists
        const TEMPLATE_DEFINED = 1 << 9;

        /// Valid everywhere
        const ALL = Self::GLOBAL.bits()
            | Self::DYNAMICS.bits()
            | Self::JACOBIAN.bits()
            | Self::INITIALIZE.bits()
            | Self::CALC_OUTPUTS.bits()
            | Self::EVENTS.bits()
            | Self::ROOTS.bits()
            | Self::END.bits()
            | Self::INPUT_DEF.bits()
            | Self::TEMPLATE_DEFINED.bits();
    }
}

impl SectionSet {
    /// Membership test between a set and the current section.
    pub fn allows(self, section: Section) -> bool {
        self.intersects(section.as_set())
    }
}
