//! Symbol table populated by the parser.

use std::collections::HashMap;

use super::types::{ArrayElement, EquationKind, VarKind};
use crate::dsl::Section;
use crate::error::{ModelError, Result};

/// A named model variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub kind: VarKind,
    /// Set when the name came from expanding an array
    pub element: Option<ArrayElement>,
}

/// An equation attached to a variable, in statement order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    /// Defined variable (the `Inline` keyword for inline code)
    pub target: String,
    /// Section the statement appeared in
    pub section: Section,
    pub kind: EquationKind,
    /// Right-hand side with array subscripts already resolved
    pub text: String,
}

/// Key of a replaceable equation: target, section and kind.
type EquationKey = (String, Section, EquationKind);

/// All variables and equations of one model.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    variables: Vec<Variable>,
    by_name: HashMap<String, usize>,
    equations: Vec<Equation>,
    /// Inline equations are not indexed
    by_key: HashMap<EquationKey, usize>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every variable and equation.
    pub fn clear(&mut self) {
        self.variables.clear();
        self.by_name.clear();
        self.equations.clear();
        self.by_key.clear();
    }

    /// Register a declared variable. Declaring a name twice is an error.
    pub fn declare_variable(&mut self, name: &str, kind: VarKind, element: Option<ArrayElement>) -> Result<()> {
        if self.by_name.contains_key(name) {
            return Err(ModelError::Redeclared { name: name.to_string() });
        }
        tracing::trace!(name, %kind, "declare");
        self.insert(Variable {
            name: name.to_string(),
            kind,
            element,
        });
        Ok(())
    }

    /// Create or update the equation of `name` for this section and kind.
    ///
    /// Unknown names are created with the implicit kind for `section`.
    /// Inline equations are always appended.
    pub fn define_variable(
        &mut self,
        name: &str,
        text: impl Into<String>,
        section: Section,
        kind: EquationKind,
        element: Option<ArrayElement>,
    ) {
        let text = text.into();
        tracing::trace!(name, %section, ?kind, text = %text, "define");

        if kind != EquationKind::Inline && !self.by_name.contains_key(name) {
            self.insert(Variable {
                name: name.to_string(),
                kind: VarKind::implicit_for(section),
                element,
            });
        }

        if kind != EquationKind::Inline {
            let key = (name.to_string(), section, kind);
            if let Some(&idx) = self.by_key.get(&key) {
                self.equations[idx].text = text;
                return;
            }
            self.by_key.insert(key, self.equations.len());
        }

        self.equations.push(Equation {
            target: name.to_string(),
            section,
            kind,
            text,
        });
    }

    /// Kind of a variable, if it exists.
    pub fn lookup_kind(&self, name: &str) -> Option<VarKind> {
        self.get(name).map(|var| var.kind)
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.by_name.get(name).map(|&idx| &self.variables[idx])
    }

    /// Whether a variable exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Assignment equation of `name` in `section`.
    pub fn equation(&self, name: &str, section: Section) -> Option<&str> {
        self.by_key
            .get(&(name.to_string(), section, EquationKind::Assignment))
            .map(|&idx| self.equations[idx].text.as_str())
    }

    /// Differential equation of a state.
    pub fn derivative(&self, name: &str) -> Option<&str> {
        // `dt` is only legal in these two sections
        [Section::Dynamics, Section::InputDef]
            .into_iter()
            .filter_map(|section| self.by_key.get(&(name.to_string(), section, EquationKind::Derivative)))
            .min()
            .map(|&idx| self.equations[idx].text.as_str())
    }

    /// Variables in insertion order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Equations in statement order.
    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    /// Equations that appeared in `section`, in statement order.
    pub fn equations_in(&self, section: Section) -> impl Iterator<Item = &Equation> {
        self.equations.iter().filter(move |eq| eq.section == section)
    }

    /// Variables of one kind, in insertion order.
    pub fn variables_of(&self, kind: VarKind) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(move |var| var.kind == kind)
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the table has no variables.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    fn insert(&mut self, var: Variable) {
        self.by_name.insert(var.name.clone(), self.variables.len());
        self.variables.push(var);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut table = SymbolTable::new();
        table.declare_variable("Q_gut", VarKind::State, None).unwrap();
        assert_eq!(table.lookup_kind("Q_gut"), Some(VarKind::State));
        assert_eq!(table.lookup_kind("Q_liver"), None);
        assert!(matches!(
            table.declare_variable("Q_gut", VarKind::Output, None),
            Err(ModelError::Redeclared { .. })
        ));
    }

    #[test]
    fn test_define_creates_implicit_kinds() {
        let mut table = SymbolTable::new();
        table.define_variable("k", "0.5", Section::Global, EquationKind::Assignment, None);
        table.define_variable("tmp", "k * 2", Section::Dynamics, EquationKind::Assignment, None);
        assert_eq!(table.lookup_kind("k"), Some(VarKind::Parameter));
        assert_eq!(table.lookup_kind("tmp"), Some(VarKind::Local));
    }

    #[test]
    fn test_define_updates_in_place() {
        let mut table = SymbolTable::new();
        table.declare_variable("x", VarKind::State, None).unwrap();
        table.define_variable("x", "1", Section::Global, EquationKind::Assignment, None);
        table.define_variable("x", "-x", Section::Dynamics, EquationKind::Derivative, None);
        table.define_variable("x", "2", Section::Global, EquationKind::Assignment, None);

        assert_eq!(table.equations().len(), 2);
        assert_eq!(table.equation("x", Section::Global), Some("2"));
        assert_eq!(table.derivative("x"), Some("-x"));
        assert_eq!(table.lookup_kind("x"), Some(VarKind::State));
    }

    #[test]
    fn test_inline_always_appends() {
        let mut table = SymbolTable::new();
        table.define_variable("Inline", "a = 1", Section::Dynamics, EquationKind::Inline, None);
        table.define_variable("Inline", "b = 2", Section::Dynamics, EquationKind::Inline, None);
        assert_eq!(table.equations().len(), 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_large_array_defines_stay_indexed() {
        let mut table = SymbolTable::new();
        for i in 0..20_000 {
            table.define_variable(&format!("V_{}", i), "1", Section::Global, EquationKind::Assignment, None);
        }
        for i in 0..20_000 {
            table.define_variable(&format!("V_{}", i), "2", Section::Global, EquationKind::Assignment, None);
        }
        assert_eq!(table.equations().len(), 20_000);
        assert_eq!(table.equation("V_19999", Section::Global), Some("2"));
        assert_eq!(table.equation("V_19999", Section::Dynamics), None);
    }

    #[test]
    fn test_clear() {
        let mut table = SymbolTable::new();
        table.declare_variable("x", VarKind::Input, None).unwrap();
        table.define_variable("k", "1", Section::Global, EquationKind::Assignment, None);
        table.clear();
        assert!(table.is_empty());
        assert!(table.equations().is_empty());
        assert_eq!(table.equation("k", Section::Global), None);
        table.declare_variable("x", VarKind::Input, None).unwrap();
    }
}
