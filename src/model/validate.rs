//! Model validation.

use super::table::SymbolTable;
use super::types::{EquationKind, VarKind};
use crate::dsl::Section;
use crate::error::{Diagnostic, ModelError, Result};

/// Validate a parsed model before code generation.
///
/// Checks:
/// - Every state has a differential equation
/// - Inputs are only assigned at the top level
/// - Outputs are computed somewhere (warning only)
pub fn validate_model(table: &SymbolTable) -> Result<Vec<Diagnostic>> {
    let mut warnings = Vec::new();

    for state in table.variables_of(VarKind::State) {
        if table.derivative(&state.name).is_none() {
            return Err(ModelError::MissingDerivative {
                state: state.name.clone(),
            });
        }
    }

    for eq in table.equations() {
        if eq.kind != EquationKind::Assignment || matches!(eq.section, Section::Global | Section::TemplateDefined) {
            continue;
        }
        if table.lookup_kind(&eq.target) == Some(VarKind::Input) {
            return Err(ModelError::InvalidAssignment {
                name: eq.target.clone(),
                section: eq.section.to_string(),
            });
        }
    }

    for output in table.variables_of(VarKind::Output) {
        let computed = table.equations().iter().any(|eq| eq.target == output.name);
        if !computed {
            tracing::warn!(output = %output.name, "output is never computed");
            warnings.push(Diagnostic::warning(format!(
                "Output '{}' is never computed",
                output.name
            )));
        }
    }

    Ok(warnings)
}
