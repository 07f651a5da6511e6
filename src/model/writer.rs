//! Re-serialization of a symbol table to model-definition text.
//!
//! The output re-parses to the same set of variables (name and kind) and
//! equations. Documents with `CalcOutputs`, `Events` or `Roots` blocks need
//! [`ParserConfig::close_all_sections`](crate::dsl::ParserConfig) to be read back.

use std::fmt::Write;

use super::table::{Equation, SymbolTable, Variable};
use super::types::{EquationKind, VarKind};
use crate::dsl::{lookup_by_code, KeywordCode, Section};

const DECLARED_KINDS: [VarKind; 4] = [VarKind::State, VarKind::Input, VarKind::Output, VarKind::Compartment];

const BLOCK_ORDER: [Section; 6] = [
    Section::Initialize,
    Section::Dynamics,
    Section::Jacobian,
    Section::CalcOutputs,
    Section::Events,
    Section::Roots,
];

/// Render the whole table as a model document.
pub fn write_model(table: &SymbolTable) -> String {
    let mut out = String::new();

    for kind in DECLARED_KINDS {
        let vars: Vec<&Variable> = table.variables_of(kind).collect();
        if vars.is_empty() {
            continue;
        }
        let keyword = kind.declaration_keyword().unwrap_or_default();
        let _ = writeln!(out, "{} = {{ {} }};", keyword, declaration_list(&vars).join(", "));
    }

    // Statements read after a template was defined are top-level statements too.
    // Top-level statements of a local go after the blocks, so the local is
    // still first defined inside one when read back.
    let (trailing, leading): (Vec<&Equation>, Vec<&Equation>) = table
        .equations()
        .iter()
        .filter(|eq| matches!(eq.section, Section::Global | Section::TemplateDefined))
        .partition(|eq| table.lookup_kind(&eq.target) == Some(VarKind::Local));
    write_statements(&mut out, &leading);

    for section in BLOCK_ORDER {
        let mut body = table.equations_in(section).peekable();
        if body.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "\n{} {{", section.name());
        for eq in body {
            let _ = writeln!(out, "  {}", statement(eq));
        }
        out.push_str("}\n");
    }

    write_statements(&mut out, &trailing);

    let _ = writeln!(out, "\n{}.", lookup_by_code(KeywordCode::End));
    out
}

fn write_statements(out: &mut String, equations: &[&Equation]) {
    if equations.is_empty() {
        return;
    }
    out.push('\n');
    for eq in equations {
        let _ = writeln!(out, "{}", statement(eq));
    }
}

/// Render one equation as a statement.
pub fn statement(eq: &Equation) -> String {
    match eq.kind {
        EquationKind::Assignment => format!("{} = {};", eq.target, eq.text),
        EquationKind::Derivative => format!("{}({}) = {};", lookup_by_code(KeywordCode::Derivative), eq.target, eq.text),
        EquationKind::Inline => format!("{}({});", lookup_by_code(KeywordCode::Inline), eq.text),
    }
}

/// Declaration entries, regrouping runs of consecutive array elements.
fn declaration_list(vars: &[&Variable]) -> Vec<String> {
    let mut entries = Vec::new();
    let mut i = 0;

    while i < vars.len() {
        let Some(first) = vars[i].element.as_ref() else {
            entries.push(vars[i].name.clone());
            i += 1;
            continue;
        };

        let mut end = i + 1;
        while end < vars.len() {
            match vars[end].element.as_ref() {
                Some(el) if el.base == first.base && el.index == first.index + (end - i) as i64 => end += 1,
                _ => break,
            }
        }

        let upper = first.index + (end - i) as i64;
        if end - i == 1 {
            entries.push(format!("{}[{}]", first.base, first.index));
        } else {
            entries.push(format!("{}[{}:{}]", first.base, first.index, upper));
        }
        i = end;
    }

    entries
}
