//! Property-based tests for the model-definition front end
//!
//! These tests use proptest to check parser invariants over generated
//! documents rather than a handful of hand-written ones.

use modeldef_core::dsl::{ModelReader, ParserConfig, Section};
use modeldef_core::model::{eval_subscript, statement, substitute_index, write_model, SymbolTable, VarKind};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

/// A well-formed model: scalar and array states, an input, outputs computed
/// in `CalcOutputs`, parameters, inline code, and a local that may be
/// reassigned at the top level after the blocks.
fn model_document() -> impl Strategy<Value = String> {
    (
        1usize..4,
        0i64..3,
        1i64..5,
        prop::collection::vec(-1.0e3f64..1.0e3, 1..4),
        0usize..3,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(scalars, lower, len, values, outputs, with_inline, reassign_local)| {
            let upper = lower + len;
            let mut doc = String::new();

            let mut states: Vec<String> = (0..scalars).map(|i| format!("s{}", i)).collect();
            states.push(format!("arr[{}:{}]", lower, upper));
            doc.push_str(&format!("States = {{ {} }};\n", states.join(", ")));
            doc.push_str("Inputs = { u0 };\n");
            if outputs > 0 {
                let names: Vec<String> = (0..outputs).map(|i| format!("y{}", i)).collect();
                doc.push_str(&format!("Outputs = {{ {} }};\n", names.join(", ")));
            }

            for (i, value) in values.iter().enumerate() {
                doc.push_str(&format!("p{} = {:?};\n", i, value));
            }
            doc.push_str("u0 = 1;\n");
            if with_inline {
                doc.push_str("Inline(#define SCALE 2\n  double scratch = 0;);\n");
            }

            doc.push_str("Dynamics {\n  tmp = p0 * 2;\n");
            for i in 0..scalars {
                doc.push_str(&format!("  dt(s{}) = -tmp * s{} + u0;\n", i, i));
            }
            doc.push_str(&format!("  dt(arr[{}:{}]) = p0 * arr[j] - s0;\n", lower, upper));
            doc.push_str("}\n");

            if outputs > 0 {
                doc.push_str("CalcOutputs {\n");
                for i in 0..outputs {
                    doc.push_str(&format!("  y{} = s0 + {};\n", i, i));
                }
                doc.push_str("}\n");
            }
            if reassign_local {
                doc.push_str("tmp = 3;\n");
            }
            doc.push_str("End.\n");
            doc
        })
}

/// Token soup: mostly valid words in arbitrary order.
fn token_soup() -> impl Strategy<Value = String> {
    let vocabulary = prop::sample::select(vec![
        "States", "Inputs", "Outputs", "Compartments", "Dynamics", "Initialize", "Jacobian",
        "CalcOutputs", "Events", "Roots", "dt", "Inline", "SBMLModels", "PKTemplate", "x", "y",
        "z[0:2]", "x[j+1]", "=", "{", "}", "(", ")", "[", "]", ";", ",", ":", "#", "\n", "1.5",
        "42", "@", "-",
    ]);
    prop::collection::vec(vocabulary, 0..40).prop_map(|words| format!("{}\nEnd\n", words.join(" ")))
}

fn block_config() -> ParserConfig {
    ParserConfig::new().with_close_all_sections(true)
}

fn read(config: ParserConfig, document: &str) -> Result<SymbolTable, modeldef_core::ModelError> {
    let mut table = SymbolTable::new();
    ModelReader::with_config(config).read(document, &mut table)?;
    Ok(table)
}

// =============================================================================
// Parser Properties
// =============================================================================

proptest! {
    /// Property: every generated model parses, and each array state gets its
    /// own derivative with `j` resolved
    #[test]
    fn generated_models_parse(doc in model_document()) {
        let table = read(block_config(), &doc).unwrap();
        for state in table.variables_of(VarKind::State) {
            prop_assert!(table.derivative(&state.name).is_some(), "{} in\n{}", state.name, doc);
            if let Some(element) = &state.element {
                let expected = format!("p0 * {} - s0", state.name);
                prop_assert_eq!(table.derivative(&state.name), Some(expected.as_str()));
                prop_assert_eq!(&state.name, &format!("{}_{}", element.base, element.index));
            }
        }
        prop_assert_eq!(table.lookup_kind("tmp"), Some(VarKind::Local));
        prop_assert_eq!(table.lookup_kind("u0"), Some(VarKind::Input));
    }

    /// Property: writing a table and reading it back gives the same names,
    /// kinds and equations
    #[test]
    fn written_models_read_back(doc in model_document()) {
        let table = read(block_config(), &doc).unwrap();
        let text = write_model(&table);
        let reread = read(block_config(), &text).unwrap();

        let names = |t: &SymbolTable| {
            let mut v: Vec<(String, VarKind)> = t.variables().iter().map(|v| (v.name.clone(), v.kind)).collect();
            v.sort();
            v
        };
        let equations = |t: &SymbolTable| {
            let mut v: Vec<(Section, String)> = t.equations().iter().map(|eq| (eq.section, statement(eq))).collect();
            v.sort();
            v
        };
        prop_assert_eq!(names(&table), names(&reread), "{}", text);
        prop_assert_eq!(equations(&table), equations(&reread), "{}", text);
    }

    /// Property: arbitrary token sequences never panic the parser
    #[test]
    fn token_soup_never_panics(doc in token_soup()) {
        let _ = read(ParserConfig::default(), &doc);
        let _ = read(ParserConfig::new().with_close_all_sections(true), &doc);
    }

    /// Property: a document without an `End` line is always rejected
    #[test]
    fn missing_end_is_always_fatal(body in "[a-z =;{}\\n]{0,80}") {
        let result = read(ParserConfig::default(), &body);
        prop_assert!(matches!(result, Err(modeldef_core::ModelError::MissingEnd)));
    }
}

// =============================================================================
// Index Substitution Properties
// =============================================================================

proptest! {
    /// Property: `j + k` evaluates to the shifted index
    #[test]
    fn subscript_offsets(index in 0i64..1000, offset in 0i64..100) {
        prop_assert_eq!(eval_subscript(&format!("j + {}", offset), index).unwrap(), index + offset);
        prop_assert_eq!(eval_subscript(&format!("{} * (j + 1)", offset), index).unwrap(), offset * (index + 1));
    }

    /// Property: text without subscripts is left unchanged
    #[test]
    fn substitution_preserves_plain_text(text in "[a-z0-9_ +*/().-]{0,60}", index in 0i64..50) {
        prop_assert_eq!(substitute_index(&text, index).unwrap(), text);
    }
}
