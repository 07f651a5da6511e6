//! Modeldef - model-definition language front end
//!
//! Reads a model document, reports diagnostics and prints the result.
//!
//! # Usage
//!
//! ```bash
//! modeldef model.model                  # summary of the parsed model
//! modeldef model.model --emit table     # every variable and equation
//! modeldef model.model --emit model     # normalized model text
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use modeldef_core::{
    dsl,
    error::Result,
    model::{statement, validate_model, SymbolTable, VarKind},
    ModelReader, ParserConfig, MAX_ARRAY_LEN, MAX_NAME_LEN,
};

/// What to print after a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// Counts of variables by kind and of equations
    Summary,
    /// Every variable and equation
    Table,
    /// The model rewritten as normalized model text
    Model,
}

/// Model-definition language front end
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the model document
    #[arg(value_name = "MODEL_FILE")]
    model_file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Emit::Summary)]
    emit: Emit,

    /// Let `}` close CalcOutputs, Events and Roots as well
    #[arg(long)]
    close_all_sections: bool,

    /// Longest accepted identifier
    #[arg(long, default_value_t = MAX_NAME_LEN)]
    max_name_len: usize,

    /// Most elements one array range may expand to
    #[arg(long, default_value_t = MAX_ARRAY_LEN)]
    max_array_len: usize,

    /// Skip model validation after parsing
    #[arg(long)]
    no_validate: bool,
}

fn main() -> Result<()> {
    // Log to stderr, warnings only unless RUST_LOG says otherwise
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let args = Args::parse();

    let config = ParserConfig::new()
        .with_max_name_len(args.max_name_len)
        .with_max_array_len(args.max_array_len)
        .with_close_all_sections(args.close_all_sections);
    let mut reader = ModelReader::with_config(config);

    // Parse the model file
    let document = dsl::read_file(&args.model_file)?;
    let mut table = SymbolTable::new();
    let mut diagnostics = reader.read(&document, &mut table)?;

    // Validate
    if !args.no_validate {
        diagnostics.extend(validate_model(&table)?);
    }

    for diagnostic in &diagnostics {
        eprintln!("{}: {}", args.model_file.display(), diagnostic);
    }

    match args.emit {
        Emit::Summary => print_summary(&table),
        Emit::Table => print_table(&table),
        Emit::Model => print!("{}", modeldef_core::write_model(&table)),
    }

    Ok(())
}

fn print_summary(table: &SymbolTable) {
    const KINDS: [VarKind; 6] = [
        VarKind::State,
        VarKind::Input,
        VarKind::Output,
        VarKind::Compartment,
        VarKind::Parameter,
        VarKind::Local,
    ];

    for kind in KINDS {
        let count = table.variables_of(kind).count();
        if count > 0 {
            println!("{:<12} {}", kind, count);
        }
    }
    println!("{:<12} {}", "equations", table.equations().len());
}

fn print_table(table: &SymbolTable) {
    for var in table.variables() {
        println!("{:<12} {}", var.kind, var.name);
    }
    for eq in table.equations() {
        println!("{:<12} {}", eq.section, statement(eq));
    }
}
