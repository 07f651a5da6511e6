//! WASM bindings for Modeldef Core.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmModel } from 'modeldef_core';
//!
//! await init();
//!
//! const model = new WasmModel(`
//!   States = { Q };
//!   Dynamics { dt(Q) = -0.1 * Q; }
//!   End.
//! `);
//!
//! console.log(model.variable_count, model.diagnostics());
//! editor.setValue(model.to_model_text());
//! ```

use wasm_bindgen::prelude::*;

use crate::dsl::{ModelReader, ParserConfig};
use crate::error::ModelError;
use crate::model::{validate_model, write_model, SymbolTable};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(err: ModelError) -> JsValue {
    let err = ModelError::WasmError {
        message: err.to_string(),
    };
    JsValue::from_str(&err.to_string())
}

/// A parsed and validated model.
#[wasm_bindgen]
pub struct WasmModel {
    table: SymbolTable,
    diagnostics: Vec<String>,
}

#[wasm_bindgen]
impl WasmModel {
    /// Parse model text with the default configuration.
    ///
    /// Throws on the first fatal error.
    #[wasm_bindgen(constructor)]
    pub fn new(text: &str) -> Result<WasmModel, JsValue> {
        Self::with_config(text, false)
    }

    /// Parse model text, optionally letting `}` close every block section.
    #[wasm_bindgen]
    pub fn with_config(text: &str, close_all_sections: bool) -> Result<WasmModel, JsValue> {
        let config = ParserConfig::new().with_close_all_sections(close_all_sections);
        let mut table = SymbolTable::new();
        let mut diagnostics = ModelReader::with_config(config)
            .read(text, &mut table)
            .map_err(to_js)?;
        diagnostics.extend(validate_model(&table).map_err(to_js)?);

        Ok(WasmModel {
            table,
            diagnostics: diagnostics.iter().map(ToString::to_string).collect(),
        })
    }

    /// Number of variables in the symbol table.
    #[wasm_bindgen(getter)]
    pub fn variable_count(&self) -> usize {
        self.table.len()
    }

    /// Number of equations in the symbol table.
    #[wasm_bindgen(getter)]
    pub fn equation_count(&self) -> usize {
        self.table.equations().len()
    }

    /// Recoverable problems found while parsing and validating.
    #[wasm_bindgen]
    pub fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.clone()
    }

    /// Kind of a variable, or `undefined` if it is not in the table.
    #[wasm_bindgen]
    pub fn variable_kind(&self, name: &str) -> Option<String> {
        self.table.lookup_kind(name).map(|kind| kind.to_string())
    }

    /// The model rendered back to normalized model text.
    #[wasm_bindgen]
    pub fn to_model_text(&self) -> String {
        write_model(&self.table)
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
