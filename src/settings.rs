use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(TS, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[ts(export, export_to = "settings.ts")]
pub enum CompileMode {
    /// Every structural edit requests a recompile of the settled topology.
    #[default]
    Auto,
    /// Edits accumulate until the editor explicitly triggers a compile.
    Manual,
}

#[derive(TS, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
#[ts(export, export_to = "settings.ts")]
#[ts(rename_all = "camelCase")]
pub struct CompilerSettings {
    pub compile_mode: CompileMode,
    pub state_var: String,
    pub iteration_var: String,
    pub param_array: String,
    pub slot_uniform_prefix: String,
    pub inline_literals: bool,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            compile_mode: CompileMode::Auto,
            state_var: "z".to_string(),
            iteration_var: "i".to_string(),
            param_array: "uNodeParams".to_string(),
            slot_uniform_prefix: "uParam".to_string(),
            inline_literals: false,
        }
    }
}

impl CompilerSettings {
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid compiler settings: {}", e))
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize compiler settings: {}", e))
    }
}
