use std::collections::HashMap;

const MISSING_PARAM: &str = "0.0";

/// Everything a node definition needs to render its fragment.
pub struct EmitContext<'a> {
    pub node_id: &'a str,
    /// Variable this node writes; already declared and initialised from `input_a`.
    pub output: &'a str,
    pub input_a: &'a str,
    pub input_b: Option<&'a str>,
    pub(crate) params: &'a HashMap<String, String>,
}

impl<'a> EmitContext<'a> {
    /// Rendered reference for an input: a literal, a param-array element, or
    /// a bound slot uniform.
    pub fn param(&self, input_id: &str) -> &str {
        match self.params.get(input_id) {
            Some(reference) => reference.as_str(),
            None => {
                log::warn!(
                    "Node '{}' asked for undeclared input '{}'",
                    self.node_id,
                    input_id
                );
                MISSING_PARAM
            }
        }
    }

    /// Second branch for combiners, falling back to input A when unwired.
    pub fn input_b(&self) -> &str {
        match self.input_b {
            Some(var) => var,
            None => {
                log::warn!(
                    "Combiner '{}' has nothing wired to input B; using input A for both",
                    self.node_id
                );
                self.input_a
            }
        }
    }
}
