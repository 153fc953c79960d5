//! Tool registry.
//!
//! Maps tool names to trait objects. The turn loop resolves `TOOL` steps
//! here; an unknown name comes back as [`ToolError::NotFound`], whose
//! display text is fed to the model as an observation rather than ending
//! the turn.

use std::collections::HashMap;
use std::sync::Arc;

use super::traits::Tool;
use crate::error::ToolError;

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its own name, replacing any previous
    /// registration of the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), Arc::from(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered names, sorted for stable prompt and log output.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// `(name, description)` pairs sorted by name, for prompt assembly.
    pub fn catalog(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .tools
            .values()
            .map(|t| (t.name().to_string(), t.description().to_string()))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub async fn execute(&self, name: &str, input: &str) -> Result<String, ToolError> {
        let Some(tool) = self.get(name) else {
            return Err(ToolError::NotFound { name: name.to_string() });
        };
        tool.run(input).await.map_err(|e| ToolError::Execution {
            name: name.to_string(),
            message: format!("{e:#}"),
        })
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// ─────────────────────────────── Tests ───────────────────────────────
