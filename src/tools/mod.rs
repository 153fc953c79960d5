//! Tools the model can call through `TOOL` steps.

pub mod policy;
pub mod registry;
pub mod shell;
pub mod traits;
pub mod weather;

pub use policy::{ExecDecision, ExecMode, ExecPolicy};
pub use registry::ToolRegistry;
pub use shell::ShellTool;
pub use traits::Tool;
pub use weather::WeatherTool;

use crate::config::Config;

/// Builds the default toolset from configuration.
pub fn all_tools(config: &Config) -> anyhow::Result<Vec<Box<dyn Tool>>> {
    let policy = ExecPolicy {
        mode: config.exec.mode,
        allowed_commands: config.exec.allowed_commands.clone(),
    };
    Ok(vec![
        Box::new(WeatherTool::new(&config.weather_base_url)?),
        Box::new(ShellTool::new(policy)),
    ])
}
