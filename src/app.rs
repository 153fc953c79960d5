//! Command dispatch.
//!
//! Wires configuration, provider, tools and session together, then hands
//! control to the chosen subcommand. A bare `stepchain` starts the
//! interactive chat.

use std::sync::Arc;

use tracing::info;

use crate::agent::prompt::system_prompt;
use crate::agent::{ConsoleObserver, Session, TurnRunner};
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::error::Result;
use crate::providers::OpenAiProvider;
use crate::tools::{ToolRegistry, all_tools};
use crate::ui::style;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Some(Commands::Status) => {
            println!("{}", render_status(&config));
            Ok(())
        }
        Some(Commands::Chat { message, model, temperature }) => {
            run_chat(config, message, model, temperature).await
        }
        None => run_chat(config, None, None, None).await,
    }
}

async fn run_chat(
    config: Config,
    message: Option<String>,
    model_override: Option<String>,
    temperature_override: Option<f64>,
) -> Result<()> {
    // Checked before anything network-facing is built; a missing key
    // exits here with a pointer at the config file.
    let api_key = config.require_api_key()?.to_string();
    let model = model_override.unwrap_or_else(|| config.model.clone());
    let temperature = temperature_override.unwrap_or(config.temperature);

    let provider = OpenAiProvider::new(&api_key, &config.base_url);

    let mut registry = ToolRegistry::new();
    for tool in all_tools(&config)? {
        registry.register(tool);
    }
    let registry = Arc::new(registry);

    let prompt = system_prompt(&registry.catalog());
    let runner = TurnRunner::new(
        Arc::clone(&registry),
        config.max_steps,
        model.clone(),
        temperature,
    );
    let mut session = Session::new(
        Box::new(provider),
        runner,
        prompt,
        config.max_history_messages,
    );

    info!(model = %model, temperature, tools = registry.len(), "agent ready");

    if let Some(message) = message {
        let outcome = session.run_once(&message, &ConsoleObserver).await?;
        if outcome.final_text.is_none() {
            return Err(anyhow::anyhow!(
                "turn ended without a final answer ({:?})",
                outcome.stop_reason
            )
            .into());
        }
        Ok(())
    } else {
        session.run_interactive().await?;
        Ok(())
    }
}

pub fn render_status(config: &Config) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(out, "{}", style::header("stepchain status"));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {} {}",
        style::accent("model:"),
        style::value(&config.model)
    );
    let _ = writeln!(
        out,
        "  {} {}",
        style::accent("base url:"),
        style::value(&config.base_url)
    );
    let _ = writeln!(
        out,
        "  {} {}",
        style::accent("temperature:"),
        style::value(&config.temperature.to_string())
    );
    let _ = writeln!(
        out,
        "  {} {}",
        style::accent("max steps:"),
        style::value(&config.max_steps.to_string())
    );
    let window = if config.max_history_messages == 0 {
        "unbounded".to_string()
    } else {
        format!("{} messages", config.max_history_messages)
    };
    let _ = writeln!(out, "  {} {}", style::accent("history window:"), style::value(&window));
    let _ = writeln!(
        out,
        "  {} {}",
        style::accent("exec mode:"),
        style::value(&config.exec.mode.to_string())
    );
    let allowlist = if config.exec.allowed_commands.is_empty() {
        "any command".to_string()
    } else {
        format!("{} commands", config.exec.allowed_commands.len())
    };
    let _ = writeln!(out, "  {} {}", style::accent("allowlist:"), style::value(&allowlist));
    let _ = writeln!(
        out,
        "  {} {}",
        style::accent("weather endpoint:"),
        style::value(&config.weather_base_url)
    );
    let api_key = if config.require_api_key().is_ok() { "set" } else { "not set" };
    let _ = writeln!(out, "  {} {}", style::accent("api key:"), style::value(api_key));
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", style::dim(&config.config_path.display().to_string()));
    out
}
