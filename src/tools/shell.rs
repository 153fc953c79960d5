//! Shell tool.
//!
//! Runs a command through `sh -c` in the current working directory and
//! reports `Exit code: {code}\nOutput: {stdout+stderr}` back to the model.
//! Every invocation passes through the [`ExecPolicy`] first; blocked and
//! declined commands come back as an observable message without spawning
//! anything.
//!
//! CWE-200 mitigation: the child runs with a scrubbed environment so the
//! agent's own credentials cannot leak through `env`-style commands.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::policy::{ExecDecision, ExecPolicy};
use super::traits::Tool;
use crate::ui::style;

const COMMAND_TIMEOUT_SECS: u64 = 60;
const MAX_OUTPUT_BYTES: usize = 1_048_576;

/// Environment variables preserved for the child process.
const SAFE_ENV_VARS: &[&str] = &[
    "PATH", "HOME", "TERM", "LANG", "LC_ALL", "LC_CTYPE", "USER", "SHELL",
];

pub struct ShellTool {
    policy: ExecPolicy,
}

impl ShellTool {
    pub fn new(policy: ExecPolicy) -> Self {
        Self { policy }
    }

    async fn confirm_with_operator(command: &str) -> bool {
        if !console::user_attended() {
            // No terminal to ask on. Declining is the safe answer.
            return false;
        }
        let prompt = format!("Run `{}`?", style::yellow(command));
        tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .unwrap_or(false)
        })
        .await
        .unwrap_or(false)
    }

    async fn run_command(command: &str) -> String {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd.env_clear();
        for var in SAFE_ENV_VARS {
            if let Ok(value) = std::env::var(var) {
                cmd.env(var, value);
            }
        }
        cmd.kill_on_drop(true);

        let result =
            tokio::time::timeout(Duration::from_secs(COMMAND_TIMEOUT_SECS), cmd.output()).await;

        match result {
            Ok(Ok(output)) => {
                // -1 stands in for termination by signal.
                let code = output.status.code().unwrap_or(-1);
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                if combined.len() > MAX_OUTPUT_BYTES {
                    let mut end = MAX_OUTPUT_BYTES;
                    while end > 0 && !combined.is_char_boundary(end) {
                        end -= 1;
                    }
                    combined.truncate(end);
                    combined.push_str("\n... [output truncated at 1MB]");
                }
                format!("Exit code: {code}\nOutput: {combined}")
            }
            Ok(Err(e)) => format!("Error running command: {e}"),
            Err(_) => format!(
                "Error running command: timed out after {COMMAND_TIMEOUT_SECS}s and was killed"
            ),
        }
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "run_cmd"
    }

    fn description(&self) -> &str {
        "Takes a command as input string, runs it on the local system and returns the output from that command"
    }

    async fn run(&self, input: &str) -> anyhow::Result<String> {
        match self.policy.evaluate(input) {
            ExecDecision::Block(reason) => {
                Ok(format!("Command blocked by execution policy: {reason}"))
            }
            ExecDecision::AskOperator => {
                if Self::confirm_with_operator(input).await {
                    Ok(Self::run_command(input).await)
                } else {
                    Ok("Command blocked by execution policy: operator declined to run it"
                        .to_string())
                }
            }
            ExecDecision::Run => Ok(Self::run_command(input).await),
        }
    }
}

// ─────────────────────────────── Tests ───────────────────────────────
