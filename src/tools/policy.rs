//! Execution policy for the shell tool.
//!
//! Decides what happens when the model asks to run a command: block it,
//! ask the operator, or run it straight away. An optional allowlist
//! restricts eligible commands by executable basename; shell constructs
//! that could smuggle extra commands past the allowlist are rejected.

use serde::{Deserialize, Serialize};

// ─────────────────────────────── Modes ───────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExecMode {
    /// Every command is blocked.
    Deny,
    /// Eligible commands need operator confirmation.
    #[default]
    Confirm,
    /// Eligible commands run without confirmation.
    Allow,
}

/// Outcome of evaluating a command against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecDecision {
    Run,
    AskOperator,
    Block(String),
}

// ─────────────────────────────── Policy ───────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ExecPolicy {
    pub mode: ExecMode,
    /// Executable basenames eligible to run. Empty means all commands
    /// are eligible.
    pub allowed_commands: Vec<String>,
}

impl ExecPolicy {
    pub fn allow_all() -> Self {
        Self { mode: ExecMode::Allow, allowed_commands: Vec::new() }
    }

    pub fn evaluate(&self, command: &str) -> ExecDecision {
        if command.trim().is_empty() {
            return ExecDecision::Block("empty command".to_string());
        }
        match self.mode {
            ExecMode::Deny => {
                ExecDecision::Block("command execution is disabled by policy".to_string())
            }
            ExecMode::Allow | ExecMode::Confirm => {
                if !self.allowed_commands.is_empty() && !self.passes_allowlist(command) {
                    return ExecDecision::Block(format!("command not in allowlist: {command}"));
                }
                if self.mode == ExecMode::Confirm {
                    ExecDecision::AskOperator
                } else {
                    ExecDecision::Run
                }
            }
        }
    }

    /// Checks every segment of a compound command against the allowlist.
    ///
    /// Substitution, redirection and backgrounding are rejected outright:
    /// they can run or write things the segment split cannot see.
    fn passes_allowlist(&self, command: &str) -> bool {
        if command.contains('`') || command.contains("$(") || command.contains("${") {
            return false;
        }
        if command.contains('>') {
            return false;
        }
        let separated = command.replace("&&", "\x00").replace("||", "\x00");
        if separated.contains('&') {
            return false;
        }
        let separated = separated
            .replace('\n', "\x00")
            .replace(';', "\x00")
            .replace('|', "\x00");

        let mut saw_segment = false;
        for segment in separated.split('\x00') {
            let Some(word) = segment.split_whitespace().next() else {
                continue;
            };
            saw_segment = true;
            let base = word.rsplit('/').next().unwrap_or(word);
            if !self.allowed_commands.iter().any(|allowed| allowed == base) {
                return false;
            }
        }
        saw_segment
    }
}

// ─────────────────────────────── Tests ───────────────────────────────
