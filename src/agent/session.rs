//! Interactive session.
//!
//! Owns the provider, the turn runner and the transcript, and drives the
//! read/dispatch loop on stdin. A failed turn prints a warning and the
//! prompt comes back; only startup errors end the process.

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use uuid::Uuid;

use super::history::History;
use super::protocol::{Step, StepKind};
use super::turn::{StepObserver, TurnOutcome, TurnParams, TurnRunner, TurnStopReason};
use crate::providers::StepProvider;
use crate::ui::style;

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "q"];

pub(crate) fn is_exit_word(line: &str) -> bool {
    EXIT_WORDS.contains(&line.to_lowercase().as_str())
}

// ─────────────────────────────── Console observer ───────────────────────────────

/// Prints each step in its own color as the model works.
pub struct ConsoleObserver;

impl StepObserver for ConsoleObserver {
    fn on_step(&self, step: &Step) {
        match step.step {
            StepKind::Start => {
                println!();
                println!("{}", style::magenta(&format!("🔥 {}", step.display_content())));
                println!();
            }
            StepKind::Plan => {
                println!("{}", style::cyan(&format!("🗓️  {}", step.display_content())));
            }
            StepKind::Tool => {
                let tool = step.tool.as_deref().unwrap_or("?");
                let input = step.input.as_deref().unwrap_or_default();
                println!("{}", style::blue(&format!("🛠️  {tool}({input})")));
            }
            StepKind::Observe => {}
            StepKind::Output => {
                println!();
                println!("{}", style::green(&format!("✅ {}", step.display_content())));
                println!();
            }
        }
    }

    fn on_tool_result(&self, _tool: &str, result: &str) {
        println!("{}", style::blue(&format!("📊 Result: {result}")));
    }
}

// ─────────────────────────────── Session ───────────────────────────────

pub struct Session {
    provider: Box<dyn StepProvider>,
    runner: TurnRunner,
    history: History,
}

impl Session {
    pub fn new(
        provider: Box<dyn StepProvider>,
        runner: TurnRunner,
        system_prompt: String,
        max_history_messages: usize,
    ) -> Self {
        Self {
            provider,
            runner,
            history: History::new(system_prompt, max_history_messages),
        }
    }

    /// Runs a single turn against the shared transcript.
    pub async fn run_once(
        &mut self,
        message: &str,
        observer: &dyn StepObserver,
    ) -> anyhow::Result<TurnOutcome> {
        self.runner
            .run(TurnParams {
                provider: self.provider.as_ref(),
                history: &mut self.history,
                user_message: message,
                observer,
            })
            .await
    }

    /// Reads prompts from stdin until EOF or an exit word.
    pub async fn run_interactive(&mut self) -> anyhow::Result<()> {
        info!(session_id = %Uuid::new_v4(), "interactive session started");
        print_banner();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("\n👉🏻 ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if is_exit_word(&line) {
                break;
            }

            match self.run_once(&line, &ConsoleObserver).await {
                Ok(outcome) => report_outcome(&outcome),
                Err(e) => {
                    println!("{}", style::yellow(&format!("⚠️  turn failed: {e:#}")));
                }
            }
        }

        println!();
        println!("{}", style::gold("Goodbye!"));
        println!();
        Ok(())
    }
}

fn report_outcome(outcome: &TurnOutcome) {
    match &outcome.stop_reason {
        TurnStopReason::Completed => {}
        TurnStopReason::StepLimit => {
            println!(
                "{}",
                style::yellow(&format!(
                    "⚠️  giving up after {} steps without a final answer",
                    outcome.steps
                ))
            );
        }
        TurnStopReason::Protocol(msg) => {
            println!(
                "{}",
                style::yellow(&format!("⚠️  the model went off protocol: {msg}"))
            );
        }
    }
}

fn print_banner() {
    println!("{}", style::gold("stepchain"));
    println!("{}", style::dim(">> plan step by step, act with tools, answer once <<"));
}

// ─────────────────────────────── Tests ───────────────────────────────
