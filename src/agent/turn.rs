//! The per-turn step loop.
//!
//! One turn: append the user message, then keep asking the provider for
//! the next step until the model emits `OUTPUT`, the step limit runs out,
//! or the model goes off protocol. Tool steps are dispatched through the
//! registry and their results appended as developer `OBSERVE` records, so
//! the model sees its own tool traffic in the transcript.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};

use super::history::History;
use super::protocol::{Step, StepKind, parse_step};
use crate::providers::StepProvider;
use crate::tools::ToolRegistry;

// ─────────────────────────────── Constants ───────────────────────────────

/// Upper bound on the configurable per-turn step limit.
pub(crate) const STEP_HARD_CAP: u32 = 64;

// ─────────────────────────────── Public types ───────────────────────────────

/// Receives step-by-step progress while a turn runs.
pub trait StepObserver: Send + Sync {
    fn on_step(&self, step: &Step);
    fn on_tool_result(&self, tool: &str, result: &str);
}

/// Observer that swallows everything. Used in one-shot paths and tests.
pub struct SilentObserver;

impl StepObserver for SilentObserver {
    fn on_step(&self, _step: &Step) {}
    fn on_tool_result(&self, _tool: &str, _result: &str) {}
}

/// Why a turn stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnStopReason {
    /// The model emitted `OUTPUT`.
    Completed,
    /// The step limit was reached before an `OUTPUT` arrived.
    StepLimit,
    /// The model sent something the protocol cannot accept.
    Protocol(String),
}

#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub final_text: Option<String>,
    pub steps: u32,
    pub tool_calls: u32,
    pub stop_reason: TurnStopReason,
}

/// Borrowed inputs for a single turn.
pub struct TurnParams<'a> {
    pub provider: &'a dyn StepProvider,
    pub history: &'a mut History,
    pub user_message: &'a str,
    pub observer: &'a dyn StepObserver,
}

// ─────────────────────────────── Runner ───────────────────────────────

pub struct TurnRunner {
    registry: Arc<ToolRegistry>,
    max_steps: u32,
    model: String,
    temperature: f64,
}

impl TurnRunner {
    pub fn new(
        registry: Arc<ToolRegistry>,
        max_steps: u32,
        model: String,
        temperature: f64,
    ) -> Self {
        Self {
            registry,
            max_steps: max_steps.min(STEP_HARD_CAP),
            model,
            temperature,
        }
    }

    /// Runs one full turn. Provider transport errors propagate; protocol
    /// violations and the step limit end the turn with a diagnostic
    /// outcome instead, leaving the session able to continue.
    pub async fn run(&self, params: TurnParams<'_>) -> anyhow::Result<TurnOutcome> {
        params.history.push_user(params.user_message);

        let mut steps: u32 = 0;
        let mut tool_calls: u32 = 0;

        loop {
            if steps >= self.max_steps {
                warn!(steps, "turn gave up: step limit reached");
                return Ok(outcome(None, steps, tool_calls, TurnStopReason::StepLimit));
            }

            let raw = params
                .provider
                .next_step(params.history.messages(), &self.model, self.temperature)
                .await?;
            steps += 1;

            let step = match parse_step(&raw) {
                Ok(step) => step,
                Err(e) => {
                    warn!(error = %e, "model response failed to parse");
                    return Ok(outcome(
                        None,
                        steps,
                        tool_calls,
                        TurnStopReason::Protocol(e.to_string()),
                    ));
                }
            };

            let serialized =
                serde_json::to_string(&step).context("serialize step for history")?;
            params.history.push_assistant(serialized);
            params.observer.on_step(&step);

            match step.step {
                StepKind::Start | StepKind::Plan => {}
                StepKind::Observe => {
                    // Observation records are synthesized by this loop; a
                    // model-emitted one stays in the transcript and the
                    // turn moves on.
                    debug!("model emitted an OBSERVE step; continuing");
                }
                StepKind::Tool => {
                    let (tool, input) = match step.tool_invocation() {
                        Ok(pair) => pair,
                        Err(e) => {
                            warn!(error = %e, "TOOL step missing fields");
                            return Ok(outcome(
                                None,
                                steps,
                                tool_calls,
                                TurnStopReason::Protocol(e.to_string()),
                            ));
                        }
                    };
                    tool_calls += 1;
                    // Unknown or failing tools feed an error record back
                    // instead of ending the turn.
                    let result = match self.registry.execute(tool, input).await {
                        Ok(result) => result,
                        Err(e) => e.to_string(),
                    };
                    let record = serde_json::to_string(&Step::observe(tool, &result))
                        .context("serialize observe record")?;
                    params.history.push_developer(record);
                    params.observer.on_tool_result(tool, &result);
                }
                StepKind::Output => {
                    debug!(steps, tool_calls, "turn completed");
                    return Ok(outcome(
                        Some(step.display_content().to_string()),
                        steps,
                        tool_calls,
                        TurnStopReason::Completed,
                    ));
                }
            }
        }
    }
}

fn outcome(
    final_text: Option<String>,
    steps: u32,
    tool_calls: u32,
    stop_reason: TurnStopReason,
) -> TurnOutcome {
    TurnOutcome { final_text, steps, tool_calls, stop_reason }
}

// ─────────────────────────────── Tests ───────────────────────────────
