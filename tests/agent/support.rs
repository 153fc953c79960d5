//! Shared test doubles for the agent integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use stepchain::agent::history::Message;
use stepchain::agent::protocol::Step;
use stepchain::agent::turn::StepObserver;
use stepchain::providers::StepProvider;
use stepchain::tools::Tool;

/// Plays back a fixed script of raw responses, recording every request.
pub struct MockProvider {
    responses: Mutex<VecDeque<String>>,
    seen_messages: Mutex<Vec<Vec<Message>>>,
}

impl MockProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            seen_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.seen_messages.lock().unwrap().len()
    }

    /// Messages the provider saw on the nth request.
    pub fn request(&self, n: usize) -> Vec<Message> {
        self.seen_messages.lock().unwrap()[n].clone()
    }
}

#[async_trait]
impl StepProvider for MockProvider {
    async fn next_step(
        &self,
        messages: &[Message],
        _model: &str,
        _temperature: f64,
    ) -> anyhow::Result<String> {
        self.seen_messages.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("mock provider script exhausted"))
    }
}

/// Echoes its input, prefixed, so observations are easy to assert on.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Echoes the input back"
    }
    async fn run(&self, input: &str) -> anyhow::Result<String> {
        Ok(format!("echo: {input}"))
    }
}

/// Records observer callbacks in order.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl StepObserver for RecordingObserver {
    fn on_step(&self, step: &Step) {
        self.events.lock().unwrap().push(format!("step:{}", step.step));
    }

    fn on_tool_result(&self, tool: &str, _result: &str) {
        self.events.lock().unwrap().push(format!("result:{tool}"));
    }
}
