//! Provider seam.

use async_trait::async_trait;

use crate::agent::history::Message;

/// A chat backend that returns one raw step per call.
///
/// The return value is the model's response text, expected to be a single
/// serialized step object. Parsing stays with the caller so a provider
/// needs no knowledge of the protocol beyond the schema it forwards.
#[async_trait]
pub trait StepProvider: Send + Sync {
    async fn next_step(
        &self,
        messages: &[Message],
        model: &str,
        temperature: f64,
    ) -> anyhow::Result<String>;
}
