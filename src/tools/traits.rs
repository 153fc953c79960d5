//! Tool seam.

use async_trait::async_trait;

/// A capability the model can invoke through a `TOOL` step.
///
/// Expected failures (unreachable host, non-zero exit, blocked command)
/// fold into the returned `Ok` string so the model can observe them and
/// re-plan. `Err` is reserved for invocations the adapter could not
/// perform at all.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    async fn run(&self, input: &str) -> anyhow::Result<String>;
}
