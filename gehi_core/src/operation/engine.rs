use super::{Operation, OutputSink};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;

/// Runs imagery operations.
///
/// Implementations report text through `sink` and write files to the path
/// carried by the operation. Returning an error marks the run as failed; text
/// written before the error stays in the sink. `cancel` fires when the caller
/// is no longer interested in the result, honoring it is up to the engine.
#[async_trait]
pub trait ImageryEngine: Debug + Send + Sync {
	async fn run(&self, operation: &Operation, sink: &mut OutputSink, cancel: CancellationToken) -> Result<()>;
}
