use async_trait::async_trait;

use crate::outcome::{FetchOutcome, RoundRef};

/// One retrieval backend for upstream draw results.
///
/// Implementations must absorb their own failure modes into
/// [`FetchOutcome`]; an `attempt` never panics and never returns a
/// transport-level error type of its own.
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Try once to retrieve the referenced round.
    async fn attempt(&self, round: RoundRef) -> FetchOutcome;
}

impl core::fmt::Debug for dyn FetchStrategy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
