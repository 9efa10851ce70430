use core::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::outcome::{FetchOutcome, RoundRef};
use crate::strategy::FetchStrategy;

/// Bounded retry with exponential backoff around a single strategy.
///
/// `Found`, `NotYetDrawn` and `Fatal` all end the loop immediately — the
/// first two are definitive answers, the last cannot improve with more
/// attempts. Only `Transient` retries, sleeping `base_delay * 2^attempt`
/// between attempts (attempt index starting at 1). This is the only
/// blocking delay in the system besides the driver's pacing sleep.
#[derive(Clone, Copy, Debug)]
pub struct RetryController {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryController {
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            base_delay,
        }
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn run(&self, strategy: &dyn FetchStrategy, round: RoundRef) -> FetchOutcome {
        let mut attempt = 0_u32;

        loop {
            attempt += 1;

            let outcome = strategy.attempt(round).await;

            match outcome {
                FetchOutcome::Found(_) | FetchOutcome::NotYetDrawn | FetchOutcome::Fatal(_) => {
                    return outcome;
                }
                FetchOutcome::Transient(ref err) => {
                    if attempt >= self.max_attempts {
                        warn!(
                            strategy = strategy.name(),
                            %round,
                            attempts = attempt,
                            error = %err,
                            "retries exhausted"
                        );
                        return outcome;
                    }

                    let delay = self.base_delay * 2_u32.saturating_pow(attempt);

                    debug!(
                        strategy = strategy.name(),
                        %round,
                        attempt,
                        error = %err,
                        backoff_ms = delay.as_millis() as u64,
                        "transient failure, backing off"
                    );

                    sleep(delay).await;
                }
            }
        }
    }
}
