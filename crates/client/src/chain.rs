use tracing::{debug, warn};

use crate::outcome::{FetchError, FetchOutcome, RoundRef};
use crate::retry::RetryController;
use crate::strategy::FetchStrategy;

/// Ordered fallback chain of fetch strategies.
///
/// Strategies are tried in priority order, each wrapped in the retry
/// controller. A definitive outcome (`Found` or `NotYetDrawn`) from any
/// strategy is authoritative and short-circuits the chain: one backend
/// confirming "not drawn yet" reflects real upstream state, so the rest
/// are not consulted. Errors advance to the next strategy; if every
/// strategy fails, the last error is the chain's answer.
#[derive(Debug)]
pub struct StrategyChain {
    strategies: Vec<Box<dyn FetchStrategy>>,
    retry: RetryController,
}

impl StrategyChain {
    pub fn new(retry: RetryController) -> Self {
        Self {
            strategies: Vec::new(),
            retry,
        }
    }

    /// Append a strategy at the end of the priority order.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn FetchStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve one round through the chain.
    pub async fn resolve(&self, round: RoundRef) -> FetchOutcome {
        let mut last = FetchOutcome::Fatal(FetchError::NoStrategy);

        for strategy in &self.strategies {
            debug!(strategy = strategy.name(), %round, "trying strategy");

            let outcome = self.retry.run(strategy.as_ref(), round).await;

            match &outcome {
                FetchOutcome::Found(record) => {
                    debug!(
                        strategy = strategy.name(),
                        round = record.round(),
                        "strategy produced a record"
                    );
                    return outcome;
                }
                FetchOutcome::NotYetDrawn => {
                    debug!(strategy = strategy.name(), %round, "not yet drawn");
                    return outcome;
                }
                FetchOutcome::Transient(err) | FetchOutcome::Fatal(err) => {
                    warn!(
                        strategy = strategy.name(),
                        %round,
                        error = %err,
                        "strategy failed, falling through"
                    );
                    last = outcome;
                }
            }
        }

        last
    }
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use crate::testing::ScriptedStrategy;

    use super::*;

    fn chain_of(strategies: Vec<ScriptedStrategy>) -> StrategyChain {
        let mut chain = StrategyChain::new(RetryController::new(1, Duration::from_millis(1)));
        for strategy in strategies {
            chain = chain.with_strategy(Box::new(strategy));
        }
        chain
    }

    fn transient() -> FetchOutcome {
        FetchOutcome::Transient(FetchError::Status(503))
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_masks_earlier_failures() {
        let failing = ScriptedStrategy::new("a", vec![transient()]);
        let working = ScriptedStrategy::new("b", vec![ScriptedStrategy::found(101)]);

        let chain = chain_of(vec![failing, working]);
        let outcome = chain.resolve(RoundRef::Specific(101)).await;

        assert!(matches!(outcome, FetchOutcome::Found(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn not_yet_drawn_short_circuits() {
        let first = ScriptedStrategy::new("a", vec![FetchOutcome::NotYetDrawn]);
        let second = ScriptedStrategy::new("b", vec![ScriptedStrategy::found(101)]);

        let chain = StrategyChain::new(RetryController::new(1, Duration::from_millis(1)))
            .with_strategy(Box::new(first))
            .with_strategy(Box::new(second));

        let outcome = chain.resolve(RoundRef::Specific(101)).await;
        assert!(matches!(outcome, FetchOutcome::NotYetDrawn));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_chain_returns_last_error() {
        let first = ScriptedStrategy::new(
            "a",
            vec![FetchOutcome::Fatal(FetchError::CapabilityMissing(
                "no renderer".into(),
            ))],
        );
        let second = ScriptedStrategy::new("b", vec![transient()]);

        let chain = chain_of(vec![first, second]);
        let outcome = chain.resolve(RoundRef::Specific(101)).await;

        assert!(matches!(
            outcome,
            FetchOutcome::Transient(FetchError::Status(503))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_strategy_does_not_poison_chain() {
        let broken = ScriptedStrategy::new(
            "a",
            vec![FetchOutcome::Fatal(FetchError::CapabilityMissing(
                "missing".into(),
            ))],
        );
        let working = ScriptedStrategy::new("b", vec![ScriptedStrategy::found(42)]);

        let chain = chain_of(vec![broken, working]);
        let outcome = chain.resolve(RoundRef::Specific(42)).await;

        assert!(matches!(outcome, FetchOutcome::Found(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_chain_is_an_error() {
        let chain = StrategyChain::new(RetryController::new(1, Duration::from_millis(1)));
        let outcome = chain.resolve(RoundRef::Latest).await;

        assert!(matches!(
            outcome,
            FetchOutcome::Fatal(FetchError::NoStrategy)
        ));
    }
}
