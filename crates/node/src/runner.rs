use core::time::Duration;

use eyre::{Result, WrapErr};
use lottosync_client::{FetchOutcome, RoundRef, StrategyChain};
use lottosync_primitives::{DrawRecord, Round};
use lottosync_store::MirrorSet;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::report::{Boundary, SyncReport};

/// Drives one synchronization run: load, probe, extend, merge, persist.
///
/// The run is strictly sequential. Upstream rate limits and bot detection
/// make concurrent requests counterproductive, and correctness depends on
/// finding the first round the upstream does not have — so every fetch
/// completes (definitively or by exhausting its retries) before the next
/// round is requested.
#[derive(Debug)]
pub struct SyncRunner {
    store: MirrorSet,
    chain: StrategyChain,
    pacing: Duration,
    probe: bool,
}

impl SyncRunner {
    pub fn new(store: MirrorSet, chain: StrategyChain, pacing: Duration, probe: bool) -> Self {
        Self {
            store,
            chain,
            pacing,
            probe,
        }
    }

    pub async fn run(&self) -> Result<SyncReport> {
        let mut history = self
            .store
            .load()
            .wrap_err("cannot synchronize without a base store")?;

        let base_round = history.latest_round();

        info!(
            base_round = base_round.unwrap_or(0),
            records = history.len(),
            strategies = ?self.chain.strategy_names(),
            "starting synchronization run"
        );

        if self.probe {
            if let Some(round) = base_round {
                self.probe_round(round, history.get(round)).await;
            }
        }

        let mut cursor = base_round.unwrap_or(0) + 1;
        let mut fetched: Vec<DrawRecord> = Vec::new();

        let boundary = loop {
            if !fetched.is_empty() {
                // Pacing between successive round requests; upstream rate
                // limits punish bursts.
                sleep(self.pacing).await;
            }

            match self.chain.resolve(RoundRef::Specific(cursor)).await {
                FetchOutcome::Found(record) => {
                    if record.round() != cursor {
                        warn!(
                            expected = cursor,
                            got = record.round(),
                            "strategy returned the wrong round, stopping extension"
                        );
                        break Boundary::Undetermined {
                            round: cursor,
                            error: lottosync_client::FetchError::Malformed(format!(
                                "asked for round {cursor}, got round {}",
                                record.round()
                            )),
                        };
                    }

                    info!(
                        round = record.round(),
                        numbers = ?record.numbers(),
                        bonus = record.bonus(),
                        "round fetched"
                    );

                    fetched.push(record);
                    cursor += 1;
                }
                FetchOutcome::NotYetDrawn => {
                    debug!(round = cursor, "upstream has no such round yet");
                    break Boundary::NotYetDrawn(cursor);
                }
                FetchOutcome::Transient(error) | FetchOutcome::Fatal(error) => {
                    warn!(
                        round = cursor,
                        %error,
                        "round undetermined this run; a later run may still find it"
                    );
                    break Boundary::Undetermined {
                        round: cursor,
                        error,
                    };
                }
            }
        };

        if fetched.is_empty() {
            info!("already up to date, nothing to persist");
            return Ok(SyncReport {
                base_round,
                new_rounds: Vec::new(),
                latest_round: base_round,
                boundary,
                mirror_failures: Vec::new(),
            });
        }

        let new_rounds: Vec<Round> = fetched.iter().map(DrawRecord::round).collect();

        history
            .extend(fetched)
            .wrap_err("fetched rounds collide with persisted history")?;

        let mirror_failures = self.store.persist(&history);
        let latest_round = history.latest_round();

        info!(
            added = new_rounds.len(),
            latest_round = latest_round.unwrap_or(0),
            failed_mirrors = mirror_failures.len(),
            "synchronization run complete"
        );

        Ok(SyncReport {
            base_round,
            new_rounds,
            latest_round,
            boundary,
            mirror_failures,
        })
    }

    /// Connectivity sanity check: re-resolve the latest persisted round.
    /// Outcome is logged only; the run proceeds regardless.
    async fn probe_round(&self, round: Round, persisted: Option<&DrawRecord>) {
        match self.chain.resolve(RoundRef::Specific(round)).await {
            FetchOutcome::Found(record) => {
                if persisted == Some(&record) {
                    debug!(round, "probe confirmed latest persisted round");
                } else {
                    warn!(
                        round,
                        "probe result disagrees with persisted record; history is append-only \
                         and will not be rewritten"
                    );
                }
            }
            outcome => {
                warn!(round, ?outcome, "probe failed, proceeding anyway");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use lottosync_client::testing::ScriptedStrategy;
    use lottosync_client::{FetchError, RetryController};
    use lottosync_primitives::DrawHistory;
    use tempfile::TempDir;

    use super::*;

    fn seeded_store(dir: &TempDir, rounds: core::ops::RangeInclusive<Round>) -> MirrorSet {
        let records = rounds
            .map(|round| DrawRecord::new(round, [1, 2, 3, 4, 5, 6], 7).unwrap())
            .collect();
        let history = DrawHistory::from_records(records).unwrap();

        let base = Utf8PathBuf::from_path_buf(dir.path().join("data.json")).unwrap();
        let store = MirrorSet::new(base, vec![]);
        assert!(store.persist(&history).is_empty());
        store
    }

    fn chain_of(strategy: ScriptedStrategy) -> StrategyChain {
        StrategyChain::new(RetryController::new(1, Duration::from_millis(1)))
            .with_strategy(Box::new(strategy))
    }

    fn runner(store: MirrorSet, chain: StrategyChain) -> SyncRunner {
        SyncRunner::new(store, chain, Duration::from_millis(1), false)
    }

    #[tokio::test(start_paused = true)]
    async fn appends_one_round_then_stops_at_boundary() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, 1..=100);

        let strategy = ScriptedStrategy::new(
            "fake",
            vec![ScriptedStrategy::found(101), FetchOutcome::NotYetDrawn],
        );

        let report = runner(store.clone(), chain_of(strategy)).run().await.unwrap();

        assert_eq!(report.base_round, Some(100));
        assert_eq!(report.new_rounds, [101]);
        assert_eq!(report.latest_round, Some(101));
        assert!(matches!(report.boundary, Boundary::NotYetDrawn(102)));
        assert!(report.mirror_failures.is_empty());

        let persisted = store.load().unwrap();
        assert_eq!(persisted.latest_round(), Some(101));
        assert_eq!(persisted.len(), 101);
        assert_eq!(persisted.get(101).unwrap().numbers(), &[3, 7, 12, 19, 28, 41]);
    }

    #[tokio::test(start_paused = true)]
    async fn already_up_to_date_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, 1..=100);
        let base = store.authoritative().to_owned();
        let before = std::fs::read(&base).unwrap();

        let strategy = ScriptedStrategy::new("fake", vec![FetchOutcome::NotYetDrawn]);
        let report = runner(store, chain_of(strategy)).run().await.unwrap();

        assert!(report.is_noop());
        assert_eq!(report.added(), 0);
        assert_eq!(report.latest_round, Some(100));
        assert!(matches!(report.boundary, Boundary::NotYetDrawn(101)));

        // Persisted bytes untouched.
        assert_eq!(std::fs::read(&base).unwrap(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_runs_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, 1..=100);
        let base = store.authoritative().to_owned();

        let first = ScriptedStrategy::new(
            "fake",
            vec![ScriptedStrategy::found(101), FetchOutcome::NotYetDrawn],
        );
        let report = runner(store.clone(), chain_of(first)).run().await.unwrap();
        assert_eq!(report.added(), 1);
        let after_first = std::fs::read(&base).unwrap();

        let second = ScriptedStrategy::new("fake", vec![FetchOutcome::NotYetDrawn]);
        let report = runner(store, chain_of(second)).run().await.unwrap();
        assert_eq!(report.added(), 0);
        assert!(report.is_noop());

        assert_eq!(std::fs::read(&base).unwrap(), after_first);
    }

    #[tokio::test(start_paused = true)]
    async fn outage_yields_undetermined_boundary() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, 1..=100);

        let strategy = ScriptedStrategy::new(
            "fake",
            vec![
                ScriptedStrategy::found(101),
                FetchOutcome::Transient(FetchError::Status(503)),
            ],
        );

        let report = runner(store.clone(), chain_of(strategy)).run().await.unwrap();

        // The round that was fetched is still committed.
        assert_eq!(report.new_rounds, [101]);
        assert!(report.boundary.is_undetermined());
        assert_eq!(report.boundary.round(), 102);
        assert_eq!(store.load().unwrap().latest_round(), Some(101));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_base_store_is_fatal() {
        let dir = TempDir::new().unwrap();
        let base = Utf8PathBuf::from_path_buf(dir.path().join("absent.json")).unwrap();
        let store = MirrorSet::new(base, vec![]);

        let strategy = ScriptedStrategy::new("fake", vec![FetchOutcome::NotYetDrawn]);
        let result = runner(store, chain_of(strategy)).run().await;

        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn extends_across_multiple_rounds_in_order() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, 1..=10);

        let strategy = ScriptedStrategy::new(
            "fake",
            vec![
                ScriptedStrategy::found(11),
                ScriptedStrategy::found(12),
                ScriptedStrategy::found(13),
                FetchOutcome::NotYetDrawn,
            ],
        );

        let report = runner(store.clone(), chain_of(strategy)).run().await.unwrap();

        assert_eq!(report.new_rounds, [11, 12, 13]);
        let persisted = store.load().unwrap();
        let rounds: Vec<_> = persisted.iter().map(DrawRecord::round).collect();
        assert_eq!(rounds, (1..=13).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_round_from_strategy_stops_extension() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, 1..=10);

        // Strategy claims round 99 when asked for 11.
        let strategy = ScriptedStrategy::new("fake", vec![ScriptedStrategy::found(99)]);

        let report = runner(store.clone(), chain_of(strategy)).run().await.unwrap();

        assert!(report.is_noop());
        assert!(report.boundary.is_undetermined());
        assert_eq!(store.load().unwrap().latest_round(), Some(10));
    }
}
