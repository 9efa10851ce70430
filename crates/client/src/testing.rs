//! Scripted fetch strategies for tests.
//!
//! Kept in the library (not behind `cfg(test)`) so downstream crates can
//! drive the retry controller, chain and driver against deterministic
//! outcome sequences.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use lottosync_primitives::{DrawRecord, Round};

use crate::outcome::{FetchOutcome, RoundRef};
use crate::strategy::FetchStrategy;

/// Replays a fixed sequence of outcomes, then keeps returning the last
/// one. Counts attempts.
#[derive(Debug)]
pub struct ScriptedStrategy {
    name: &'static str,
    script: Mutex<VecDeque<FetchOutcome>>,
    last: Mutex<FetchOutcome>,
    attempts: AtomicU32,
}

impl ScriptedStrategy {
    pub fn new(name: &'static str, outcomes: Vec<FetchOutcome>) -> Self {
        Self {
            name,
            script: Mutex::new(outcomes.into()),
            last: Mutex::new(FetchOutcome::NotYetDrawn),
            attempts: AtomicU32::new(0),
        }
    }

    /// A well-formed `Found` outcome for the given round.
    pub fn found(round: Round) -> FetchOutcome {
        let record = DrawRecord::new(round, [3, 7, 12, 19, 28, 41], 5)
            .unwrap_or_else(|_| unreachable!("fixture record is valid"));
        FetchOutcome::Found(record)
    }

    /// Number of `attempt` calls made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchStrategy for ScriptedStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn attempt(&self, _round: RoundRef) -> FetchOutcome {
        let _count = self.attempts.fetch_add(1, Ordering::SeqCst);

        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());

        match script.pop_front() {
            Some(outcome) => {
                let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
                *last = outcome.clone();
                outcome
            }
            None => self
                .last
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }
}
