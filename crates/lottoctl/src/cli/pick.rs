use std::collections::HashSet;

use clap::Parser;
use const_format::concatcp;
use eyre::Result as EyreResult;
use lottosync_primitives::{DrawHistory, BALL_MAX, BALL_MIN};
use rand::seq::SliceRandom;
use serde::Serialize;

use crate::cli::Environment;
use crate::common::{build_store, load_config};
use crate::output::Report;

pub const EXAMPLES: &str = r"
  # One suggestion, avoiding every historical winning combination
  $ lottoctl pick

  # Five suggestions at once
  $ lottoctl pick --count 5
";

#[derive(Copy, Clone, Debug, Parser)]
#[command(about = "Suggest number combinations that never won before")]
#[command(after_help = concatcp!("Examples:", EXAMPLES))]
pub struct PickCommand {
    /// How many combinations to suggest
    #[arg(long, short, default_value_t = 1)]
    pub count: usize,
}

#[derive(Debug, Serialize)]
struct PickReport {
    picks: Vec<[u8; 6]>,
}

impl Report for PickReport {
    fn report(&self) {
        for pick in &self.picks {
            let numbers = pick
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            println!("[{numbers}]");
        }
    }
}

/// Every combination that ever took first prize, plus every second-prize
/// combination (five winning numbers and the bonus).
fn winning_combinations(history: &DrawHistory) -> HashSet<[u8; 6]> {
    let mut used = HashSet::new();

    for record in history.iter() {
        used.insert(*record.numbers());

        for slot in 0..6 {
            let mut second_place = *record.numbers();
            second_place[slot] = record.bonus();
            second_place.sort_unstable();
            used.insert(second_place);
        }
    }

    used
}

fn draw_fresh(used: &HashSet<[u8; 6]>, rng: &mut impl rand::Rng) -> [u8; 6] {
    let pool: Vec<u8> = (BALL_MIN..=BALL_MAX).collect();

    loop {
        let mut selected: Vec<u8> = pool.choose_multiple(rng, 6).copied().collect();
        selected.sort_unstable();

        let candidate: [u8; 6] = selected
            .try_into()
            .unwrap_or_else(|_| unreachable!("choose_multiple yields exactly 6 numbers"));

        if !used.contains(&candidate) {
            return candidate;
        }
    }
}

impl PickCommand {
    pub fn run(self, environment: &Environment) -> EyreResult<()> {
        let config = load_config(&environment.home)?;
        let store = build_store(&environment.home, &config);
        let history = store.load()?;

        let mut used = winning_combinations(&history);
        let mut rng = rand::thread_rng();

        let mut picks = Vec::with_capacity(self.count);
        for _ in 0..self.count {
            let pick = draw_fresh(&used, &mut rng);
            // Avoid suggesting the same combination twice in one call.
            let _ = used.insert(pick);
            picks.push(pick);
        }

        environment.output.write(&PickReport { picks });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lottosync_primitives::DrawRecord;

    use super::*;

    #[test]
    fn excludes_first_and_second_prize_combinations() {
        let history = DrawHistory::from_records(vec![
            DrawRecord::new(1, [1, 2, 3, 4, 5, 6], 7).unwrap(),
        ])
        .unwrap();

        let used = winning_combinations(&history);

        assert!(used.contains(&[1, 2, 3, 4, 5, 6]));
        // Bonus substituted into each slot, re-sorted.
        assert!(used.contains(&[2, 3, 4, 5, 6, 7]));
        assert!(used.contains(&[1, 3, 4, 5, 6, 7]));
        assert_eq!(used.len(), 7);
    }

    #[test]
    fn fresh_draws_are_valid_and_unseen() {
        let history = DrawHistory::from_records(vec![
            DrawRecord::new(1, [1, 2, 3, 4, 5, 6], 7).unwrap(),
        ])
        .unwrap();
        let used = winning_combinations(&history);
        let mut rng = rand::thread_rng();

        for _ in 0..32 {
            let pick = draw_fresh(&used, &mut rng);
            assert!(!used.contains(&pick));
            assert!(pick.windows(2).all(|pair| pair[0] < pair[1]));
            assert!(pick.iter().all(|n| (BALL_MIN..=BALL_MAX).contains(n)));
        }
    }
}
