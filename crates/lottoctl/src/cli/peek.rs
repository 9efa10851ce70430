use clap::Parser;
use const_format::concatcp;
use eyre::{bail, Result as EyreResult};
use lottosync_client::{FetchOutcome, RoundRef};
use lottosync_primitives::{DrawRecord, Round};
use serde::Serialize;

use crate::cli::Environment;
use crate::common::{build_chain, load_config};
use crate::output::Report;

pub const EXAMPLES: &str = r"
  # Look up the latest drawn round without touching the local history
  $ lottoctl peek

  # Look up a specific round
  $ lottoctl peek 1150
";

#[derive(Copy, Clone, Debug, Parser)]
#[command(about = "Fetch a round from upstream without persisting it")]
#[command(after_help = concatcp!("Examples:", EXAMPLES))]
pub struct PeekCommand {
    /// Round to look up; omit for the latest drawn round
    pub round: Option<Round>,
}

#[derive(Debug, Serialize)]
struct PeekReport {
    round: Round,
    numbers: [u8; 6],
    bonus: u8,
}

impl From<&DrawRecord> for PeekReport {
    fn from(record: &DrawRecord) -> Self {
        Self {
            round: record.round(),
            numbers: *record.numbers(),
            bonus: record.bonus(),
        }
    }
}

impl Report for PeekReport {
    fn report(&self) {
        let numbers = self
            .numbers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!("Round {}: [{numbers}] + bonus {}", self.round, self.bonus);
    }
}

impl PeekCommand {
    pub async fn run(self, environment: &Environment) -> EyreResult<()> {
        let config = load_config(&environment.home)?;
        let chain = build_chain(&config)?;

        let round = self.round.map_or(RoundRef::Latest, RoundRef::Specific);

        match chain.resolve(round).await {
            FetchOutcome::Found(record) => {
                environment.output.write(&PeekReport::from(&record));
                Ok(())
            }
            FetchOutcome::NotYetDrawn => bail!("{round} has not been drawn yet"),
            FetchOutcome::Transient(error) | FetchOutcome::Fatal(error) => {
                Err(error).map_err(Into::into)
            }
        }
    }
}
