use clap::Parser;
use const_format::concatcp;
use eyre::Result as EyreResult;
use lottosync_node::{Boundary, SyncReport, SyncRunner};
use lottosync_primitives::Round;
use serde::Serialize;

use crate::cli::Environment;
use crate::common::{build_chain, build_store, load_config};
use crate::output::Report;

pub const EXAMPLES: &str = r"
  $ lottoctl sync
  $ lottoctl --output-format json sync
";

#[derive(Copy, Clone, Debug, Parser)]
#[command(about = "Fetch and persist every round drawn since the last run")]
#[command(after_help = concatcp!("Examples:", EXAMPLES))]
pub struct SyncCommand {
    /// Re-resolve the latest persisted round before extending
    #[arg(long)]
    pub probe: bool,
}

#[derive(Debug, Serialize)]
struct SyncSummary {
    base_round: Option<Round>,
    latest_round: Option<Round>,
    new_rounds: Vec<Round>,
    boundary_round: Round,
    boundary_undetermined: bool,
    failed_mirrors: Vec<String>,
}

impl From<&SyncReport> for SyncSummary {
    fn from(report: &SyncReport) -> Self {
        Self {
            base_round: report.base_round,
            latest_round: report.latest_round,
            new_rounds: report.new_rounds.clone(),
            boundary_round: report.boundary.round(),
            boundary_undetermined: report.boundary.is_undetermined(),
            failed_mirrors: report
                .mirror_failures
                .iter()
                .map(|failure| failure.path.to_string())
                .collect(),
        }
    }
}

impl Report for SyncSummary {
    fn report(&self) {
        if self.new_rounds.is_empty() {
            println!(
                "Already up to date (latest round: {})",
                self.latest_round.unwrap_or(0)
            );
        } else {
            println!(
                "Added {} new round(s), latest is now {}",
                self.new_rounds.len(),
                self.latest_round.unwrap_or(0)
            );
        }

        if self.boundary_undetermined {
            println!(
                "Round {} could not be determined this run; rerun later to pick it up",
                self.boundary_round
            );
        }

        for path in &self.failed_mirrors {
            println!("Mirror {path} could not be written");
        }
    }
}

impl SyncCommand {
    pub async fn run(self, environment: &Environment) -> EyreResult<()> {
        let config = load_config(&environment.home)?;
        let store = build_store(&environment.home, &config);
        let chain = build_chain(&config)?;

        let runner = SyncRunner::new(
            store,
            chain,
            config.sync.pacing,
            self.probe || config.sync.probe,
        );

        let report = runner.run().await?;

        if let Boundary::Undetermined { round, error } = &report.boundary {
            tracing::warn!(round, %error, "synchronization stopped on an undetermined round");
        }

        environment.output.write(&SyncSummary::from(&report));

        Ok(())
    }
}
