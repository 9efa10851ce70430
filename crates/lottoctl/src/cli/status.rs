use clap::Parser;
use comfy_table::{Cell, Color, Table};
use const_format::concatcp;
use eyre::Result as EyreResult;
use lottosync_primitives::Round;
use serde::Serialize;

use crate::cli::Environment;
use crate::common::{build_store, load_config};
use crate::output::Report;

pub const EXAMPLES: &str = r"
  $ lottoctl status
";

#[derive(Copy, Clone, Debug, Parser)]
#[command(about = "Show the state of the local draw history mirrors")]
#[command(after_help = concatcp!("Examples:", EXAMPLES))]
pub struct StatusCommand;

#[derive(Debug, Serialize)]
struct StatusReport {
    latest_round: Option<Round>,
    records: usize,
    mirrors: Vec<MirrorStatus>,
}

#[derive(Debug, Serialize)]
struct MirrorStatus {
    path: String,
    role: &'static str,
    present: bool,
}

impl Report for StatusReport {
    fn report(&self) {
        match self.latest_round {
            Some(round) => println!("Latest round: {round} ({} records)", self.records),
            None => println!("History is empty"),
        }

        let mut table = Table::new();
        let _ = table.set_header(vec![
            Cell::new("Mirror").fg(Color::Blue),
            Cell::new("Role").fg(Color::Blue),
            Cell::new("Present").fg(Color::Blue),
        ]);

        for mirror in &self.mirrors {
            let _ = table.add_row(vec![
                mirror.path.clone(),
                mirror.role.to_owned(),
                if mirror.present { "yes" } else { "no" }.to_owned(),
            ]);
        }

        println!("{table}");
    }
}

impl StatusCommand {
    pub fn run(self, environment: &Environment) -> EyreResult<()> {
        let config = load_config(&environment.home)?;
        let store = build_store(&environment.home, &config);

        let history = store.load()?;

        let mut mirrors = vec![MirrorStatus {
            path: store.authoritative().to_string(),
            role: "authoritative",
            present: store.authoritative().is_file(),
        }];
        for path in store.secondary() {
            mirrors.push(MirrorStatus {
                path: path.to_string(),
                role: "secondary",
                present: path.is_file(),
            });
        }

        environment.output.write(&StatusReport {
            latest_round: history.latest_round(),
            records: history.len(),
            mirrors,
        });

        Ok(())
    }
}
