use std::fs::{create_dir_all, write};

use clap::Parser;
use const_format::concatcp;
use eyre::{bail, Result as EyreResult, WrapErr};
use serde::Serialize;
use tracing::info;

use crate::cli::Environment;
use crate::common::build_store;
use crate::config::{ConfigFile, CONFIG_FILE};
use crate::output::Report;

pub const EXAMPLES: &str = r"
  $ lottoctl init
  $ lottoctl --home ./data init --force
";

#[derive(Copy, Clone, Debug, Parser)]
#[command(about = "Initialize a home directory with a default configuration")]
#[command(after_help = concatcp!("Examples:", EXAMPLES))]
pub struct InitCommand {
    /// Overwrite an existing configuration
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitReport {
    home: String,
    config: String,
    data: String,
}

impl Report for InitReport {
    fn report(&self) {
        println!("Initialized {}", self.home);
        println!("  config: {}", self.config);
        println!("  data:   {}", self.data);
    }
}

impl InitCommand {
    pub fn run(self, environment: &Environment) -> EyreResult<()> {
        let home = &environment.home;

        create_dir_all(home).wrap_err_with(|| format!("failed to create {home}"))?;

        if ConfigFile::exists(home) {
            if !self.force {
                bail!(
                    "{CONFIG_FILE} already exists in {home}: use --force to overwrite it"
                );
            }
            info!(%home, "overwriting existing configuration");
        }

        let config = ConfigFile::defaults();
        config.save(home)?;

        // Seed an empty history so the first sync has a base to load.
        let store = build_store(home, &config);
        let base = store.authoritative();
        if !base.is_file() {
            write(base, "[]\n").wrap_err_with(|| format!("failed to seed {base}"))?;
        }

        environment.output.write(&InitReport {
            home: home.to_string(),
            config: home.join(CONFIG_FILE).to_string(),
            data: base.to_string(),
        });

        Ok(())
    }
}
