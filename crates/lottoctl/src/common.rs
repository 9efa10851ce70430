use camino::Utf8Path;
use eyre::{bail, Result as EyreResult, WrapErr};
use lottosync_client::{
    DirectApiStrategy, RenderedStrategy, RetryController, SearchScrapeStrategy, StrategyChain,
};
use lottosync_store::MirrorSet;
use reqwest::Client;
use tracing::debug;

use crate::config::{ConfigFile, StrategyKind, CONFIG_FILE};

pub fn load_config(home: &Utf8Path) -> EyreResult<ConfigFile> {
    if !ConfigFile::exists(home) {
        bail!(
            "no {CONFIG_FILE} in {home}: run `lottoctl init` to prepare a home directory first"
        );
    }

    ConfigFile::load(home).wrap_err_with(|| format!("failed to load configuration from {home}"))
}

/// Mirror paths from the config, relative entries resolved against home.
pub fn build_store(home: &Utf8Path, config: &ConfigFile) -> MirrorSet {
    let authoritative = config.resolve_path(home, &config.store.authoritative);
    let secondary = config
        .store
        .mirrors
        .iter()
        .map(|path| config.resolve_path(home, path))
        .collect();

    MirrorSet::new(authoritative, secondary)
}

/// Assemble the strategy chain in the configured priority order. The
/// rendered strategy is only included when a renderer command is set;
/// the other strategies share one HTTP client.
pub fn build_chain(config: &ConfigFile) -> EyreResult<StrategyChain> {
    let client = Client::builder()
        .build()
        .wrap_err("failed to construct HTTP client")?;

    let retry = RetryController::new(config.retry.max_attempts, config.retry.base_delay);
    let mut chain = StrategyChain::new(retry);

    for kind in &config.fetch.strategies {
        match kind {
            StrategyKind::Rendered => {
                let Some(renderer) = &config.fetch.renderer else {
                    debug!("no renderer configured, skipping rendered strategy");
                    continue;
                };
                chain = chain.with_strategy(Box::new(RenderedStrategy::new(renderer.clone())));
            }
            StrategyKind::DirectApi => {
                chain = chain.with_strategy(Box::new(DirectApiStrategy::new(
                    client.clone(),
                    config.fetch.api_endpoint.clone(),
                )));
            }
            StrategyKind::SearchScrape => {
                chain = chain.with_strategy(Box::new(SearchScrapeStrategy::new(
                    client.clone(),
                    config.fetch.search_endpoint.clone(),
                )));
            }
        }
    }

    if chain.is_empty() {
        bail!("configuration yields no usable fetch strategy");
    }

    debug!(strategies = ?chain.strategy_names(), "assembled fetch chain");

    Ok(chain)
}
