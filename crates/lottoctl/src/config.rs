use core::time::Duration;
use std::fs::{read_to_string, write};

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result as EyreResult, WrapErr};
use serde::{Deserialize, Serialize};
use url::Url;

pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_API_ENDPOINT: &str = "https://www.dhlottery.co.kr/common.do";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://search.naver.com/search.naver";
pub const DEFAULT_DATA_FILE: &str = "lottery_data.json";

#[derive(Debug, Deserialize, Serialize)]
pub struct ConfigFile {
    pub store: StoreConfig,

    pub fetch: FetchConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Authoritative mirror; loads come from here. May be relative to the
    /// home directory.
    pub authoritative: Utf8PathBuf,

    /// Secondary mirrors, rewritten on save when they exist.
    #[serde(default)]
    pub mirrors: Vec<Utf8PathBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FetchConfig {
    pub api_endpoint: Url,

    pub search_endpoint: Url,

    /// External renderer command for the browser-rendered strategy.
    /// Absent means the strategy is not part of the chain.
    #[serde(default)]
    pub renderer: Option<String>,

    /// Chain priority order.
    #[serde(default = "StrategyKind::default_order")]
    pub strategies: Vec<StrategyKind>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Rendered,
    DirectApi,
    SearchScrape,
}

impl StrategyKind {
    fn default_order() -> Vec<Self> {
        vec![Self::Rendered, Self::DirectApi, Self::SearchScrape]
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct RetryConfig {
    pub max_attempts: u32,

    #[serde(rename = "base_delay_ms", with = "serde_duration")]
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct SyncConfig {
    #[serde(rename = "pacing_ms", with = "serde_duration")]
    pub pacing: Duration,

    /// Re-resolve the latest persisted round before extending, as a
    /// connectivity sanity check.
    pub probe: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pacing: Duration::from_millis(1500),
            probe: false,
        }
    }
}

impl ConfigFile {
    pub fn defaults() -> Self {
        Self {
            store: StoreConfig {
                authoritative: Utf8PathBuf::from(DEFAULT_DATA_FILE),
                mirrors: Vec::new(),
            },
            fetch: FetchConfig {
                api_endpoint: Url::parse(DEFAULT_API_ENDPOINT)
                    .expect("default endpoint is a valid url"),
                search_endpoint: Url::parse(DEFAULT_SEARCH_ENDPOINT)
                    .expect("default endpoint is a valid url"),
                renderer: None,
                strategies: StrategyKind::default_order(),
            },
            retry: RetryConfig::default(),
            sync: SyncConfig::default(),
        }
    }

    #[must_use]
    pub fn exists(dir: &Utf8Path) -> bool {
        dir.join(CONFIG_FILE).is_file()
    }

    pub fn load(dir: &Utf8Path) -> EyreResult<Self> {
        let path = dir.join(CONFIG_FILE);
        let content = read_to_string(&path)
            .wrap_err_with(|| format!("failed to read configuration from {path}"))?;

        toml::from_str(&content).map_err(Into::into)
    }

    pub fn save(&self, dir: &Utf8Path) -> EyreResult<()> {
        let path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)?;

        write(&path, content)
            .wrap_err_with(|| format!("failed to write configuration to {path}"))?;

        Ok(())
    }

    /// Resolve a store path against the home directory.
    pub fn resolve_path(&self, home: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            home.join(path)
        }
    }
}

mod serde_duration {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
