//! Mirrored on-disk persistence for the draw history.
//!
//! The history lives as a UTF-8 JSON array of records in one authoritative
//! file plus any number of secondary mirrors, all byte-identical. Loads
//! always come from the authoritative copy; saves rewrite every mirror
//! that exists (or is the authoritative path) atomically.

use std::fs::{read_to_string, rename, File};
use std::io::Write as _;

use camino::{Utf8Path, Utf8PathBuf};
use lottosync_primitives::DrawHistory;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("authoritative mirror missing at {path}")]
    BaseMissing { path: Utf8PathBuf },

    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed draw history in {path}")]
    Malformed {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A mirror write that failed. Persisting continues past these; the caller
/// decides how loudly to complain.
#[derive(Debug)]
pub struct MirrorFailure {
    pub path: Utf8PathBuf,
    pub error: StoreError,
}

/// One authoritative path plus secondary mirror paths.
#[derive(Clone, Debug)]
pub struct MirrorSet {
    authoritative: Utf8PathBuf,
    secondary: Vec<Utf8PathBuf>,
}

impl MirrorSet {
    pub fn new(authoritative: Utf8PathBuf, secondary: Vec<Utf8PathBuf>) -> Self {
        Self {
            authoritative,
            secondary,
        }
    }

    pub fn authoritative(&self) -> &Utf8Path {
        &self.authoritative
    }

    pub fn secondary(&self) -> &[Utf8PathBuf] {
        &self.secondary
    }

    /// Load the history from the authoritative mirror. A missing file is
    /// `BaseMissing`: synchronization cannot proceed without a base.
    pub fn load(&self) -> Result<DrawHistory, StoreError> {
        if !self.authoritative.is_file() {
            return Err(StoreError::BaseMissing {
                path: self.authoritative.clone(),
            });
        }

        let content = read_to_string(&self.authoritative).map_err(|source| StoreError::Read {
            path: self.authoritative.clone(),
            source,
        })?;

        let history: DrawHistory =
            serde_json::from_str(&content).map_err(|source| StoreError::Malformed {
                path: self.authoritative.clone(),
                source,
            })?;

        debug!(
            path = %self.authoritative,
            records = history.len(),
            "loaded draw history"
        );

        Ok(history)
    }

    /// Write the full history to every mirror that already exists or is the
    /// authoritative path. Each write is atomic (same-directory temp file,
    /// then rename). A failed mirror is recorded and the remaining mirrors
    /// are still written.
    pub fn persist(&self, history: &DrawHistory) -> Vec<MirrorFailure> {
        let rendered = render(history);
        let mut failures = Vec::new();

        for path in std::iter::once(&self.authoritative).chain(&self.secondary) {
            if path != &self.authoritative && !path.is_file() {
                debug!(%path, "skipping absent secondary mirror");
                continue;
            }

            match write_atomic(path, rendered.as_bytes()) {
                Ok(()) => info!(%path, records = history.len(), "mirror written"),
                Err(error) => {
                    warn!(%path, %error, "failed to write mirror");
                    failures.push(MirrorFailure {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        failures
    }
}

/// Canonical file rendering: pretty JSON, 2-space indent, trailing newline.
/// Every mirror and every idempotent re-run produces these exact bytes.
fn render(history: &DrawHistory) -> String {
    let mut rendered =
        serde_json::to_string_pretty(history).unwrap_or_else(|_| String::from("[]"));
    rendered.push('\n');
    rendered
}

fn write_atomic(path: &Utf8Path, bytes: &[u8]) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");

    let result = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| rename(&tmp, path));

    result.map_err(|source| {
        // Best-effort cleanup; the temp file is junk either way.
        let _ignored = std::fs::remove_file(&tmp);
        StoreError::Write {
            path: path.to_owned(),
            source,
        }
    })
}
