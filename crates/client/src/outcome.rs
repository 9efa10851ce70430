use core::fmt;

use lottosync_primitives::{DrawRecord, DrawRecordError, Round};
use thiserror::Error;

/// Which round a strategy should retrieve: an explicit round number, or
/// whatever the upstream currently considers its latest draw.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundRef {
    Specific(Round),
    Latest,
}

impl fmt::Display for RoundRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Specific(round) => write!(f, "round {round}"),
            Self::Latest => f.write_str("latest round"),
        }
    }
}

#[derive(Clone, Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("invalid draw data: {0}")]
    Invalid(#[from] DrawRecordError),

    #[error("renderer exited unsuccessfully: {0}")]
    Renderer(String),

    #[error("required capability unavailable: {0}")]
    CapabilityMissing(String),

    #[error("no fetch strategies configured")]
    NoStrategy,
}

/// Result of one strategy invocation.
///
/// `Found` and `NotYetDrawn` are definitive: they reflect real upstream
/// state and legitimately end retry loops and fallback chains. The two
/// error variants reflect fetch trouble, not draw state — `Transient` is
/// worth retrying, `Fatal` means the strategy cannot succeed this run.
#[derive(Clone, Debug)]
pub enum FetchOutcome {
    Found(DrawRecord),
    NotYetDrawn,
    Transient(FetchError),
    Fatal(FetchError),
}

impl FetchOutcome {
    pub const fn is_definitive(&self) -> bool {
        matches!(self, Self::Found(_) | Self::NotYetDrawn)
    }

    pub fn invalid(err: DrawRecordError) -> Self {
        Self::Transient(FetchError::Invalid(err))
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Transient(FetchError::Malformed(reason.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitiveness() {
        let record = DrawRecord::new(1, [1, 2, 3, 4, 5, 6], 7).unwrap();
        assert!(FetchOutcome::Found(record).is_definitive());
        assert!(FetchOutcome::NotYetDrawn.is_definitive());
        assert!(!FetchOutcome::Transient(FetchError::Status(429)).is_definitive());
        assert!(!FetchOutcome::Fatal(FetchError::NoStrategy).is_definitive());
    }

    #[test]
    fn round_ref_display() {
        assert_eq!(RoundRef::Specific(101).to_string(), "round 101");
        assert_eq!(RoundRef::Latest.to_string(), "latest round");
    }
}
