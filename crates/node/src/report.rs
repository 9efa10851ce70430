use lottosync_client::FetchError;
use lottosync_primitives::Round;
use lottosync_store::MirrorFailure;

/// How the extension loop stopped.
///
/// "Not yet drawn" is the upstream's own word for it; "undetermined" means
/// every strategy failed on that round this run, which may hide rounds
/// that actually exist. The two are deliberately distinguished so a
/// transient outage is never silently reported as being up to date.
#[derive(Clone, Debug)]
pub enum Boundary {
    NotYetDrawn(Round),
    Undetermined { round: Round, error: FetchError },
}

impl Boundary {
    pub const fn round(&self) -> Round {
        match self {
            Self::NotYetDrawn(round) | Self::Undetermined { round, .. } => *round,
        }
    }

    pub const fn is_undetermined(&self) -> bool {
        matches!(self, Self::Undetermined { .. })
    }
}

/// Result of one synchronization run.
///
/// A run with zero new rounds is a successful no-op, not an error;
/// callers that care about change inspect [`SyncReport::added`].
#[derive(Debug)]
pub struct SyncReport {
    /// Latest round persisted before the run, if any.
    pub base_round: Option<Round>,

    /// Rounds appended by this run, ascending.
    pub new_rounds: Vec<Round>,

    /// Latest round persisted after the run.
    pub latest_round: Option<Round>,

    pub boundary: Boundary,

    /// Mirrors that could not be written. Empty for a no-op run.
    pub mirror_failures: Vec<MirrorFailure>,
}

impl SyncReport {
    pub fn added(&self) -> usize {
        self.new_rounds.len()
    }

    /// True when nothing was fetched and nothing was written.
    pub fn is_noop(&self) -> bool {
        self.new_rounds.is_empty()
    }
}
