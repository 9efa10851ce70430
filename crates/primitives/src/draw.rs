use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sequential identifier of a single drawing event. Starts at 1 and
/// increases strictly by one, never reused.
pub type Round = u32;

/// Lowest and highest ball values in a 6/45 draw.
pub const BALL_MIN: u8 = 1;
pub const BALL_MAX: u8 = 45;

/// One drawn round: six distinct main numbers plus a bonus number.
///
/// Immutable after construction. The only way to obtain one is through
/// [`DrawRecord::new`], which sorts the main numbers ascending and enforces
/// the 6/45 invariants, so a `DrawRecord` in hand is always well-formed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDrawRecord", into = "RawDrawRecord")]
pub struct DrawRecord {
    round: Round,
    numbers: [u8; 6],
    bonus: u8,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DrawRecordError {
    #[error("round must be positive")]
    ZeroRound,

    #[error("number {0} is outside {BALL_MIN}..={BALL_MAX}")]
    OutOfRange(u8),

    #[error("main numbers contain duplicate {0}")]
    DuplicateNumber(u8),

    #[error("bonus {0} collides with a main number")]
    BonusCollision(u8),
}

impl DrawRecord {
    /// Validate and construct a record. `numbers` may arrive in any order;
    /// they are sorted ascending before validation.
    pub fn new(round: Round, mut numbers: [u8; 6], bonus: u8) -> Result<Self, DrawRecordError> {
        if round == 0 {
            return Err(DrawRecordError::ZeroRound);
        }

        numbers.sort_unstable();

        for &n in numbers.iter().chain([&bonus]) {
            if !(BALL_MIN..=BALL_MAX).contains(&n) {
                return Err(DrawRecordError::OutOfRange(n));
            }
        }

        for pair in numbers.windows(2) {
            if pair[0] == pair[1] {
                return Err(DrawRecordError::DuplicateNumber(pair[0]));
            }
        }

        if numbers.contains(&bonus) {
            return Err(DrawRecordError::BonusCollision(bonus));
        }

        Ok(Self {
            round,
            numbers,
            bonus,
        })
    }

    pub const fn round(&self) -> Round {
        self.round
    }

    /// Main numbers, always sorted ascending.
    pub const fn numbers(&self) -> &[u8; 6] {
        &self.numbers
    }

    pub const fn bonus(&self) -> u8 {
        self.bonus
    }
}

/// Wire/file shape of a record: exactly `round`, `numbers`, `bonus`.
/// Deserialization funnels through [`DrawRecord::new`] so malformed
/// persisted or upstream data is rejected at the boundary.
#[derive(Debug, Serialize, Deserialize)]
struct RawDrawRecord {
    round: Round,
    numbers: [u8; 6],
    bonus: u8,
}

impl TryFrom<RawDrawRecord> for DrawRecord {
    type Error = DrawRecordError;

    fn try_from(raw: RawDrawRecord) -> Result<Self, Self::Error> {
        Self::new(raw.round, raw.numbers, raw.bonus)
    }
}

impl From<DrawRecord> for RawDrawRecord {
    fn from(record: DrawRecord) -> Self {
        Self {
            round: record.round,
            numbers: record.numbers,
            bonus: record.bonus,
        }
    }
}
