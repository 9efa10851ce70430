//! Upstream payload decoding shared by the rendered and direct backends.
//!
//! The round-lookup endpoint answers with a flat JSON object carrying a
//! `returnValue` discriminator, the round number, six main numbers and the
//! bonus number. Anything other than `"success"` means the round has not
//! been drawn yet.

use lottosync_primitives::{DrawRecord, Round};
use serde::Deserialize;

use crate::outcome::{FetchOutcome, RoundRef};

const SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
pub struct DrawPayload {
    #[serde(rename = "returnValue")]
    return_value: String,

    #[serde(rename = "drwNo")]
    round: Option<Round>,

    #[serde(rename = "drwtNo1")]
    no1: Option<u8>,
    #[serde(rename = "drwtNo2")]
    no2: Option<u8>,
    #[serde(rename = "drwtNo3")]
    no3: Option<u8>,
    #[serde(rename = "drwtNo4")]
    no4: Option<u8>,
    #[serde(rename = "drwtNo5")]
    no5: Option<u8>,
    #[serde(rename = "drwtNo6")]
    no6: Option<u8>,

    #[serde(rename = "bnusNo")]
    bonus: Option<u8>,
}

/// Decode a raw payload body into an outcome for the requested round.
pub fn decode(body: &str, requested: RoundRef) -> FetchOutcome {
    let payload: DrawPayload = match serde_json::from_str(body) {
        Ok(payload) => payload,
        Err(err) => return FetchOutcome::malformed(err.to_string()),
    };

    if payload.return_value != SUCCESS {
        return FetchOutcome::NotYetDrawn;
    }

    let (Some(round), Some(bonus)) = (payload.round, payload.bonus) else {
        return FetchOutcome::malformed("success payload missing round or bonus");
    };

    let numbers = match [
        payload.no1,
        payload.no2,
        payload.no3,
        payload.no4,
        payload.no5,
        payload.no6,
    ]
    .into_iter()
    .collect::<Option<Vec<_>>>()
    {
        Some(numbers) => <[u8; 6]>::try_from(numbers).unwrap_or_default(),
        None => return FetchOutcome::malformed("success payload missing main numbers"),
    };

    if let RoundRef::Specific(want) = requested {
        if round != want {
            return FetchOutcome::malformed(format!(
                "asked for round {want}, payload carries round {round}"
            ));
        }
    }

    match DrawRecord::new(round, numbers, bonus) {
        Ok(record) => FetchOutcome::Found(record),
        Err(err) => FetchOutcome::invalid(err),
    }
}
