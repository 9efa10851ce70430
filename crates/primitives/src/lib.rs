//! Core data model for lottosync: validated draw records and the ordered
//! draw history they live in.

pub mod draw;
pub mod history;

pub use draw::{DrawRecord, DrawRecordError, Round, BALL_MAX, BALL_MIN};
pub use history::{DrawHistory, HistoryError};
