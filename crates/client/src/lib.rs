//! Fetch backends for upstream draw results.
//!
//! Everything here funnels through one capability interface,
//! [`FetchStrategy`]: given a round reference, attempt to retrieve one
//! draw record. Concrete backends (browser-rendered fetch, direct HTTP
//! with spoofed headers, third-party search-page scrape) are
//! interchangeable; [`RetryController`] adds bounded retry with
//! exponential backoff and [`StrategyChain`] orders backends into a
//! fallback chain.

pub mod chain;
pub mod outcome;
pub mod payload;
pub mod retry;
pub mod strategy;
pub mod testing;

mod direct;
mod rendered;
mod scrape;

pub use chain::StrategyChain;
pub use direct::DirectApiStrategy;
pub use outcome::{FetchError, FetchOutcome, RoundRef};
pub use rendered::RenderedStrategy;
pub use retry::RetryController;
pub use scrape::SearchScrapeStrategy;
pub use strategy::FetchStrategy;
