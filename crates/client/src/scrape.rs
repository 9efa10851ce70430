use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use lottosync_primitives::draw::{BALL_MAX, BALL_MIN};
use lottosync_primitives::{DrawRecord, Round};

use crate::outcome::{FetchError, FetchOutcome, RoundRef};
use crate::strategy::FetchStrategy;

const SCRAPE_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Best-effort scrape of a third-party search results page.
///
/// Queries the page for "N회 로또 당첨번호", anchors on the round marker in
/// the rendered text and collects the first seven in-range ball values
/// after it (six mains plus the bonus). Deliberately fragile: every miss
/// is a `Transient` outcome and nothing here leaks past the strategy
/// interface.
#[derive(Clone, Debug)]
pub struct SearchScrapeStrategy {
    client: Client,
    endpoint: Url,
}

impl SearchScrapeStrategy {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    fn search_url(&self, round: RoundRef) -> Url {
        let query = match round {
            RoundRef::Specific(round) => format!("{round}회 로또 당첨번호"),
            RoundRef::Latest => "로또 당첨번호".to_owned(),
        };

        let mut url = self.endpoint.clone();
        let _ = url.query_pairs_mut().append_pair("query", &query);
        url
    }
}

#[async_trait]
impl FetchStrategy for SearchScrapeStrategy {
    fn name(&self) -> &'static str {
        "search-scrape"
    }

    async fn attempt(&self, round: RoundRef) -> FetchOutcome {
        let url = self.search_url(round);

        debug!(%url, %round, "scraping search page");

        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, SCRAPE_USER_AGENT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return FetchOutcome::Transient(FetchError::Transport(err.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Transient(FetchError::Status(status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return FetchOutcome::Transient(FetchError::Transport(err.to_string())),
        };

        extract_draw(&body, round)
    }
}

/// Pull a draw out of rendered page text. Exposed to the module for tests;
/// the heuristics are the interesting (and breakable) part.
fn extract_draw(html: &str, requested: RoundRef) -> FetchOutcome {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").unwrap_or_else(|_| unreachable!());

    let Some(body) = document.select(&body_selector).next() else {
        return FetchOutcome::malformed("page has no body element");
    };

    let tokens: Vec<&str> = body.text().flat_map(str::split_whitespace).collect();

    let (round, anchor) = match requested {
        RoundRef::Specific(round) => {
            // Exact marker match only. A substring test would let a page
            // about round 1186 answer a request for round 86.
            match tokens.iter().position(|token| {
                token
                    .strip_suffix('회')
                    .and_then(|prefix| prefix.parse::<Round>().ok())
                    == Some(round)
            }) {
                Some(idx) => (round, idx),
                None => {
                    return FetchOutcome::malformed(format!("round marker {round}회 not on page"))
                }
            }
        }
        RoundRef::Latest => {
            // First "N회" token on the page names the latest draw.
            match tokens.iter().enumerate().find_map(|(idx, token)| {
                token
                    .strip_suffix('회')
                    .and_then(|prefix| prefix.parse::<Round>().ok())
                    .map(|round| (round, idx))
            }) {
                Some(found) => found,
                None => return FetchOutcome::malformed("no round marker on page"),
            }
        }
    };

    let mut balls = Vec::with_capacity(7);
    for token in &tokens[anchor + 1..] {
        if let Ok(value) = token.parse::<u8>() {
            if (BALL_MIN..=BALL_MAX).contains(&value) {
                balls.push(value);
                if balls.len() == 7 {
                    break;
                }
            }
        }
    }

    if balls.len() < 7 {
        return FetchOutcome::malformed(format!(
            "found {} ball values after round marker, need 7",
            balls.len()
        ));
    }

    let numbers = <[u8; 6]>::try_from(&balls[..6]).unwrap_or_default();

    match DrawRecord::new(round, numbers, balls[6]) {
        Ok(record) => FetchOutcome::Found(record),
        Err(err) => FetchOutcome::invalid(err),
    }
}
