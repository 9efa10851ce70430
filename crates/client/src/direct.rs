use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::outcome::{FetchError, FetchOutcome, RoundRef};
use crate::payload;
use crate::strategy::FetchStrategy;

// The upstream drops requests that look like scripts, so present as an
// ordinary desktop browser.
const SPOOFED_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Direct HTTP fetch against the official round-lookup endpoint, with
/// spoofed browser headers. Omitting the round parameter asks for the
/// latest draw.
#[derive(Clone, Debug)]
pub struct DirectApiStrategy {
    client: Client,
    endpoint: Url,
}

impl DirectApiStrategy {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    fn lookup_url(&self, round: RoundRef) -> Url {
        let mut url = self.endpoint.clone();

        {
            let mut query = url.query_pairs_mut();
            let _ = query.append_pair("method", "getLottoNumber");

            if let RoundRef::Specific(round) = round {
                let _ = query.append_pair("drwNo", &round.to_string());
            }
        }

        url
    }
}

#[async_trait]
impl FetchStrategy for DirectApiStrategy {
    fn name(&self) -> &'static str {
        "direct-api"
    }

    async fn attempt(&self, round: RoundRef) -> FetchOutcome {
        let url = self.lookup_url(round);

        debug!(%url, %round, "direct api lookup");

        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, SPOOFED_USER_AGENT)
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9,en;q=0.8")
            .header(REFERER, self.endpoint.as_str())
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

        match response.text().await {
            Ok(body) => payload::decode(&body, round),
            Err(err) => FetchOutcome::Transient(FetchError::Transport(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn strategy(server: &MockServer) -> DirectApiStrategy {
        let endpoint = Url::parse(&format!("{}/common.do", server.uri())).unwrap();
        DirectApiStrategy::new(Client::new(), endpoint)
    }

    #[tokio::test]
    async fn found_round() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/common.do"))
            .and(query_param("method", "getLottoNumber"))
            .and(query_param("drwNo", "101"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"returnValue":"success","drwNo":101,
                    "drwtNo1":3,"drwtNo2":7,"drwtNo3":12,
                    "drwtNo4":19,"drwtNo5":28,"drwtNo6":41,"bnusNo":5}"#,
            ))
            .mount(&server)
            .await;

        let outcome = strategy(&server).attempt(RoundRef::Specific(101)).await;
        let FetchOutcome::Found(record) = outcome else {
            panic!("expected Found, got {outcome:?}");
        };
        assert_eq!(record.round(), 101);
    }

    #[tokio::test]
    async fn fail_payload_is_not_yet_drawn() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/common.do"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"returnValue":"fail"}"#))
            .mount(&server)
            .await;

        let outcome = strategy(&server).attempt(RoundRef::Specific(9999)).await;
        assert!(matches!(outcome, FetchOutcome::NotYetDrawn));
    }

    #[tokio::test]
    async fn rate_limit_status_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/common.do"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let outcome = strategy(&server).attempt(RoundRef::Specific(5)).await;
        assert!(matches!(
            outcome,
            FetchOutcome::Transient(FetchError::Status(429))
        ));
    }

    #[tokio::test]
    async fn bot_block_html_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/common.do"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html>access denied</html>"),
            )
            .mount(&server)
            .await;

        let outcome = strategy(&server).attempt(RoundRef::Specific(5)).await;
        assert!(matches!(outcome, FetchOutcome::Transient(_)));
    }

    #[tokio::test]
    async fn latest_omits_round_parameter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/common.do"))
            .and(query_param("method", "getLottoNumber"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"returnValue":"success","drwNo":1186,
                    "drwtNo1":2,"drwtNo2":9,"drwtNo3":16,
                    "drwtNo4":25,"drwtNo5":32,"drwtNo6":45,"bnusNo":1}"#,
            ))
            .mount(&server)
            .await;

        let outcome = strategy(&server).attempt(RoundRef::Latest).await;
        let FetchOutcome::Found(record) = outcome else {
            panic!("expected Found, got {outcome:?}");
        };
        assert_eq!(record.round(), 1186);
    }
}
