use std::{sync::Arc, time::Duration};

use anyhow::Result;
use concat_string::concat_string;
use reqwest::header::HeaderMap;

use crate::{
    config,
    crawler::{
        classify_outcome,
        extract::extract_search,
        nse_india::SITE,
        profile::{SearchProfile, NSE_INDIA_SEARCH_V1},
    },
    declare::{RequestState, SearchResultSet},
    error::{ClassifiedError, Hop, RelayResult},
    util::{
        http::{self, Fetch, FetchRequest},
        trace::RequestTrace,
    },
};

const NOT_FOUND_MESSAGE: &str = "Search endpoint not found";
const PARSE_MESSAGE: &str =
    "Failed to parse response from NSE India. HTML structure might have changed.";

/// Resolves a free-text query into `company => symbol` pairs.
pub struct SearchResolver {
    fetcher: Arc<dyn Fetch>,
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
    profile: SearchProfile,
}

impl SearchResolver {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        base_url: impl Into<String>,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Self {
        SearchResolver {
            fetcher,
            base_url: base_url.into(),
            headers,
            timeout,
            profile: NSE_INDIA_SEARCH_V1,
        }
    }

    /// 搜尋頁需要像瀏覽器的標頭，否則會被當成機器人擋下
    pub fn from_settings(fetcher: Arc<dyn Fetch>, upstream: &config::Upstream) -> Result<Self> {
        let headers = http::build_headers(
            &upstream.search_user_agent,
            &upstream.search_accept_language,
        )?;

        Ok(Self::new(
            fetcher,
            upstream.search_base_url.clone(),
            headers,
            upstream.timeout(),
        ))
    }

    pub fn url(&self, query: &str) -> String {
        concat_string!(
            self.base_url,
            "search?q=",
            urlencoding::encode(query),
            "&type=quotes"
        )
    }

    /// Issues exactly one request. No matching blocks is an empty, successful
    /// result rather than `NotFound`.
    pub async fn resolve(&self, query: &str) -> RelayResult<SearchResultSet> {
        let mut trace = RequestTrace::new(format!("search {}", query));
        trace.advance(RequestState::Validating);

        let query = query.trim();
        if query.is_empty() {
            return Err(trace.fail(
                ClassifiedError::validation(Hop::SearchResolver, "Query must not be empty"),
                "blank query",
            ));
        }

        trace.advance(RequestState::Fetching);
        let url = self.url(query);
        let request =
            FetchRequest::new(url.as_str(), self.timeout).with_headers(self.headers.clone());
        let outcome = self.fetcher.fetch(request).await;
        let html = classify_outcome(outcome, Hop::SearchResolver, SITE, NOT_FOUND_MESSAGE)
            .map_err(|(err, detail)| trace.fail(err, &format!("{} {}", url, detail)))?;

        trace.advance(RequestState::Extracting);
        match extract_search(&html, &self.profile) {
            Ok(result) => {
                trace.succeed();
                Ok(result)
            }
            Err(why) => Err(trace.fail(
                ClassifiedError::parse(Hop::SearchResolver, PARSE_MESSAGE),
                &format!("{} {}", url, why),
            )),
        }
    }
}
