use std::{sync::Arc, time::Duration};

use anyhow::Result;
use concat_string::concat_string;
use reqwest::header::HeaderMap;

use crate::{
    config,
    crawler::{
        classify_outcome,
        extract::extract_quote,
        google_finance::SITE,
        profile::{QuoteProfile, GOOGLE_FINANCE_QUOTE_V1},
    },
    declare::{MarketSegment, Quote, RequestState},
    error::{ClassifiedError, Hop, RelayResult},
    util::{
        http::{self, Fetch, FetchRequest},
        trace::RequestTrace,
    },
};

const NOT_FOUND_MESSAGE: &str = "Symbol not found";
const PARSE_MESSAGE: &str =
    "Failed to parse response from Google Finance. HTML structure might have changed.";

/// Resolves `(symbol, segment)` into a [`Quote`] from the quote site.
pub struct QuoteResolver {
    fetcher: Arc<dyn Fetch>,
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
    profile: QuoteProfile,
}

impl QuoteResolver {
    pub fn new(fetcher: Arc<dyn Fetch>, base_url: impl Into<String>, timeout: Duration) -> Self {
        QuoteResolver {
            fetcher,
            base_url: base_url.into(),
            headers: HeaderMap::new(),
            timeout,
            profile: GOOGLE_FINANCE_QUOTE_V1,
        }
    }

    pub fn from_settings(fetcher: Arc<dyn Fetch>, upstream: &config::Upstream) -> Result<Self> {
        let headers = http::build_headers(&upstream.quote_user_agent, "")?;

        Ok(
            Self::new(fetcher, upstream.quote_base_url.clone(), upstream.timeout())
                .with_headers(headers),
        )
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// `base + symbol + ":" + code`, with the symbol percent-encoded.
    pub fn url(&self, symbol: &str, segment: MarketSegment) -> String {
        concat_string!(
            self.base_url,
            urlencoding::encode(symbol),
            ":",
            segment.code()
        )
    }

    /// 取得指定代號的即時報價
    ///
    /// A blank symbol is rejected before any request is sent. The site's 404
    /// becomes `NotFound`, any other failure to get the page becomes
    /// `UpstreamUnavailable`, and a page the profile cannot read becomes
    /// `ParseError`.
    pub async fn resolve(&self, symbol: &str, segment: MarketSegment) -> RelayResult<Quote> {
        let mut trace = RequestTrace::new(format!("quote {}:{}", symbol, segment));
        trace.advance(RequestState::Validating);

        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(trace.fail(
                ClassifiedError::validation(Hop::QuoteResolver, "Symbol must not be empty"),
                "blank symbol",
            ));
        }

        trace.advance(RequestState::Fetching);
        let url = self.url(symbol, segment);
        let request =
            FetchRequest::new(url.as_str(), self.timeout).with_headers(self.headers.clone());
        let outcome = self.fetcher.fetch(request).await;
        let html = classify_outcome(outcome, Hop::QuoteResolver, SITE, NOT_FOUND_MESSAGE)
            .map_err(|(err, detail)| trace.fail(err, &format!("{} {}", url, detail)))?;

        trace.advance(RequestState::Extracting);
        match extract_quote(&html, &self.profile) {
            Ok(quote) => {
                trace.succeed();
                Ok(quote)
            }
            Err(why) => Err(trace.fail(
                ClassifiedError::parse(Hop::QuoteResolver, PARSE_MESSAGE),
                &format!("{} {}", url, why),
            )),
        }
    }
}
