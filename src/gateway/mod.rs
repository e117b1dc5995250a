//! # 前端閘道
//!
//! 接收使用者的報價/搜尋請求，先驗證市場別，再轉送到 resolver，
//! 並把 resolver 已分類好的錯誤原封不動地轉回給使用者。

use std::{borrow::Cow, str::FromStr, sync::Arc, time::Duration};

use concat_string::concat_string;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    config,
    declare::{MarketSegment, Quote, RequestState, SearchResultSet},
    error::{ClassifiedError, Hop, RelayResult},
    util::{
        http::{Fetch, FetchRequest, UpstreamOutcome},
        trace::RequestTrace,
    },
};

/// `POST /fetch` body. `exchange` is accepted for older clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchQuoteRequest {
    #[serde(alias = "exchange")]
    pub segment: String,
    pub symbol: String,
}

/// `POST /search` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(alias = "search_str")]
    pub query: String,
}

pub struct Gateway {
    fetcher: Arc<dyn Fetch>,
    quote_service_url: String,
    search_service_url: String,
    timeout: Duration,
}

impl Gateway {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        quote_service_url: &str,
        search_service_url: &str,
        timeout: Duration,
    ) -> Self {
        Gateway {
            fetcher,
            quote_service_url: quote_service_url.trim_end_matches('/').to_string(),
            search_service_url: search_service_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_settings(fetcher: Arc<dyn Fetch>, gateway: &config::Gateway) -> Self {
        Self::new(
            fetcher,
            &gateway.quote_service_url,
            &gateway.search_service_url,
            gateway.timeout(),
        )
    }

    /// 驗證市場別與代號後轉送至 quote resolver
    ///
    /// An unknown segment, a blank symbol or a dot-segment symbol never
    /// reaches the resolver.
    pub async fn fetch_quote(&self, request: &FetchQuoteRequest) -> RelayResult<Quote> {
        let mut trace = RequestTrace::new(format!(
            "gateway fetch {}/{}",
            request.segment, request.symbol
        ));
        trace.advance(RequestState::Validating);

        let segment = match MarketSegment::from_str(request.segment.trim()) {
            Ok(segment) => segment,
            Err(_) => {
                return Err(trace.fail(
                    ClassifiedError::validation(Hop::Gateway, "Invalid segment"),
                    &format!("unknown segment '{}'", request.segment),
                ))
            }
        };

        let symbol = request.symbol.trim();
        if symbol.is_empty() {
            return Err(trace.fail(
                ClassifiedError::validation(Hop::Gateway, "Symbol must not be empty"),
                "blank symbol",
            ));
        }

        let Some(symbol) = path_segment(symbol) else {
            return Err(trace.fail(
                ClassifiedError::validation(Hop::Gateway, "Invalid symbol"),
                &format!("dot segment symbol '{}'", symbol),
            ));
        };

        trace.advance(RequestState::Fetching);
        let url = concat_string!(
            self.quote_service_url,
            "/",
            segment.route(),
            "/",
            symbol
        );

        self.relay(&url, &mut trace).await
    }

    /// 轉送至 search resolver
    pub async fn search(&self, request: &SearchRequest) -> RelayResult<SearchResultSet> {
        let mut trace = RequestTrace::new(format!("gateway search {}", request.query));
        trace.advance(RequestState::Validating);

        let query = request.query.trim();
        if query.is_empty() {
            return Err(trace.fail(
                ClassifiedError::validation(Hop::Gateway, "Query must not be empty"),
                "blank query",
            ));
        }

        let Some(query) = path_segment(query) else {
            return Err(trace.fail(
                ClassifiedError::validation(Hop::Gateway, "Invalid query"),
                &format!("dot segment query '{}'", query),
            ));
        };

        trace.advance(RequestState::Fetching);
        let url = concat_string!(self.search_service_url, "/search/", query);

        self.relay(&url, &mut trace).await
    }

    async fn relay<T: DeserializeOwned>(&self, url: &str, trace: &mut RequestTrace) -> RelayResult<T> {
        let outcome = self.fetcher.fetch(FetchRequest::new(url, self.timeout)).await;

        match outcome {
            UpstreamOutcome::Raw { body, .. } => {
                trace.advance(RequestState::Extracting);
                match serde_json::from_str::<T>(&body) {
                    Ok(payload) => {
                        trace.succeed();
                        Ok(payload)
                    }
                    Err(why) => Err(trace.fail(
                        ClassifiedError::unknown(Hop::Gateway, "Unexpected response from resolver"),
                        &format!("{} undecodable payload: {}", url, why),
                    )),
                }
            }
            UpstreamOutcome::NotFound { body } => {
                let (err, detail) = reclassify(404, &body);
                Err(trace.fail(err, &format!("{} {}", url, detail)))
            }
            UpstreamOutcome::UpstreamError { status, body } => {
                let (err, detail) = reclassify(status, &body);
                Err(trace.fail(err, &format!("{} {}", url, detail)))
            }
            UpstreamOutcome::TransportFailure(cause) => Err(trace.fail(
                ClassifiedError::unavailable(Hop::Gateway, "Request to resolver failed"),
                &format!("{} unreachable: {}", url, cause),
            )),
        }
    }
}

/// 將使用者輸入編碼成單一路徑片段
///
/// `.` and `..` are dot segments: URL normalization removes them (even when
/// percent-encoded as `%2E`) and the request would land on another route.
/// `None` means the value cannot be sent as a path segment.
fn path_segment(value: &str) -> Option<Cow<'_, str>> {
    match value {
        "." | ".." => None,
        _ => Some(urlencoding::encode(value)),
    }
}

/// Reads the resolver's classified error out of an error response.
///
/// The kind assigned by the resolver is kept verbatim. Only when the body is
/// not a classified error does the status code decide.
fn reclassify(status: u16, body: &str) -> (ClassifiedError, String) {
    if let Ok(err) = serde_json::from_str::<ClassifiedError>(body) {
        return (err, format!("resolver answered {}", status));
    }

    let err = match status {
        404 => ClassifiedError::not_found(Hop::Gateway, "Symbol not found"),
        400 => ClassifiedError::validation(Hop::Gateway, "Invalid request"),
        500..=599 => {
            ClassifiedError::unavailable(Hop::Gateway, "Error fetching data from the resolver")
        }
        _ => ClassifiedError::unknown(Hop::Gateway, "An unexpected error occurred"),
    };

    (
        err,
        format!("resolver answered {} without a classified body", status),
    )
}
