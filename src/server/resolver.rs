use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{Method, Uri},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::{
    config,
    crawler::{google_finance::QuoteResolver, nse_india::SearchResolver},
    declare::{MarketSegment, Quote, SearchResultSet},
    error::{ClassifiedError, Hop, RelayResult},
    server,
    util::http::Fetch,
};

pub struct ResolverState {
    pub quote: QuoteResolver,
    pub search: SearchResolver,
}

impl ResolverState {
    pub fn from_settings(fetcher: Arc<dyn Fetch>, upstream: &config::Upstream) -> Result<Self> {
        Ok(ResolverState {
            quote: QuoteResolver::from_settings(fetcher.clone(), upstream)?,
            search: SearchResolver::from_settings(fetcher, upstream)?,
        })
    }
}

/// `/index/{symbol}`、`/equity/{symbol}` 與 `/search/{query}`
pub fn router(state: Arc<ResolverState>) -> Router {
    Router::new()
        .route("/", get(greeting))
        .route("/index/{symbol}", get(index_quote))
        .route("/equity/{symbol}", get(equity_quote))
        .route("/search/{query}", get(search))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .with_state(state)
}

/// 依路徑判斷是哪一個 resolver 回應
fn origin(uri: &Uri) -> Hop {
    if uri.path().starts_with("/search") {
        Hop::SearchResolver
    } else {
        Hop::QuoteResolver
    }
}

async fn route_not_found(method: Method, uri: Uri) -> ClassifiedError {
    server::route_not_found(origin(&uri), &method, &uri)
}

async fn method_not_allowed(method: Method, uri: Uri) -> ClassifiedError {
    server::method_not_allowed(origin(&uri), &method, &uri)
}

async fn greeting() -> Json<Value> {
    Json(json!({ "message": "Quote relay resolver is running" }))
}

async fn index_quote(
    State(state): State<Arc<ResolverState>>,
    Path(symbol): Path<String>,
) -> RelayResult<Json<Quote>> {
    state
        .quote
        .resolve(&symbol, MarketSegment::Index)
        .await
        .map(Json)
}

async fn equity_quote(
    State(state): State<Arc<ResolverState>>,
    Path(symbol): Path<String>,
) -> RelayResult<Json<Quote>> {
    state
        .quote
        .resolve(&symbol, MarketSegment::Equity)
        .await
        .map(Json)
}

async fn search(
    State(state): State<Arc<ResolverState>>,
    Path(query): Path<String>,
) -> RelayResult<Json<SearchResultSet>> {
    state.search.resolve(&query).await.map(Json)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{crawler::fixtures, error::ErrorKind, util::http::testing::FakeFetch};

    fn app(fake: &Arc<FakeFetch>) -> Router {
        let upstream = config::Upstream::default();
        router(Arc::new(
            ResolverState::from_settings(fake.clone(), &upstream).unwrap(),
        ))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_greeting() {
        let fake = FakeFetch::status(200);
        let (status, body) = get_json(app(&fake), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_equity_quote() {
        let fake = FakeFetch::html(fixtures::TCS_QUOTE_PAGE);
        let (status, body) = get_json(app(&fake), "/equity/TCS").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Tata Consultancy Services Ltd");
        assert_eq!(body["price"], "₹3,500.00");
        assert!(fake.last_request().unwrap().url.ends_with("/TCS:NSE"));
    }

    #[tokio::test]
    async fn test_index_quote_uses_index_code() {
        let fake = FakeFetch::html(fixtures::TCS_QUOTE_PAGE);
        get_json(app(&fake), "/index/NIFTY_50").await;

        assert!(fake
            .last_request()
            .unwrap()
            .url
            .ends_with("/NIFTY_50:INDEXNSE"));
    }

    #[tokio::test]
    async fn test_parse_error_response() {
        let fake = FakeFetch::html(fixtures::QUOTE_PAGE_WITHOUT_PRICE);
        let (status, body) = get_json(app(&fake), "/equity/TCS").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let err: ClassifiedError = serde_json::from_value(body).unwrap();
        assert_eq!(err.kind, ErrorKind::ParseError);
        assert_eq!(err.origin, Hop::QuoteResolver);
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let fake = FakeFetch::status(404);
        let (status, body) = get_json(app(&fake), "/index/NOPE").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "NotFound");
    }

    #[tokio::test]
    async fn test_blank_symbol_response() {
        let fake = FakeFetch::html(fixtures::TCS_QUOTE_PAGE);
        let (status, body) = get_json(app(&fake), "/equity/%20%20").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "ValidationError");
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_search() {
        let fake = FakeFetch::html(fixtures::SEARCH_PAGE);
        let (status, body) = get_json(app(&fake), "/search/tata%20motors").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_object().unwrap().len(), 3);
        assert!(fake
            .last_request()
            .unwrap()
            .url
            .ends_with("search?q=tata%20motors&type=quotes"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_classified() {
        let fake = FakeFetch::html(fixtures::TCS_QUOTE_PAGE);

        let (status, body) = get_json(app(&fake), "/equity/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["kind"], "NotFound");
        assert_eq!(body["origin"], "quote_resolver");

        let (status, body) = get_json(app(&fake), "/search/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["origin"], "search_resolver");

        let (status, _) = get_json(app(&fake), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_wrong_method_is_classified() {
        let fake = FakeFetch::html(fixtures::TCS_QUOTE_PAGE);
        let response = app(&fake)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/equity/TCS")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let err: ClassifiedError = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert_eq!(fake.calls(), 0);
    }
}
