use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, Uri},
    routing::{get, post},
    Json, Router,
};

use crate::{
    config,
    declare::{Quote, SearchResultSet},
    error::{ClassifiedError, Hop, RelayResult},
    gateway::{FetchQuoteRequest, Gateway, SearchRequest},
    logging,
    server,
    util::http::Fetch,
};

pub struct GatewayState {
    pub gateway: Gateway,
    pub default_segment: String,
    pub default_symbol: String,
}

impl GatewayState {
    pub fn from_settings(fetcher: Arc<dyn Fetch>, gateway: &config::Gateway) -> Self {
        GatewayState {
            gateway: Gateway::from_settings(fetcher, gateway),
            default_segment: gateway.default_segment.clone(),
            default_symbol: gateway.default_symbol.clone(),
        }
    }
}

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/", get(default_quote))
        .route("/fetch", post(fetch))
        .route("/search", post(search))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found(method: Method, uri: Uri) -> ClassifiedError {
    server::route_not_found(Hop::Gateway, &method, &uri)
}

async fn method_not_allowed(method: Method, uri: Uri) -> ClassifiedError {
    server::method_not_allowed(Hop::Gateway, &method, &uri)
}

/// 首頁顯示預設的指數報價
async fn default_quote(State(state): State<Arc<GatewayState>>) -> RelayResult<Json<Quote>> {
    let request = FetchQuoteRequest {
        segment: state.default_segment.clone(),
        symbol: state.default_symbol.clone(),
    };

    state.gateway.fetch_quote(&request).await.map(Json)
}

async fn fetch(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<FetchQuoteRequest>, JsonRejection>,
) -> RelayResult<Json<Quote>> {
    let Json(request) = payload.map_err(malformed)?;
    state.gateway.fetch_quote(&request).await.map(Json)
}

async fn search(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> RelayResult<Json<SearchResultSet>> {
    let Json(request) = payload.map_err(malformed)?;
    state.gateway.search(&request).await.map(Json)
}

fn malformed(why: JsonRejection) -> ClassifiedError {
    logging::warn_file_async(format!("Rejected request body: {}", why.body_text()));
    ClassifiedError::validation(Hop::Gateway, "Malformed request body")
}
