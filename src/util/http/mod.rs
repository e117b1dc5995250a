use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT},
    Client, StatusCode,
};

use crate::{logging::Logger, util};

pub mod element;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

/// One outbound GET: where to go, which headers to send and how long to wait.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        FetchRequest {
            url: url.into(),
            headers: HeaderMap::new(),
            timeout,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Headers a call site sends to its site. Empty values are left out, so a
/// resolver that needs no browser disguise passes empty strings.
pub fn build_headers(user_agent: &str, accept_language: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    if !user_agent.is_empty() {
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
    }

    if !accept_language.is_empty() {
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_str(accept_language)?);
    }

    Ok(headers)
}

/// 單次 HTTP 往返的結果
///
/// HTTP-level failures are values, not errors: the caller decides what a 404
/// or a 503 means for its own hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    /// 2xx and the body that came with it.
    Raw { status: u16, body: String },
    NotFound { body: String },
    /// Any other status.
    UpstreamError { status: u16, body: String },
    /// DNS, connect, timeout or body read failure.
    TransportFailure(String),
}

impl UpstreamOutcome {
    pub fn from_status(status: u16, body: String) -> Self {
        match StatusCode::from_u16(status) {
            Ok(code) if code.is_success() => UpstreamOutcome::Raw { status, body },
            Ok(code) if code == StatusCode::NOT_FOUND => UpstreamOutcome::NotFound { body },
            _ => UpstreamOutcome::UpstreamError { status, body },
        }
    }
}

/// The client handle resolvers and the gateway are built with. The owner
/// decides its lifetime; `main` shares one across every request.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> UpstreamOutcome;
}

/// [`Fetch`] over a pooled reqwest client.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    /// Builds the underlying reqwest client.
    ///
    /// The per-call timeout comes from each [`FetchRequest`]; only the connect
    /// timeout is fixed here. Redirects follow reqwest's default policy.
    pub fn new(connect_timeout: Duration) -> Result<Self> {
        util::ensure_rustls_crypto_provider();

        let client = Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(connect_timeout)
            // ===== TCP 優化 =====
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // ===== 連接池 =====
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))?;

        Ok(UpstreamClient { client })
    }
}

#[async_trait]
impl Fetch for UpstreamClient {
    async fn fetch(&self, request: FetchRequest) -> UpstreamOutcome {
        let visit_log = format!("GET:{}", request.url);
        let start = Instant::now();
        let res = self
            .client
            .get(&request.url)
            .headers(request.headers)
            .timeout(request.timeout)
            .send()
            .await;
        let elapsed = start.elapsed().as_millis();

        let response = match res {
            Ok(response) => response,
            Err(why) => {
                LOGGER.error(format!("{} failed because {:?}. {} ms", visit_log, why, elapsed));
                return UpstreamOutcome::TransportFailure(describe(&why));
            }
        };

        let status = response.status();
        LOGGER.info(format!("{} {} {} ms", visit_log, status.as_u16(), elapsed));

        match response.text().await {
            Ok(body) => UpstreamOutcome::from_status(status.as_u16(), body),
            Err(why) if status.is_success() => {
                LOGGER.error(format!("{} body read failed because {:?}", visit_log, why));
                UpstreamOutcome::TransportFailure(describe(&why))
            }
            // 錯誤狀態的內容讀不到時仍依狀態碼歸類
            Err(_) => UpstreamOutcome::from_status(status.as_u16(), String::new()),
        }
    }
}

fn describe(why: &reqwest::Error) -> String {
    if why.is_timeout() {
        "timeout".to_string()
    } else if why.is_connect() {
        "connect".to_string()
    } else if why.is_body() || why.is_decode() {
        "body".to_string()
    } else {
        "request".to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(
            UpstreamOutcome::from_status(200, "<html/>".to_string()),
            UpstreamOutcome::Raw {
                status: 200,
                body: "<html/>".to_string()
            }
        );
        assert_eq!(
            UpstreamOutcome::from_status(404, String::new()),
            UpstreamOutcome::NotFound {
                body: String::new()
            }
        );
        assert_eq!(
            UpstreamOutcome::from_status(503, "busy".to_string()),
            UpstreamOutcome::UpstreamError {
                status: 503,
                body: "busy".to_string()
            }
        );
        assert!(matches!(
            UpstreamOutcome::from_status(302, String::new()),
            UpstreamOutcome::UpstreamError { status: 302, .. }
        ));
    }

    #[test]
    fn test_build_headers() {
        let headers = build_headers("Mozilla/5.0", "en-US,en").unwrap();
        assert_eq!(headers.get(USER_AGENT).unwrap(), "Mozilla/5.0");
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "en-US,en");

        assert!(build_headers("", "").unwrap().is_empty());
        assert!(build_headers("bad\nvalue", "").is_err());
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let client = UpstreamClient::new(Duration::from_secs(1)).unwrap();
        // 保留埠，沒有任何服務在聽
        let outcome = client
            .fetch(FetchRequest::new(
                "http://127.0.0.1:9/unreachable",
                Duration::from_secs(2),
            ))
            .await;

        assert!(matches!(outcome, UpstreamOutcome::TransportFailure(_)));
    }
}
