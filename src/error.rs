use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// 錯誤分類
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ErrorKind {
    /// 上游明確回報查無此代號
    NotFound,
    /// 請求格式錯誤，未發出任何網路請求
    ValidationError,
    /// 上游回 200 但頁面結構已變更
    ParseError,
    /// 上游非 404 的錯誤狀態或連線失敗
    UpstreamUnavailable,
    /// 無法歸類
    Unknown,
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ParseError | ErrorKind::UpstreamUnavailable | ErrorKind::Unknown => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// The hop that assigned the kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Hop {
    Gateway,
    QuoteResolver,
    SearchResolver,
}

/// A failure passed between hops as data.
///
/// `message` is a stable, user-facing sentence; status codes, transport
/// causes and selector details are written to the log instead.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind} from {origin}: {message}")]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    pub message: String,
    pub origin: Hop,
}

impl ClassifiedError {
    pub fn new(kind: ErrorKind, origin: Hop, message: impl Into<String>) -> Self {
        ClassifiedError {
            kind,
            message: message.into(),
            origin,
        }
    }

    pub fn validation(origin: Hop, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, origin, message)
    }

    pub fn not_found(origin: Hop, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, origin, message)
    }

    pub fn parse(origin: Hop, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, origin, message)
    }

    pub fn unavailable(origin: Hop, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamUnavailable, origin, message)
    }

    pub fn unknown(origin: Hop, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, origin, message)
    }
}

impl IntoResponse for ClassifiedError {
    fn into_response(self) -> Response {
        (self.kind.status_code(), Json(self)).into_response()
    }
}

pub type RelayResult<T> = Result<T, ClassifiedError>;
