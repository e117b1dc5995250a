//! # HTTP 服務
//!
//! `resolver` 與 `gateway` 各自是一組 axum router，依 `system.role`
//! 決定同一個行程要啟動哪些。

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    http::{Method, Uri},
    Router,
};
use tokio::net::TcpListener;

use crate::{
    error::{ClassifiedError, Hop},
    logging,
};

pub mod gateway;
pub mod resolver;

/// 在指定埠啟動服務，收到 ctrl-c 後停止接受新連線
pub async fn serve(router: Router, port: u16, name: &str) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    logging::info_file_async(format!("{} 服務正在 {:?} 開始服務...", name, addr));

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    match &result {
        Ok(_) => logging::info_file_async(format!("{} 服務在 {:?} 正常停止", name, addr)),
        Err(why) => {
            logging::error_file_async(format!("{} 服務運行中斷 ({:?}): {}", name, addr, why))
        }
    }

    Ok(result?)
}

async fn shutdown_signal() {
    if let Err(why) = tokio::signal::ctrl_c().await {
        logging::error_file_async(format!("Failed to listen for ctrl-c because {:?}", why));
    }
}

/// 沒有對應路由的請求
pub(crate) fn route_not_found(origin: Hop, method: &Method, uri: &Uri) -> ClassifiedError {
    logging::warn_file_async(format!("{} {} has no route", method, uri));
    ClassifiedError::not_found(origin, "Route not found")
}

/// 路由存在但不接受這個 HTTP method
pub(crate) fn method_not_allowed(origin: Hop, method: &Method, uri: &Uri) -> ClassifiedError {
    logging::warn_file_async(format!("{} {} method not allowed", method, uri));
    ClassifiedError::validation(origin, "Method not allowed")
}
