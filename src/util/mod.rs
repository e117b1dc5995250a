use std::sync::Once;

pub mod http;
pub mod text;
pub mod trace;

static CRYPTO_PROVIDER: Once = Once::new();

/// reqwest 使用 `rustls-no-provider`，建立 Client 前必須先安裝 ring provider。
pub fn ensure_rustls_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // 其他元件已安裝過時會回傳 Err，忽略即可
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
