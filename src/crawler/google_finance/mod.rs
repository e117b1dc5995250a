//! # Google 財經報價模組
//!
//! 依市場別組出 `{symbol}:{code}` 報價頁網址，抓取後以
//! [`GOOGLE_FINANCE_QUOTE_V1`](crate::crawler::profile::GOOGLE_FINANCE_QUOTE_V1)
//! 規則取出名稱與價格。
//!
//! - 來源域名：`www.google.com`
//! - 抓取技術：HTTP GET 搭配 CSS Selector 解析。

/// 即時報價
pub mod quote;

pub use quote::QuoteResolver;

/// Google 財經的主機域名
pub const HOST: &str = "www.google.com";

/// 錯誤訊息中使用的站名
const SITE: &str = "Google Finance";
