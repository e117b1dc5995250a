//! # NSE India 搜尋模組
//!
//! 以關鍵字查詢公司代號。網站會擋掉非瀏覽器的請求，
//! 因此必須帶上 User-Agent 與 Accept-Language。

/// 公司名稱搜尋
pub mod search;

pub use search::SearchResolver;

/// NSE India 的主機域名
pub const HOST: &str = "www.nseindia.com";

/// 錯誤訊息中使用的站名
const SITE: &str = "NSE India";
