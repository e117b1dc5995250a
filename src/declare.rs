use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::ErrorKind;

/// 市場別
///
/// 決定報價網址後綴的交易所代碼，`NSE` 為 `EQUITY` 的別名。
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum MarketSegment {
    /// 指數 INDEXNSE
    #[strum(to_string = "INDEX")]
    Index,
    /// 個股 NSE
    #[strum(to_string = "EQUITY", serialize = "NSE")]
    Equity,
}

impl MarketSegment {
    /// The suffix appended to `{symbol}:` on the quote site.
    pub fn code(&self) -> &'static str {
        match self {
            MarketSegment::Index => "INDEXNSE",
            MarketSegment::Equity => "NSE",
        }
    }

    /// Path segment the resolver serves this market under.
    pub fn route(&self) -> &'static str {
        match self {
            MarketSegment::Index => "index",
            MarketSegment::Equity => "equity",
        }
    }
}

/// 即時報價
///
/// Either both fields hold non-empty text or the value does not exist; the
/// only way to build one is [`Quote::new`], and deserialization goes through
/// the same check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuote")]
pub struct Quote {
    name: String,
    price: String,
}

#[derive(Deserialize)]
struct RawQuote {
    name: Option<String>,
    price: Option<String>,
}

impl Quote {
    pub fn new(name: &str, price: &str) -> Option<Self> {
        let name = name.trim();
        let price = price.trim();

        if name.is_empty() || price.is_empty() {
            return None;
        }

        Some(Quote {
            name: name.to_string(),
            price: price.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &str {
        &self.price
    }
}

impl TryFrom<RawQuote> for Quote {
    type Error = String;

    fn try_from(raw: RawQuote) -> Result<Self, Self::Error> {
        Quote::new(
            raw.name.as_deref().unwrap_or_default(),
            raw.price.as_deref().unwrap_or_default(),
        )
        .ok_or_else(|| "quote requires both a non-empty name and price".to_string())
    }
}

/// 搜尋結果：公司名稱 => 股票代號
pub type SearchResultSet = BTreeMap<String, String>;

/// 單次請求的處理階段
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Validating,
    Fetching,
    Extracting,
    Success,
    Failed(ErrorKind),
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Success | RequestState::Failed(_))
    }

    /// Whether `next` is a legal successor. Any non-terminal state may fail;
    /// success is only reachable from `Extracting`.
    pub fn can_advance_to(&self, next: RequestState) -> bool {
        use RequestState::*;

        match (self, next) {
            (Pending, Validating)
            | (Validating, Fetching)
            | (Fetching, Extracting)
            | (Extracting, Success) => true,
            (Pending | Validating | Fetching | Extracting, Failed(_)) => true,
            _ => false,
        }
    }
}
