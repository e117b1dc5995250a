//! 頁面擷取規則
//!
//! The external sites are keyed on generated class names that change without
//! notice. Every rule set carries a name and a version so that an extraction
//! failure in the log points at the exact profile that drifted; bump the
//! version whenever a selector changes.

use std::fmt;

/// Where the company name and the last price live on a quote page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteProfile {
    pub name: &'static str,
    pub version: u16,
    pub name_selector: &'static str,
    pub price_selector: &'static str,
}

/// Where the result blocks live on a search page, and the description and
/// label inside each block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProfile {
    pub name: &'static str,
    pub version: u16,
    pub block_selector: &'static str,
    pub description_selector: &'static str,
    pub label_selector: &'static str,
}

/// Google 財經個股/指數頁
pub const GOOGLE_FINANCE_QUOTE_V1: QuoteProfile = QuoteProfile {
    name: "google_finance.quote",
    version: 1,
    name_selector: "div.zzDege",
    price_selector: "div.YMlKec.fxKbKc",
};

/// NSE India 搜尋結果頁
pub const NSE_INDIA_SEARCH_V1: SearchProfile = SearchProfile {
    name: "nse_india.search",
    version: 1,
    block_selector: "div.searchWrp",
    description_selector: "p.searchDesc",
    label_selector: "a[href]",
};

impl fmt::Display for QuoteProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl fmt::Display for SearchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
