use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::{
    crawler::profile::{QuoteProfile, SearchProfile},
    declare::{Quote, SearchResultSet},
    util::{http::element, text},
};

/// The page came back but did not have the shape the profile expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("{profile}: invalid selector `{selector}`")]
    InvalidSelector {
        profile: String,
        selector: &'static str,
    },
    #[error("{profile}: {field} node not found")]
    MissingNode {
        profile: String,
        field: &'static str,
    },
    #[error("{profile}: {field} node is empty")]
    EmptyField {
        profile: String,
        field: &'static str,
    },
}

/// 取出報價頁的名稱與價格，兩者缺一即失敗
pub fn extract_quote(html: &str, profile: &QuoteProfile) -> Result<Quote, ExtractError> {
    let id = profile.to_string();
    let name_selector = compile(&id, profile.name_selector)?;
    let price_selector = compile(&id, profile.price_selector)?;
    let document = Html::parse_document(html);
    let root = document.root_element();

    let name = required_text(&root, &name_selector, &id, "name")?;
    let price = required_text(&root, &price_selector, &id, "price")?;

    Quote::new(&name, &price).ok_or(ExtractError::EmptyField {
        profile: id,
        field: "quote",
    })
}

/// Builds `title_case(description) => label` for every result block.
///
/// A page without blocks is a legitimate "no matches"; a block without its
/// description or label means the layout changed.
pub fn extract_search(html: &str, profile: &SearchProfile) -> Result<SearchResultSet, ExtractError> {
    let id = profile.to_string();
    let block_selector = compile(&id, profile.block_selector)?;
    let description_selector = compile(&id, profile.description_selector)?;
    let label_selector = compile(&id, profile.label_selector)?;
    let document = Html::parse_document(html);
    let mut result = SearchResultSet::new();

    for block in document.select(&block_selector) {
        let description = required_text(&block, &description_selector, &id, "description")?;
        let label = required_text(&block, &label_selector, &id, "label")?;
        result.insert(text::title_case(&description), label);
    }

    Ok(result)
}

fn compile(profile: &str, css: &'static str) -> Result<Selector, ExtractError> {
    element::parse_selector(css).map_err(|_| ExtractError::InvalidSelector {
        profile: profile.to_string(),
        selector: css,
    })
}

fn required_text(
    element: &ElementRef,
    selector: &Selector,
    profile: &str,
    field: &'static str,
) -> Result<String, ExtractError> {
    match element::parse_value(element, selector) {
        None => Err(ExtractError::MissingNode {
            profile: profile.to_string(),
            field,
        }),
        Some(value) if text::is_blank(&value) => Err(ExtractError::EmptyField {
            profile: profile.to_string(),
            field,
        }),
        Some(value) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{
        fixtures,
        profile::{GOOGLE_FINANCE_QUOTE_V1, NSE_INDIA_SEARCH_V1},
    };

    #[test]
    fn test_extract_quote() {
        let quote = extract_quote(fixtures::TCS_QUOTE_PAGE, &GOOGLE_FINANCE_QUOTE_V1).unwrap();

        assert_eq!(quote.name(), "Tata Consultancy Services Ltd");
        assert_eq!(quote.price(), "₹3,500.00");
    }

    #[test]
    fn test_extract_quote_without_price() {
        let err =
            extract_quote(fixtures::QUOTE_PAGE_WITHOUT_PRICE, &GOOGLE_FINANCE_QUOTE_V1).unwrap_err();

        assert_eq!(
            err,
            ExtractError::MissingNode {
                profile: "google_finance.quote@1".to_string(),
                field: "price",
            }
        );
    }

    #[test]
    fn test_extract_quote_with_blank_name() {
        let html = r#"<div class="zzDege">  </div><div class="YMlKec fxKbKc">10</div>"#;
        let err = extract_quote(html, &GOOGLE_FINANCE_QUOTE_V1).unwrap_err();

        assert!(matches!(err, ExtractError::EmptyField { field: "name", .. }));
    }

    #[test]
    fn test_extract_quote_requires_both_price_classes() {
        // 只有 YMlKec 而沒有 fxKbKc 的是頁面上其他價格欄位
        let html = r#"<div class="zzDege">NIFTY 50</div><div class="YMlKec">1</div>"#;

        assert!(extract_quote(html, &GOOGLE_FINANCE_QUOTE_V1).is_err());
    }

    #[test]
    fn test_extract_search() {
        let result = extract_search(fixtures::SEARCH_PAGE, &NSE_INDIA_SEARCH_V1).unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(
            result.get("Tata Consultancy Services Limited").map(String::as_str),
            Some("TCS")
        );
        assert_eq!(result.get("Tata Motors Limited").map(String::as_str), Some("TATAMOTORS"));
        assert_eq!(result.get("Tata Steel Limited").map(String::as_str), Some("TATASTEEL"));
    }

    #[test]
    fn test_extract_search_empty() {
        let result = extract_search(fixtures::EMPTY_SEARCH_PAGE, &NSE_INDIA_SEARCH_V1).unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn test_extract_search_duplicate_keeps_last() {
        let html = r#"
            <div class="searchWrp"><a href="/a">OLD</a><p class="searchDesc">acme ltd</p></div>
            <div class="searchWrp"><a href="/b">NEW</a><p class="searchDesc">ACME LTD</p></div>
        "#;
        let result = extract_search(html, &NSE_INDIA_SEARCH_V1).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get("Acme Ltd").map(String::as_str), Some("NEW"));
    }

    #[test]
    fn test_extract_search_block_without_label() {
        let html = r#"<div class="searchWrp"><p class="searchDesc">acme ltd</p></div>"#;
        let err = extract_search(html, &NSE_INDIA_SEARCH_V1).unwrap_err();

        assert!(matches!(err, ExtractError::MissingNode { field: "label", .. }));
    }

    #[test]
    fn test_invalid_selector() {
        let broken = QuoteProfile {
            name: "broken",
            version: 9,
            name_selector: "div[",
            price_selector: "div",
        };
        let err = extract_quote(fixtures::TCS_QUOTE_PAGE, &broken).unwrap_err();

        assert_eq!(err.to_string(), "broken@9: invalid selector `div[`");
    }
}
