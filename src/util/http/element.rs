use anyhow::{anyhow, Result};
use scraper::{ElementRef, Selector};

/// Compiles a CSS selector, turning scraper's borrowed error into an owned one.
pub fn parse_selector(css_selector: &str) -> Result<Selector> {
    Selector::parse(css_selector)
        .map_err(|why| anyhow!("Failed to Selector::parse({}) because: {:?}", css_selector, why))
}

/// Extracts the text value of an element selected by a given CSS selector.
///
/// Only the first match is considered. Its text nodes are concatenated and
/// trimmed; `None` means the selector matched nothing.
///
/// # Arguments
///
/// * `element` - The element to search beneath.
/// * `selector` - A compiled selector, see [`parse_selector`].
///
/// # Examples
///
/// ```
/// let html = Html::parse_fragment(r#"<div class="example"><p> Hello, world! </p></div>"#);
/// let p = parse_selector("p").unwrap();
///
/// let text = parse_value(&html.root_element(), &p);
/// assert_eq!(text, Some("Hello, world!".to_string()));
/// ```
pub fn parse_value(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|v| v.text().collect::<String>().trim().to_string())
}
