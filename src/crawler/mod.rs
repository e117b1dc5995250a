use crate::{
    error::{ClassifiedError, Hop},
    util::http::UpstreamOutcome,
};

/// 頁面擷取
pub mod extract;
/// Google 財經
pub mod google_finance;
/// 印度國家證券交易所
pub mod nse_india;
/// 擷取規則
pub mod profile;

/// Turns the raw outcome of a call to an external site into either the page
/// body or the error this hop reports. `site` only appears in the message.
///
/// The second element of the error tuple is the internal detail (status code,
/// transport cause) meant for the log.
pub(crate) fn classify_outcome(
    outcome: UpstreamOutcome,
    origin: Hop,
    site: &str,
    not_found_message: &str,
) -> Result<String, (ClassifiedError, String)> {
    match outcome {
        UpstreamOutcome::Raw { body, .. } => Ok(body),
        UpstreamOutcome::NotFound { .. } => Err((
            ClassifiedError::not_found(origin, not_found_message),
            format!("{} answered 404", site),
        )),
        UpstreamOutcome::UpstreamError { status, .. } => Err((
            ClassifiedError::unavailable(origin, format!("Failed to fetch data from {}", site)),
            format!("{} answered {}", site, status),
        )),
        UpstreamOutcome::TransportFailure(cause) => Err((
            ClassifiedError::unavailable(origin, format!("Failed to fetch data from {}", site)),
            format!("{} unreachable: {}", site, cause),
        )),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub(crate) const TCS_QUOTE_PAGE: &str = r#"<!doctype html>
<html><body>
  <main>
    <div class="eYanAe">
      <div role="heading" aria-level="1" class="zzDege">Tata Consultancy Services Ltd</div>
    </div>
    <div class="rPF6Lc">
      <div class="YMlKec fxKbKc">₹3,500.00</div>
      <div class="YMlKec">₹3,480.15</div>
    </div>
  </main>
</body></html>"#;

    pub(crate) const QUOTE_PAGE_WITHOUT_PRICE: &str = r#"<!doctype html>
<html><body>
  <div class="zzDege">Tata Consultancy Services Ltd</div>
  <div class="P6K39c">₹3,480.15</div>
</body></html>"#;

    pub(crate) const SEARCH_PAGE: &str = r#"<!doctype html>
<html><body>
  <div class="searchWrp">
    <a href="/get-quotes/equity?symbol=TCS"> TCS </a>
    <p class="searchDesc"> TATA CONSULTANCY SERVICES LIMITED </p>
  </div>
  <div class="searchWrp">
    <a href="/get-quotes/equity?symbol=TATAMOTORS">TATAMOTORS</a>
    <p class="searchDesc">tata motors limited</p>
  </div>
  <div class="searchWrp">
    <a href="/get-quotes/equity?symbol=TATASTEEL">
      TATASTEEL
    </a>
    <p class="searchDesc">Tata Steel Limited</p>
  </div>
</body></html>"#;

    pub(crate) const EMPTY_SEARCH_PAGE: &str = r#"<!doctype html>
<html><body><div class="noResult">No record found</div></body></html>"#;
}
