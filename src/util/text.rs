/// Title-cases `s` the way the search site's labels are normalized: the first
/// letter of every run of letters is upper-cased and the rest of the run is
/// lower-cased. Anything that is not a letter (digits, spaces, punctuation)
/// ends a run, so `"3m india ltd."` becomes `"3M India Ltd."`.
///
/// Case mapping is per `char`, so a letter whose upper case is several
/// characters expands in full (`"ßa"` becomes `"SSa"`). Labels from the
/// search site are ASCII.
///
/// # Example
///
/// ```
/// assert_eq!(title_case("TATA CONSULTANCY SERVICES LTD"), "Tata Consultancy Services Ltd");
/// ```
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }

    result
}

/// 去除前後空白後是否為空字串
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
