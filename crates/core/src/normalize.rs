//! Identifier canonicalization applied before every grouping operation.
//!
//! Both rules collapse missing values (absent, blank, or the literal `nan`
//! left behind by spreadsheet exports) to the empty string, so callers only
//! ever have to test for `""`.

fn is_missing(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case("nan")
}

/// Canonical product identifier: trimmed and upper-cased.
pub fn normalize_asin(raw: Option<&str>) -> String {
    let s = raw.unwrap_or_default().trim().to_uppercase();
    if is_missing(&s) {
        String::new()
    } else {
        s
    }
}

/// Canonical grouping label (campaign, ad group, shop, ad type): trimmed only.
pub fn normalize_label(raw: Option<&str>) -> String {
    let s = raw.unwrap_or_default().trim();
    if is_missing(s) {
        String::new()
    } else {
        s.to_string()
    }
}
