// src/services/listing.rs
use crate::error::{AnalysisError, Result};
use crate::models::Scope;

pub const SITE_PREFIX: &str = "https://www.zillow.com/";
pub const DETAIL_PREFIX: &str = "https://www.zillow.com/home";

/// A listing URL must be strictly longer than this.
const MIN_URL_LEN: usize = 29;
/// Shortest URL accepted as a property-detail page.
const MIN_DETAIL_LEN: usize = 35;

/// Key under which a property's analysis is stored: the detail-page URL
/// rebuilt from the second-to-last path segment, so every variant of a
/// listing URL collapses to one entry.
pub fn canonical_key(url: &str) -> String {
    let id = url.rsplit('/').nth(1).unwrap_or("");
    format!("{}homedetails/{}/", SITE_PREFIX, id)
}

pub fn is_detail_url(url: &str) -> bool {
    url.starts_with(DETAIL_PREFIX) && url.chars().count() >= MIN_DETAIL_LEN
}

/// Checks that `url` belongs to the listing site and has the right shape for
/// `scope`: property scope takes detail pages only, search scope anything but.
pub fn validate_listing_url(url: &str, scope: Scope) -> Result<()> {
    let reject = |reason: &str| AnalysisError::Validation {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if !url.starts_with(SITE_PREFIX) || url.chars().count() <= MIN_URL_LEN {
        return Err(reject("not a listing site URL"));
    }
    match (scope, is_detail_url(url)) {
        (Scope::Property, true) | (Scope::Search, false) => Ok(()),
        (Scope::Property, false) => Err(reject("property URLs must point at a home details page")),
        (Scope::Search, true) => Err(reject("search URLs cannot point at a home details page")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAIL: &str = "https://www.zillow.com/homedetails/123-Main-St/456_zpid/";
    const SEARCH: &str = "https://www.zillow.com/austin-tx/duplex/";

    #[test]
    fn canonical_key_uses_second_to_last_segment() {
        assert_eq!(canonical_key(DETAIL), "https://www.zillow.com/homedetails/456_zpid/");
        assert_eq!(
            canonical_key("https://www.zillow.com/homes/for_sale/456_zpid/"),
            "https://www.zillow.com/homedetails/456_zpid/"
        );
    }

    #[test]
    fn canonical_key_is_stable() {
        let key = canonical_key(DETAIL);
        assert_eq!(canonical_key(&key), key);
    }

    #[test]
    fn property_scope_requires_detail_page() {
        assert!(validate_listing_url(DETAIL, Scope::Property).is_ok());
        assert!(validate_listing_url(SEARCH, Scope::Property).is_err());
    }

    #[test]
    fn search_scope_rejects_detail_page() {
        assert!(validate_listing_url(SEARCH, Scope::Search).is_ok());
        assert!(validate_listing_url(DETAIL, Scope::Search).is_err());
    }

    #[test]
    fn rejects_foreign_and_short_urls() {
        assert!(validate_listing_url("https://www.redfin.com/TX/Austin/123-Main-St/home/1", Scope::Property).is_err());
        // exactly 29 characters
        let short = "https://www.zillow.com/abcdef";
        assert_eq!(short.len(), 29);
        assert!(validate_listing_url(short, Scope::Search).is_err());
        assert!(validate_listing_url("https://www.zillow.com/abcdefg", Scope::Search).is_ok());
    }

    #[test]
    fn rejection_is_a_validation_error() {
        let err = validate_listing_url("e", Scope::Property).unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let six_accents = "https://www.zillow.com/\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}\u{e9}";
        assert_eq!(six_accents.chars().count(), 29);
        assert!(validate_listing_url(six_accents, Scope::Search).is_err());

        let short_home = "https://www.zillow.com/home\u{e9}\u{e9}\u{e9}\u{e9}";
        assert!(short_home.len() >= 35);
        assert!(!is_detail_url(short_home));
        assert!(validate_listing_url(short_home, Scope::Search).is_ok());
    }
}
