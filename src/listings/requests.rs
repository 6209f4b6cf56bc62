//! Request DTOs for listing endpoints.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::booking::{BookingError, PropertyStatus, StayDates};

const MAX_PAGE_SIZE: i64 = 100;

fn default_limit() -> i64 {
    20
}

/// Query parameters for property search
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub min_price_cents: Option<i64>,
    #[serde(default)]
    pub max_price_cents: Option<i64>,
    #[serde(default)]
    pub bedrooms: Option<i32>,
    #[serde(default)]
    pub guests: Option<i32>,
    #[serde(default)]
    pub check_in: Option<NaiveDate>,
    #[serde(default)]
    pub check_out: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// Validated search criteria
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub text: Option<String>,
    pub city: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub min_bedrooms: Option<i32>,
    pub guests: Option<i32>,
    /// Only properties free for the whole stay
    pub stay: Option<StayDates>,
    pub limit: i64,
    pub offset: i64,
}

impl TryFrom<SearchQuery> for SearchFilter {
    type Error = BookingError;

    /// Availability is filtered only when both dates are given; a given
    /// but invalid pair is rejected rather than ignored.
    fn try_from(query: SearchQuery) -> Result<Self, Self::Error> {
        let stay = match (query.check_in, query.check_out) {
            (Some(check_in), Some(check_out)) => Some(StayDates::new(check_in, check_out)?),
            _ => None,
        };

        Ok(Self {
            text: normalize(query.q),
            city: normalize(query.city),
            min_price_cents: query.min_price_cents,
            max_price_cents: query.max_price_cents,
            min_bedrooms: query.bedrooms,
            guests: query.guests,
            stay,
            limit: query.limit.clamp(1, MAX_PAGE_SIZE),
            offset: query.offset.max(0),
        })
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Escape `LIKE` wildcards so user text matches literally
pub fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Request from a host to change a property's listing status
#[derive(Debug, Deserialize)]
pub struct UpdatePropertyStatusRequest {
    pub status: PropertyStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_both_dates_enable_availability_filter() {
        let filter = SearchFilter::try_from(SearchQuery {
            check_in: Some(date("2026-03-01")),
            check_out: Some(date("2026-03-04")),
            limit: 20,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.stay.map(|s| s.nights()), Some(3));
    }

    #[test]
    fn test_single_date_skips_availability_filter() {
        let filter = SearchFilter::try_from(SearchQuery {
            check_in: Some(date("2026-03-01")),
            limit: 20,
            ..Default::default()
        })
        .unwrap();
        assert!(filter.stay.is_none());
    }

    #[test]
    fn test_invalid_dates_are_rejected() {
        let err = SearchFilter::try_from(SearchQuery {
            check_in: Some(date("2026-03-04")),
            check_out: Some(date("2026-03-04")),
            limit: 20,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, BookingError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_text_is_normalized_and_page_clamped() {
        let filter = SearchFilter::try_from(SearchQuery {
            q: Some("  Beach House ".to_string()),
            city: Some("   ".to_string()),
            limit: 0,
            offset: -3,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.text.as_deref(), Some("beach house"));
        assert!(filter.city.is_none());
        assert_eq!(filter.limit, 1);
        assert_eq!(filter.offset, 0);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("loft"), "%loft%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_query_defaults() {
        let query: SearchQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 0);
    }
}
