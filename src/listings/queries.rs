//! Database queries for listings and property search

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::booking::queries::push_active_overlap;
use crate::booking::{Property, PropertyStatus};
use crate::error::AppError;

use super::requests::{like_pattern, SearchFilter};

const PROPERTY_COLUMNS: &str = "p.id, p.host_id, p.title, p.city, p.nightly_price_cents, \
     p.max_guests, p.bedrooms, p.status, p.created_at, p.updated_at";

/// Append the search predicates for properties aliased as `p`.
///
/// With a stay, properties holding an active overlapping booking are
/// subtracted in one `NOT EXISTS` instead of a per-property check.
fn push_search_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter) {
    qb.push(" WHERE p.status <> 'unlisted'");

    if let Some(text) = &filter.text {
        let pattern = like_pattern(text);
        qb.push(" AND (LOWER(p.title) LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR LOWER(p.city) LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(city) = &filter.city {
        qb.push(" AND LOWER(p.city) LIKE ")
            .push_bind(like_pattern(city))
            .push(" ESCAPE '\\'");
    }
    if let Some(min) = filter.min_price_cents {
        qb.push(" AND p.nightly_price_cents >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price_cents {
        qb.push(" AND p.nightly_price_cents <= ").push_bind(max);
    }
    if let Some(bedrooms) = filter.min_bedrooms {
        qb.push(" AND p.bedrooms >= ").push_bind(bedrooms);
    }
    if let Some(guests) = filter.guests {
        qb.push(" AND p.max_guests >= ").push_bind(guests);
    }
    if let Some(stay) = &filter.stay {
        qb.push(" AND NOT EXISTS (SELECT 1 FROM bookings b WHERE b.property_id = p.id AND ");
        push_active_overlap(qb, stay);
        qb.push(")");
    }
}

/// Properties matching the filter, newest first
pub async fn search_properties(pool: &PgPool, filter: &SearchFilter) -> Result<Vec<Property>, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(PROPERTY_COLUMNS).push(" FROM properties p");
    push_search_filter(&mut qb, filter);
    qb.push(" ORDER BY p.created_at DESC, p.id LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);

    let properties = qb.build_query_as::<Property>().fetch_all(pool).await?;
    Ok(properties)
}

/// Count properties matching the filter (for pagination)
pub async fn count_properties(pool: &PgPool, filter: &SearchFilter) -> Result<i64, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties p");
    push_search_filter(&mut qb, filter);

    let count = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(count)
}

/// Public property detail; unlisted properties are not found
pub async fn get_listing(pool: &PgPool, property_id: Uuid) -> Result<Property, AppError> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(PROPERTY_COLUMNS)
        .push(" FROM properties p WHERE p.id = ")
        .push_bind(property_id)
        .push(" AND p.status <> 'unlisted'");

    qb.build_query_as::<Property>()
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

/// Change the listing status of one of the host's properties
pub async fn set_property_status(
    pool: &PgPool,
    host_id: Uuid,
    property_id: Uuid,
    status: PropertyStatus,
) -> Result<Property, AppError> {
    sqlx::query_as::<_, Property>(
        r#"
        UPDATE properties
        SET status = $1, updated_at = NOW()
        WHERE id = $2
          AND host_id = $3
        RETURNING
            id, host_id, title, city, nightly_price_cents,
            max_guests, bedrooms, status, created_at, updated_at
        "#,
    )
    .bind(status.as_str())
    .bind(property_id)
    .bind(host_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::StayDates;
    use chrono::NaiveDate;

    fn filter() -> SearchFilter {
        SearchFilter {
            text: None,
            city: None,
            min_price_cents: None,
            max_price_cents: None,
            min_bedrooms: None,
            guests: None,
            stay: None,
            limit: 20,
            offset: 0,
        }
    }

    fn sql(filter: &SearchFilter) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties p");
        push_search_filter(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_search_always_hides_unlisted() {
        let sql = sql(&filter());
        assert!(sql.contains("p.status <> 'unlisted'"));
        assert!(!sql.contains("NOT EXISTS"));
    }

    #[test]
    fn test_search_with_stay_subtracts_active_overlaps() {
        let mut f = filter();
        f.stay = Some(
            StayDates::new(
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            )
            .unwrap(),
        );
        let sql = sql(&f);
        assert!(sql.contains("NOT EXISTS (SELECT 1 FROM bookings b WHERE b.property_id = p.id AND"));
        assert!(sql.contains("b.status IN ('pending', 'confirmed') AND b.check_in < $1 AND b.check_out > $2"));
    }

    #[test]
    fn test_search_binds_each_filter() {
        let mut f = filter();
        f.text = Some("loft".to_string());
        f.min_price_cents = Some(5000);
        f.guests = Some(3);
        let sql = sql(&f);
        assert!(sql.contains("LOWER(p.title) LIKE $1"));
        assert!(sql.contains("LOWER(p.city) LIKE $2"));
        assert!(sql.contains("p.nightly_price_cents >= $3"));
        assert!(sql.contains("p.max_guests >= $4"));
    }
}
