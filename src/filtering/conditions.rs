use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{ColumnTrait, Value, sea_query::SimpleExpr};

// Basic safety limits
pub const MAX_FIELD_VALUE_LENGTH: usize = 10_000;

/// Basic value length check
const fn validate_field_value(value: &str) -> bool {
    value.len() <= MAX_FIELD_VALUE_LENGTH
}

/// Split a comma-separated parameter, trimming and dropping empty entries.
#[must_use]
pub fn split_values(raw: &str) -> Vec<&str> {
    if !validate_field_value(raw) {
        tracing::debug!(length = raw.len(), "Filter value too long, ignoring");
        return Vec::new();
    }
    raw.split(',').map(str::trim).filter(|v| !v.is_empty()).collect()
}

/// Equality for one value, membership for several, nothing for none.
fn one_or_many<C, V>(column: C, mut values: Vec<V>) -> Option<SimpleExpr>
where
    C: ColumnTrait,
    V: Into<Value>,
{
    match values.len() {
        0 => None,
        1 => values.pop().map(|value| column.eq(value)),
        _ => Some(column.is_in(values)),
    }
}

/// Multi-value equality on a string column.
///
/// Values outside `allowed` are dropped rather than rejected, so
/// `status=published,bogus` behaves like `status=published`.
#[must_use]
pub fn multi_value<C: ColumnTrait>(
    column: C,
    raw: &str,
    allowed: Option<&[&str]>,
) -> Option<SimpleExpr> {
    let values: Vec<&str> = split_values(raw)
        .into_iter()
        .filter(|value| allowed.is_none_or(|allowed| allowed.contains(value)))
        .collect();
    one_or_many(column, values)
}

/// Integer identifiers from a comma-separated list. Non-numeric tokens and
/// repeats are dropped.
#[must_use]
pub fn parse_ids(raw: &str) -> Vec<i32> {
    let mut ids = Vec::new();
    for token in split_values(raw) {
        match token.parse::<i32>() {
            Ok(id) if !ids.contains(&id) => ids.push(id),
            Ok(_) => {}
            Err(_) => tracing::debug!(token, "Ignoring non-numeric identifier"),
        }
    }
    ids
}

/// Multi-value equality on an integer foreign key column.
#[must_use]
pub fn multi_id<C: ColumnTrait>(column: C, raw: &str) -> Option<SimpleExpr> {
    one_or_many(column, parse_ids(raw))
}

/// A finite decimal number, or `None` for anything else.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Some(number),
        _ => {
            tracing::debug!(value = raw, "Ignoring malformed numeric filter value");
            None
        }
    }
}

/// `column >= value` for a well-formed number.
#[must_use]
pub fn at_least<C: ColumnTrait>(column: C, raw: &str) -> Option<SimpleExpr> {
    parse_number(raw).map(|min| column.gte(min))
}

/// `column <= value` for a well-formed number.
#[must_use]
pub fn at_most<C: ColumnTrait>(column: C, raw: &str) -> Option<SimpleExpr> {
    parse_number(raw).map(|max| column.lte(max))
}

/// Boolean coercion of the usual query-string encodings. Unrecognized
/// tokens are false.
#[must_use]
pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// A calendar date in `YYYY-MM-DD` form.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Lower bound for a timestamp filter. A bare date starts at midnight UTC.
#[must_use]
pub fn parse_lower_bound(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(date) = parse_date(raw) {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }
    parse_rfc3339(raw)
}

/// Upper bound for a timestamp filter, returned with whether it is
/// exclusive. A bare date covers the whole day, so it becomes the exclusive
/// bound of the following midnight.
#[must_use]
pub fn parse_upper_bound(raw: &str) -> Option<(DateTime<Utc>, bool)> {
    if let Some(date) = parse_date(raw) {
        let next = date.checked_add_days(Days::new(1))?;
        return Some((next.and_time(NaiveTime::MIN).and_utc(), true));
    }
    parse_rfc3339(raw).map(|instant| (instant, false))
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(instant) => Some(instant.with_timezone(&Utc)),
        Err(_) => {
            tracing::debug!(value = raw, "Ignoring malformed date filter value");
            None
        }
    }
}

/// `created_after` style constraint on a timestamp column.
#[must_use]
pub fn created_after<C: ColumnTrait>(column: C, raw: &str) -> Option<SimpleExpr> {
    parse_lower_bound(raw).map(|bound| column.gte(bound))
}

/// `created_before` style constraint on a timestamp column.
#[must_use]
pub fn created_before<C: ColumnTrait>(column: C, raw: &str) -> Option<SimpleExpr> {
    parse_upper_bound(raw).map(|(bound, exclusive)| {
        if exclusive {
            column.lt(bound)
        } else {
            column.lte(bound)
        }
    })
}

/// `column >= date` on a date column.
#[must_use]
pub fn date_from<C: ColumnTrait>(column: C, raw: &str) -> Option<SimpleExpr> {
    parse_date(raw).map(|date| column.gte(date))
}

/// `column <= date` on a date column.
#[must_use]
pub fn date_to<C: ColumnTrait>(column: C, raw: &str) -> Option<SimpleExpr> {
    parse_date(raw).map(|date| column.lte(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::trail;
    use sea_orm::{Condition, DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn where_sql(expr: SimpleExpr) -> String {
        trail::Entity::find()
            .filter(Condition::all().add(expr))
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn test_split_values_trims_and_drops_empties() {
        assert_eq!(split_values(" easy , ,hard,"), vec!["easy", "hard"]);
        assert!(split_values(" , ").is_empty());
        assert!(split_values(&"a".repeat(MAX_FIELD_VALUE_LENGTH + 1)).is_empty());
    }

    #[test]
    fn test_single_value_is_equality() {
        let sql = where_sql(multi_value(trail::Column::Difficulty, "easy", None).unwrap());
        assert!(sql.contains(r#""trails"."difficulty" = 'easy'"#), "{sql}");
    }

    #[test]
    fn test_many_values_is_membership() {
        let sql = where_sql(multi_value(trail::Column::Difficulty, "easy,hard", None).unwrap());
        assert!(sql.contains(r#""trails"."difficulty" IN ('easy', 'hard')"#), "{sql}");
    }

    #[test]
    fn test_allow_list_drops_unknown_values() {
        let allowed = ["easy", "moderate"];
        let sql = where_sql(
            multi_value(trail::Column::Difficulty, "easy,extreme", Some(&allowed)).unwrap(),
        );
        assert!(sql.contains(r#""trails"."difficulty" = 'easy'"#), "{sql}");
        assert!(!sql.contains("extreme"));

        assert!(multi_value(trail::Column::Difficulty, "extreme", Some(&allowed)).is_none());
    }

    #[test]
    fn test_parse_ids_drops_garbage_and_repeats() {
        assert_eq!(parse_ids("3, x, 5,3"), vec![3, 5]);
        assert!(parse_ids("x,y").is_empty());
        assert!(multi_id(trail::Column::CreatedBy, "abc").is_none());
    }

    #[test]
    fn test_numeric_bounds_skip_malformed_values() {
        assert!(at_least(trail::Column::DistanceKm, "ten").is_none());
        assert!(at_most(trail::Column::DistanceKm, "NaN").is_none());
        assert!(at_most(trail::Column::DistanceKm, "inf").is_none());

        let sql = where_sql(at_least(trail::Column::DistanceKm, "2.5").unwrap());
        assert!(sql.contains(r#""trails"."distance_km" >= 2.5"#), "{sql}");
    }

    #[test]
    fn test_parse_bool_encodings() {
        for truthy in ["1", "true", "TRUE", "yes", "on", " On "] {
            assert!(parse_bool(truthy), "{truthy} should be true");
        }
        for falsy in ["0", "false", "no", "off", "", "maybe", "2"] {
            assert!(!parse_bool(falsy), "{falsy} should be false");
        }
    }

    #[test]
    fn test_date_bounds() {
        let lower = parse_lower_bound("2024-03-01").unwrap();
        assert_eq!(lower.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let (upper, exclusive) = parse_upper_bound("2024-03-01").unwrap();
        assert!(exclusive);
        assert_eq!(upper.to_rfc3339(), "2024-03-02T00:00:00+00:00");

        let (upper, exclusive) = parse_upper_bound("2024-03-01T12:30:00+02:00").unwrap();
        assert!(!exclusive);
        assert_eq!(upper.to_rfc3339(), "2024-03-01T10:30:00+00:00");

        assert!(parse_lower_bound("01/03/2024").is_none());
        assert!(created_before(trail::Column::CreatedAt, "yesterday").is_none());
    }
}
