//! Dynamic search query construction.
//!
//! A search request is a list of field maps. Entries inside one map are
//! AND-ed into a predicate group; groups are OR-ed together. Every key is
//! checked against the allow-list and every value is converted to a typed
//! bind parameter before anything reaches storage, so a bad request never
//! issues a partial query.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::AppError;
use crate::models::profile::{ColumnKind, PROFILES_TABLE, SearchFilter, searchable_column};

/// A typed value bound to one placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchValue {
    Integer(i64),
    Text(String),
    Json(Value),
    Timestamp(DateTime<Utc>),
}

/// Bind parameter for placeholder `$n`, where `n` is its position in
/// `SearchQuery::params` plus one.
///
/// `name` is the search key suffixed with the index of the map it came from,
/// so the same key used in two maps yields two distinct parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    pub name: String,
    pub value: SearchValue,
}

/// Parameterized SQL ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub sql: String,
    pub params: Vec<BoundParam>,
}

/// Knobs that do not come from the request body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Return soft-deleted rows as well.
    pub include_deleted: bool,
}

/// Build the query for a list of search maps.
///
/// An empty list selects every row.
///
/// # Errors
///
/// - `InvalidField`: a key is not in the allow-list
/// - `Decode`: a value does not fit its column
pub fn build_search_query(
    filters: &[SearchFilter],
    options: SearchOptions,
) -> Result<SearchQuery, AppError> {
    let mut params = Vec::new();
    let mut groups = Vec::with_capacity(filters.len());

    for (index, filter) in filters.iter().enumerate() {
        groups.push(build_group(index, filter, &mut params)?);
    }

    let mut conditions = Vec::new();
    if !options.include_deleted {
        conditions.push("deleted_at IS NULL".to_string());
    }
    if !groups.is_empty() {
        let disjunction = groups.join(" OR ");
        if conditions.is_empty() {
            conditions.push(disjunction);
        } else {
            conditions.push(format!("({disjunction})"));
        }
    }

    let mut sql = format!("SELECT * FROM {PROFILES_TABLE}");
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY id");

    Ok(SearchQuery { sql, params })
}

/// Render one map as a parenthesized AND-group, appending its parameters.
fn build_group(
    index: usize,
    filter: &SearchFilter,
    params: &mut Vec<BoundParam>,
) -> Result<String, AppError> {
    let mut predicates = Vec::with_capacity(filter.len());

    for (key, value) in filter {
        let (column, kind) =
            searchable_column(key).ok_or_else(|| AppError::InvalidField(key.clone()))?;

        if value.is_null() {
            predicates.push(format!("{column} IS NULL"));
            continue;
        }

        params.push(BoundParam {
            name: format!("{key}{index}"),
            value: to_search_value(key, kind, value)?,
        });
        predicates.push(format!("{column} = ${}", params.len()));
    }

    if predicates.is_empty() {
        // {} places no constraint on the row
        return Ok("(TRUE)".to_string());
    }

    Ok(format!("({})", predicates.join(" AND ")))
}

fn to_search_value(key: &str, kind: ColumnKind, value: &Value) -> Result<SearchValue, AppError> {
    let mismatch = |expected: &str| AppError::Decode(format!("field {key} expects {expected}"));

    match kind {
        ColumnKind::Integer => value
            .as_i64()
            .map(SearchValue::Integer)
            .ok_or_else(|| mismatch("an integer")),
        ColumnKind::Text => value
            .as_str()
            .map(|s| SearchValue::Text(s.to_string()))
            .ok_or_else(|| mismatch("a string")),
        ColumnKind::Timestamp => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|at| SearchValue::Timestamp(at.with_timezone(&Utc)))
            .ok_or_else(|| mismatch("an RFC 3339 timestamp")),
        ColumnKind::Json => Ok(SearchValue::Json(value.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const ALL_ROWS: SearchOptions = SearchOptions {
        include_deleted: true,
    };

    fn filters(value: Value) -> Vec<SearchFilter> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_list_selects_everything() {
        let query = build_search_query(&[], ALL_ROWS).unwrap();
        assert_eq!(query.sql, "SELECT * FROM profiles ORDER BY id");
        assert!(query.params.is_empty());
    }

    #[test]
    fn empty_list_still_hides_soft_deleted_rows_by_default() {
        let query = build_search_query(&[], SearchOptions::default()).unwrap();
        assert_eq!(
            query.sql,
            "SELECT * FROM profiles WHERE deleted_at IS NULL ORDER BY id"
        );
    }

    #[test]
    fn maps_are_or_ed_with_distinct_parameters() {
        let query = build_search_query(
            &filters(json!([
                {"user_first_name": "Ann"},
                {"user_last_name": "Lee"}
            ])),
            ALL_ROWS,
        )
        .unwrap();

        assert_eq!(
            query.sql,
            "SELECT * FROM profiles WHERE (user_first_name = $1) OR (user_last_name = $2) ORDER BY id"
        );
        assert_eq!(
            query.params,
            vec![
                BoundParam {
                    name: "user_first_name0".into(),
                    value: SearchValue::Text("Ann".into()),
                },
                BoundParam {
                    name: "user_last_name1".into(),
                    value: SearchValue::Text("Lee".into()),
                },
            ]
        );
    }

    #[test]
    fn same_key_in_two_maps_gets_two_names() {
        let query = build_search_query(
            &filters(json!([
                {"user_last_name": "Lee"},
                {"user_last_name": "Kim"}
            ])),
            ALL_ROWS,
        )
        .unwrap();

        let names: Vec<&str> = query.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["user_last_name0", "user_last_name1"]);
    }

    #[test]
    fn entries_in_one_map_are_and_ed() {
        let query = build_search_query(
            &filters(json!([{"user_first_name": "Ann", "user_last_name": "Lee"}])),
            ALL_ROWS,
        )
        .unwrap();

        assert_eq!(
            query.sql,
            "SELECT * FROM profiles WHERE (user_first_name = $1 AND user_last_name = $2) ORDER BY id"
        );
    }

    #[test]
    fn null_value_becomes_is_null_without_parameter() {
        let query =
            build_search_query(&filters(json!([{"user_position": null}])), ALL_ROWS).unwrap();

        assert_eq!(
            query.sql,
            "SELECT * FROM profiles WHERE (user_position IS NULL) ORDER BY id"
        );
        assert!(query.params.is_empty());
    }

    #[test]
    fn soft_delete_filter_wraps_the_disjunction() {
        let query = build_search_query(
            &filters(json!([{"user_first_name": "Ann"}, {"user_position": null}])),
            SearchOptions::default(),
        )
        .unwrap();

        assert_eq!(
            query.sql,
            "SELECT * FROM profiles WHERE deleted_at IS NULL AND ((user_first_name = $1) OR (user_position IS NULL)) ORDER BY id"
        );
        assert_eq!(query.params.len(), 1);
    }

    #[test]
    fn unknown_key_fails_even_after_valid_maps() {
        let err = build_search_query(
            &filters(json!([
                {"user_first_name": "Ann"},
                {"user_last_name": "Lee", "password": "x"}
            ])),
            ALL_ROWS,
        )
        .unwrap_err();

        assert!(matches!(err, AppError::InvalidField(key) if key == "password"));
    }

    #[test]
    fn user_id_alias_filters_on_id() {
        let query = build_search_query(&filters(json!([{"user_id": 42}])), ALL_ROWS).unwrap();

        assert_eq!(query.sql, "SELECT * FROM profiles WHERE (id = $1) ORDER BY id");
        assert_eq!(query.params[0].name, "user_id0");
        assert_eq!(query.params[0].value, SearchValue::Integer(42));
    }

    #[test]
    fn values_are_never_interpolated() {
        let hostile = "x'; DROP TABLE profiles; --";
        let query =
            build_search_query(&filters(json!([{"user_last_name": hostile}])), ALL_ROWS).unwrap();

        assert!(!query.sql.contains(hostile));
        assert_eq!(query.params[0].value, SearchValue::Text(hostile.into()));
    }

    #[test]
    fn json_and_timestamp_columns_are_typed() {
        let query = build_search_query(
            &filters(json!([{
                "created_at": "2025-01-02T03:04:05Z",
                "meta": {"tier": "gold"}
            }])),
            ALL_ROWS,
        )
        .unwrap();

        assert_eq!(
            query.params[0].value,
            SearchValue::Timestamp(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
        );
        assert_eq!(query.params[1].value, SearchValue::Json(json!({"tier": "gold"})));
    }

    #[test]
    fn wrong_value_type_is_a_decode_error() {
        let err =
            build_search_query(&filters(json!([{"id": "seven"}])), ALL_ROWS).unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));

        let err = build_search_query(&filters(json!([{"created_at": "yesterday"}])), ALL_ROWS)
            .unwrap_err();
        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn empty_map_matches_everything() {
        let query = build_search_query(&filters(json!([{}])), ALL_ROWS).unwrap();
        assert_eq!(query.sql, "SELECT * FROM profiles WHERE (TRUE) ORDER BY id");
    }
}
