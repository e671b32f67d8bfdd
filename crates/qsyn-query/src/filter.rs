//! Splitting an accepted query into field filters and typed directives.
//!
//! Database adapters consume the two halves separately: filters become a
//! `WHERE`/match clause, directives drive projection, ordering and paging.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use qsyn_core::{Error, Result};

use crate::compose::is_directive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl TryFrom<i64> for SortDirection {
    type Error = String;

    fn try_from(v: i64) -> std::result::Result<Self, Self::Error> {
        match v {
            1 => Ok(SortDirection::Asc),
            -1 => Ok(SortDirection::Desc),
            other => Err(format!("sort direction must be 1 or -1, got {other}")),
        }
    }
}

impl From<SortDirection> for i64 {
    fn from(d: SortDirection) -> i64 {
        match d {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDirectives {
    #[serde(rename = "$limit", default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(rename = "$skip", default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(rename = "$sort", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sort: BTreeMap<String, SortDirection>,
    #[serde(rename = "$select", default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,
    #[serde(rename = "$or", default, skip_serializing_if = "Option::is_none")]
    pub or: Option<Vec<Value>>,
    #[serde(rename = "$and", default, skip_serializing_if = "Option::is_none")]
    pub and: Option<Vec<Value>>,
}

impl QueryDirectives {
    /// `$limit: -1` means "no limit".
    pub fn effective_limit(&self) -> Option<u64> {
        self.limit.and_then(|l| u64::try_from(l).ok())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredQuery {
    pub filters: Map<String, Value>,
    pub directives: QueryDirectives,
}

/// Split `query` into filters and directives. Run after validation.
pub fn split_query(query: &Value) -> Result<FilteredQuery> {
    let map = query
        .as_object()
        .ok_or_else(|| Error::Schema(format!("query must be an object, got {query}")))?;

    let (directives, filters): (Map<String, Value>, Map<String, Value>) = map
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .partition(|(k, _)| is_directive(k));

    let directives: QueryDirectives = serde_json::from_value(Value::Object(directives))?;

    #[cfg(feature = "tracing")]
    tracing::trace!(
        filters = filters.len(),
        limit = ?directives.limit,
        "split query"
    );

    Ok(FilteredQuery {
        filters,
        directives,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn separates_filters_from_directives() {
        let q = json!({
            "name": "Dave",
            "age": { "$gt": 42 },
            "$sort": { "age": -1, "name": 1 },
            "$limit": 10,
            "$select": ["name"]
        });
        let split = split_query(&q).unwrap();
        assert_eq!(split.filters.len(), 2);
        assert_eq!(split.filters["age"], json!({ "$gt": 42 }));
        assert_eq!(split.directives.sort["age"], SortDirection::Desc);
        assert_eq!(split.directives.sort["name"], SortDirection::Asc);
        assert_eq!(split.directives.effective_limit(), Some(10));
        assert_eq!(split.directives.select.as_deref(), Some(&["name".to_string()][..]));
        assert!(split.directives.or.is_none());
    }

    #[test]
    fn unlimited_and_empty() {
        let split = split_query(&json!({ "$limit": -1 })).unwrap();
        assert_eq!(split.directives.effective_limit(), None);
        assert!(split.filters.is_empty());

        assert_eq!(split_query(&json!({})).unwrap(), FilteredQuery::default());
    }

    #[test]
    fn directives_serialize_back_to_query_keys() {
        let split = split_query(&json!({ "$sort": { "age": 1 }, "$skip": 5 })).unwrap();
        assert_eq!(
            serde_json::to_value(&split.directives).unwrap(),
            json!({ "$sort": { "age": 1 }, "$skip": 5 })
        );
    }

    #[test]
    fn whole_float_directives_split_after_validation() {
        use crate::compose::compose_query_schema;
        use crate::shape::Shape;
        use qsyn_core::schema::number;
        use qsyn_core::Validator;

        let schema = compose_query_schema(&Shape::new().field("age", number()), None);
        let accepted = schema
            .validate(&json!({ "$limit": 10.0, "$skip": 5.0, "$sort": { "age": 1.0 } }))
            .unwrap();
        let split = split_query(&accepted).unwrap();
        assert_eq!(split.directives.limit, Some(10));
        assert_eq!(split.directives.skip, Some(5));
        assert_eq!(split.directives.sort["age"], SortDirection::Asc);
    }

    #[test]
    fn rejects_non_objects_and_bad_directions() {
        assert!(matches!(split_query(&json!([1])), Err(Error::Schema(_))));
        assert!(split_query(&json!({ "$sort": { "age": 2 } })).is_err());
    }
}
