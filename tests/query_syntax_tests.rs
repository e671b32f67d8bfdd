//! Query syntax end-to-end: composing schemas from shapes and validating queries.

use qsyn::prelude::*;
use qsyn::qsyn_core::IssueKind;
use serde_json::{json, Value};

fn people() -> QuerySchema {
    compose_query_schema(
        &Shape::new().field("name", string()).field("age", number()),
        None,
    )
}

/// Shapes paired with a sample value of each field's base type.
fn sample_shapes() -> Vec<(Shape, Vec<(&'static str, Value)>)> {
    vec![
        (Shape::new(), vec![]),
        (
            Shape::new().field("name", string()).field("age", number()),
            vec![("name", json!("Dave")), ("age", json!(42))],
        ),
        (
            Shape::new()
                .field("active", boolean())
                .field("count", integer())
                .field("tags", array(string()))
                .field("ownerId", object_id())
                .field("meta", any()),
            vec![
                ("active", json!(true)),
                ("count", json!(3)),
                ("tags", json!(["a", "b"])),
                ("ownerId", json!("507f1f77bcf86cd799439011")),
                ("meta", json!(7)),
            ],
        ),
    ]
}

#[test]
fn test_empty_query_is_always_valid() {
    for (shape, _) in sample_shapes() {
        let schema = compose_query_schema(&shape, None);
        assert_eq!(schema.validate(&json!({})).unwrap(), json!({}));
    }
}

#[test]
fn test_equality_form_for_every_field() {
    for (shape, samples) in sample_shapes() {
        let schema = compose_query_schema(&shape, None);
        for (field, value) in samples {
            let query = json!({ field: value });
            assert!(
                schema.validate(&query).is_ok(),
                "equality on {field} should validate"
            );
        }
    }
}

#[test]
fn test_unknown_operator_rejected_for_every_field() {
    for (shape, samples) in sample_shapes() {
        let schema = compose_query_schema(&shape, None);
        for (field, value) in samples {
            let query = json!({ field: { "$gt": value, "$unknownOp": 1 } });
            let err = schema.validate(&query).unwrap_err();
            assert!(
                err.issues
                    .iter()
                    .any(|i| i.kind() == IssueKind::UnknownKey
                        && i.path_string() == format!("{field}.$unknownOp")),
                "{field}: {err}"
            );
        }
    }
}

#[test]
fn test_select_accepts_only_shape_keys() {
    let schema = people();
    assert!(schema.validate(&json!({ "$select": ["name"] })).is_ok());
    assert!(schema.validate(&json!({ "$select": [] })).is_ok());

    let err = schema
        .validate(&json!({ "$select": ["nonexistent"] }))
        .unwrap_err();
    assert_eq!(err.issues[0].path_string(), "$select[0]");
}

#[test]
fn test_sort_accepts_only_unit_directions() {
    let schema = people();
    assert!(schema.validate(&json!({ "$sort": { "age": -1, "name": 1 } })).is_ok());
    assert!(schema.validate(&json!({ "$sort": { "age": 2 } })).is_err());
    assert!(schema.validate(&json!({ "$sort": { "height": 1 } })).is_err());
}

#[test]
fn test_or_elements_are_flat() {
    let schema = people();
    assert!(schema
        .validate(&json!({ "$or": [{ "name": "Ann" }, { "age": { "$lt": 5 } }] }))
        .is_ok());
    assert!(schema.validate(&json!({ "$or": [{ "$and": [] }] })).is_err());
    assert!(schema
        .validate(&json!({ "$or": [{ "$or": [{ "name": "Ann" }] }] }))
        .is_err());
}

#[test]
fn test_and_may_group_one_level_of_or() {
    let schema = people();
    assert!(schema
        .validate(&json!({ "$and": [{ "$or": [{ "age": 3 }] }, { "name": "Ann" }] }))
        .is_ok());

    let err = schema
        .validate(&json!({ "$and": [{ "$or": [{ "age": "three" }] }] }))
        .unwrap_err();
    assert_eq!(err.issues[0].path_string(), "$and[0].$or[0].age");

    assert!(schema
        .validate(&json!({ "$and": [{ "$and": [{ "age": 3 }] }] }))
        .is_err());
}

#[test]
fn test_limit_and_skip_bounds() {
    let schema = people();
    for limit in [-1, 0, 1, 500] {
        assert!(schema.validate(&json!({ "$limit": limit })).is_ok());
    }
    let err = schema.validate(&json!({ "$limit": -2 })).unwrap_err();
    assert_eq!(err.issues[0].kind(), IssueKind::RangeViolation);
    assert_eq!(
        err.issues[0].message,
        "Number must be greater than or equal to -1"
    );

    assert!(schema.validate(&json!({ "$skip": 0 })).is_ok());
    assert!(schema.validate(&json!({ "$skip": -1 })).is_err());
}

#[test]
fn test_scenario_full_query_round_trips() {
    let query = json!({
        "name": "Dave",
        "age": { "$gt": 42, "$in": [50, 51] },
        "$select": ["age", "name"],
        "$sort": { "age": 1 }
    });
    assert_eq!(people().validate(&query).unwrap(), query);
}

#[test]
fn test_scenario_wrong_type_reports_field_path() {
    let err = people().validate(&json!({ "name": 1 })).unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].path, vec![PathSegment::from("name")]);
    assert_eq!(err.issues[0].message, "Expected string, received number");
}

#[test]
fn test_scenario_extension_operators() {
    let ext = Extensions::new().operator("age", "$notNull", boolean());
    let schema = compose_query_schema(
        &Shape::new().field("name", string()).field("age", number()),
        Some(&ext),
    );
    assert!(schema
        .validate(&json!({ "age": { "$gt": 10, "$notNull": true } }))
        .is_ok());
    assert!(schema.validate(&json!({ "age": { "$bogus": 1 } })).is_err());
    // scoped to the declaring field
    assert!(schema
        .validate(&json!({ "name": { "$notNull": true } }))
        .is_err());
}

#[test]
fn test_shapeless_schema_only_paginates() {
    let schema = compose_query_schema(&Shape::new(), None);
    assert!(schema.validate(&json!({ "$limit": 10, "$skip": 20 })).is_ok());
    assert!(schema.validate(&json!({ "$sort": {} })).is_ok());
    assert!(schema.validate(&json!({ "anything": 1 })).is_err());
    assert!(schema.validate(&json!({ "$select": ["x"] })).is_err());
}

#[test]
fn test_object_id_fields_are_coerced() {
    let schema = compose_query_schema(&Shape::new().field("userId", object_id()), None);
    let out = schema
        .validate(&json!({
            "userId": { "$in": ["507F1F77BCF86CD799439011", null] }
        }))
        .unwrap();
    assert_eq!(
        out["userId"]["$in"],
        json!([{ "$oid": "507f1f77bcf86cd799439011" }, null])
    );
    assert!(schema.validate(&json!({ "userId": "not-an-id" })).is_err());
}

#[test]
fn test_query_syntax_from_record_schema() {
    let record = object().field("title", string()).field("done", boolean());
    let schema = query_syntax(&record, None);
    assert_eq!(schema.field_names(), ["title", "done"]);
    assert!(schema.validate(&json!({ "done": false, "$limit": 1 })).is_ok());
}

#[test]
fn test_schema_is_shareable_across_threads() {
    let schema = std::sync::Arc::new(people());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let schema = schema.clone();
            std::thread::spawn(move || schema.validate(&json!({ "age": i })).is_ok())
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap());
    }
}

#[test]
fn test_typed_parse_and_split() {
    #[derive(serde::Deserialize)]
    struct Paging {
        #[serde(rename = "$limit")]
        limit: i64,
    }
    let schema = people();
    let paging: Paging = schema.parse(&json!({ "$limit": 25, "name": "x" })).unwrap();
    assert_eq!(paging.limit, 25);

    let accepted = schema
        .validate(&json!({ "name": "x", "$skip": 10 }))
        .unwrap();
    let split = split_query(&accepted).unwrap();
    assert_eq!(split.filters.len(), 1);
    assert_eq!(split.directives.skip, Some(10));
}

#[test]
fn test_nullable_field_range_operators_reject_null() {
    let schema = compose_query_schema(&Shape::new().field("age", number().nullable()), None);
    assert!(schema.validate(&json!({ "age": null })).is_ok());
    let err = schema
        .validate(&json!({ "age": { "$gt": null } }))
        .unwrap_err();
    assert_eq!(err.issues[0].path_string(), "age.$gt");
}

#[test]
fn test_whole_float_directives_survive_split() {
    let accepted = people()
        .validate(&json!({ "$limit": 10.0, "$sort": { "age": 1.0 } }))
        .unwrap();
    assert_eq!(accepted, json!({ "$limit": 10, "$sort": { "age": 1 } }));
    let split = split_query(&accepted).unwrap();
    assert_eq!(split.directives.effective_limit(), Some(10));
}

#[tokio::test]
async fn test_async_validation_matches_sync() {
    let schema = people();
    let q = json!({ "name": "Ann", "$limit": -1 });
    assert_eq!(
        schema.validate_async(&q).await.unwrap(),
        schema.validate(&q).unwrap()
    );
}
