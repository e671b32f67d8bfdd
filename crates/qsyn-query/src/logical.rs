//! `$or` / `$and` over the flat per-field property schema.
//!
//! Nesting is asymmetric: an `$and` element may be a `{ $or: [...] }` group,
//! but `$or` elements are always flat filters.

use serde_json::{json, Value};

use qsyn_core::schema::{object, ObjectSchema};
use qsyn_core::{Ctx, IntoSchema, SchemaExt, SchemaKind, SchemaRef, Validator};

#[derive(Debug, Clone)]
pub struct LogicalSchemas {
    pub or: SchemaRef,
    pub and: SchemaRef,
}

pub fn build_logical_schema(property: SchemaRef) -> LogicalSchemas {
    let or = property.clone().array().optional().into_schema();

    let group = object().field("$or", property.clone().array()).strict();
    let and = AndElement { property, group }
        .array()
        .optional()
        .into_schema();

    LogicalSchemas { or, and }
}

/// One `$and` element: a flat filter or a single `$or` group.
#[derive(Debug, Clone)]
struct AndElement {
    property: SchemaRef,
    group: ObjectSchema,
}

impl Validator for AndElement {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        let is_group = value
            .as_object()
            .is_some_and(|map| map.contains_key("$or"));
        if is_group {
            self.group.check(value, ctx)
        } else {
            self.property.check(value, ctx)
        }
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Union
    }

    fn describe(&self) -> Value {
        json!({ "anyOf": [self.property.describe(), self.group.describe()] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsyn_core::schema::{number, string};
    use qsyn_core::IssueKind;

    fn logical() -> LogicalSchemas {
        let property = object()
            .field("name", string().optional())
            .field("age", number().optional())
            .strict();
        build_logical_schema(property.into_schema())
    }

    #[test]
    fn or_takes_flat_filters_only() {
        let l = logical();
        assert!(l.or.validate(&json!([{ "name": "a" }, { "age": 3 }])).is_ok());

        let err = l.or.validate(&json!([{ "$and": [] }])).unwrap_err();
        assert_eq!(err.issues[0].path_string(), "[0].$and");
        assert_eq!(err.issues[0].kind(), IssueKind::UnknownKey);

        assert!(l.or.validate(&json!([{ "$or": [] }])).is_err());
    }

    #[test]
    fn and_may_embed_one_or_group() {
        let l = logical();
        assert!(l
            .and
            .validate(&json!([{ "name": "a" }, { "$or": [{ "age": 1 }, { "age": 2 }] }]))
            .is_ok());
    }

    #[test]
    fn and_group_is_strict_and_single_level() {
        let l = logical();
        let err = l
            .and
            .validate(&json!([{ "$or": [{ "age": 1 }], "name": "a" }]))
            .unwrap_err();
        assert_eq!(err.issues[0].path_string(), "[0].name");

        let err = l
            .and
            .validate(&json!([{ "$or": [{ "$and": [] }] }]))
            .unwrap_err();
        assert_eq!(err.issues[0].path_string(), "[0].$or[0].$and");

        assert!(l.and.validate(&json!([{ "$and": [] }])).is_err());
    }

    #[test]
    fn group_issues_carry_the_full_path() {
        let err = logical()
            .and
            .validate(&json!([{ "$or": [{ "age": "x" }] }]))
            .unwrap_err();
        assert_eq!(err.issues[0].path_string(), "[0].$or[0].age");
    }
}
