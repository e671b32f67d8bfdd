//! Per-field operator schemas.
//!
//! A field in a query is either a bare value (shorthand equality, `null`
//! allowed) or a strict operator object:
//!
//! ```text
//! { $ne?: T | null, $gt?: T, $gte?: T, $lt?: T, $lte?: T,
//!   $in?: (T | null)[], $nin?: (T | null)[], ...extensions }
//! ```

use serde_json::{json, Value};

use qsyn_core::schema::{object, ObjectSchema};
use qsyn_core::{Ctx, IntoSchema, SchemaExt, SchemaKind, SchemaRef, Validator};

/// Comparison operators every field accepts.
pub const BUILTIN_OPERATORS: [&str; 7] = ["$ne", "$gt", "$gte", "$lt", "$lte", "$in", "$nin"];

/// Equality-or-operator-object validator for one field.
#[derive(Debug, Clone)]
pub struct OperatorSchema {
    base: SchemaRef,
    equality: SchemaRef,
    operators: ObjectSchema,
}

/// Derive the operator schema for `field`, adding `extension` operators.
///
/// Extension operators are optional like the builtins; one named like a
/// builtin replaces it.
pub fn build_field_operator_schema(
    field: SchemaRef,
    extension: Option<&[(String, SchemaRef)]>,
) -> OperatorSchema {
    let mut operators = object()
        .field("$ne", field.clone().nullable().optional())
        .field("$gt", NonNull::new(field.clone()).optional())
        .field("$gte", NonNull::new(field.clone()).optional())
        .field("$lt", NonNull::new(field.clone()).optional())
        .field("$lte", NonNull::new(field.clone()).optional())
        .field("$in", field.clone().nullable().array().optional())
        .field("$nin", field.clone().nullable().array().optional());

    for (op, schema) in extension.unwrap_or_default() {
        operators = operators.field(op.clone(), schema.clone().optional());
    }

    OperatorSchema {
        equality: field.clone().nullable().into_schema(),
        base: field,
        operators: operators.strict(),
    }
}

impl OperatorSchema {
    /// Builtin and extension operator names accepted by this field.
    pub fn operator_names(&self) -> impl Iterator<Item = &str> {
        self.operators.keys()
    }

    pub fn is_operator(&self, key: &str) -> bool {
        self.operators.get(key).is_some()
    }

    pub fn base(&self) -> &SchemaRef {
        &self.base
    }

    /// An object naming a known operator is only ever an operator object.
    fn names_operator(&self, value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|map| map.keys().any(|k| self.is_operator(k)))
    }
}

impl Validator for OperatorSchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        if self.names_operator(value) {
            return self.operators.check(value, ctx);
        }

        let mut equality = ctx.fork();
        if let Some(v) = self.equality.check(value, &mut equality) {
            return Some(v);
        }
        let mut operators = ctx.fork();
        if let Some(v) = self.operators.check(value, &mut operators) {
            return Some(v);
        }

        // Report the branch that is structurally closer to what was sent: an
        // object is an operator object unless the field itself holds objects.
        if value.is_object() && !self.base.kind().admits_object() {
            ctx.absorb(operators);
        } else {
            ctx.absorb(equality);
        }
        None
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Union
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn describe(&self) -> Value {
        json!({ "anyOf": [self.equality.describe(), self.operators.describe()] })
    }
}

/// Range operand: the field's type with `null` ruled out, even for nullable fields.
#[derive(Debug, Clone)]
struct NonNull {
    inner: SchemaRef,
}

impl NonNull {
    fn new(inner: SchemaRef) -> Self {
        Self { inner }
    }
}

impl Validator for NonNull {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        if value.is_null() {
            ctx.invalid_type(self.inner.kind().name(), value);
            return None;
        }
        self.inner.check(value, ctx)
    }

    fn kind(&self) -> SchemaKind {
        self.inner.kind()
    }

    fn describe(&self) -> Value {
        let mut desc = self.inner.describe();
        if let Some(obj) = desc.as_object_mut() {
            obj.remove("nullable");
        }
        desc
    }
}
