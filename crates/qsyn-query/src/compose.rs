//! Composition of the complete query schema for a shape.
//!
//! ```text
//! {
//!   $select?, $sort?, $limit?: int >= -1, $skip?: int >= 0,
//!   $or?: Property[], $and?: (Property | { $or: Property[] })[],
//!   ...Property
//! }
//! ```
//!
//! where `Property` is the strict object of per-field operator schemas. Every
//! level is strict, so unknown keys anywhere are reported.

use std::sync::Arc;

use serde_json::Value;

use qsyn_core::hash::{fingerprint, Hash256};
use qsyn_core::schema::{integer, object, ObjectSchema};
use qsyn_core::{validate_async, Ctx, SchemaExt, SchemaKind, ValidationError, Validator};

use crate::logical::build_logical_schema;
use crate::operators::build_field_operator_schema;
use crate::select::build_select_schema;
use crate::shape::{Extensions, Shape};
use crate::sort::build_sort_schema;

/// Top-level keys reserved for query directives.
pub const DIRECTIVES: [&str; 6] = ["$select", "$sort", "$limit", "$skip", "$or", "$and"];

pub fn is_directive(key: &str) -> bool {
    DIRECTIVES.contains(&key)
}

/// Shape fields that can appear as filters (directive names are shadowed).
fn filterable(shape: &Shape) -> Shape {
    shape
        .fields()
        .iter()
        .filter(|(name, _)| {
            let reserved = is_directive(name);
            #[cfg(feature = "tracing")]
            {
                if reserved {
                    tracing::warn!(field = %name, "field shadowed by query directive");
                }
            }
            !reserved
        })
        .map(|(name, schema)| (name.clone(), schema.clone()))
        .collect()
}

/// Strict object of `field -> operator schema` for every filterable field.
pub fn build_query_properties(shape: &Shape, extensions: Option<&Extensions>) -> ObjectSchema {
    #[cfg(feature = "tracing")]
    {
        if let Some(ext) = extensions {
            for field in ext.fields().filter(|f| !shape.contains(f)) {
                tracing::warn!(field = %field, "operator extension for unknown field ignored");
            }
        }
    }

    filterable(shape)
        .fields()
        .iter()
        .fold(object(), |props, (name, schema)| {
            let ext = extensions.and_then(|e| e.for_field(name));
            props.field(name.clone(), build_field_operator_schema(schema.clone(), ext))
        })
        .strict()
}

/// Immutable, shareable validator for one (shape, extensions) pair.
#[derive(Debug, Clone)]
pub struct QuerySchema {
    fields: Vec<String>,
    properties: Arc<ObjectSchema>,
    schema: ObjectSchema,
}

pub fn compose_query_schema(shape: &Shape, extensions: Option<&Extensions>) -> QuerySchema {
    let filters = filterable(shape);
    let properties = Arc::new(build_query_properties(&filters, extensions));
    let logical = build_logical_schema(properties.clone());

    let directives = object()
        .field("$select", build_select_schema(&filters))
        .field("$sort", build_sort_schema(&filters).optional())
        .field("$limit", integer().min(-1.0).optional())
        .field("$skip", integer().min(0.0).optional())
        .field("$or", logical.or)
        .field("$and", logical.and);

    let schema = properties
        .fields()
        .iter()
        .fold(directives, |schema, (name, op)| {
            schema.field(name.clone(), op.clone())
        })
        .strict();

    #[cfg(feature = "tracing")]
    tracing::debug!(
        fields = filters.len(),
        extended = extensions.map_or(0, |e| e.fields().count()),
        "composed query schema"
    );

    QuerySchema {
        fields: filters.keys().map(str::to_string).collect(),
        properties,
        schema,
    }
}

/// Build from an object schema's fields, the way record schemas are usually declared.
pub fn query_syntax(record: &ObjectSchema, extensions: Option<&Extensions>) -> QuerySchema {
    compose_query_schema(&Shape::from(record), extensions)
}

impl QuerySchema {
    /// Filterable field names, in shape order.
    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// The flat per-field filter object used inside `$or` / `$and`.
    pub fn property_schema(&self) -> &ObjectSchema {
        &self.properties
    }

    pub fn as_object(&self) -> &ObjectSchema {
        &self.schema
    }

    pub fn fingerprint(&self) -> qsyn_core::Result<Hash256> {
        fingerprint(&self.schema)
    }

    /// Awaitable form of [`Validator::validate`] for request pipelines.
    pub async fn validate_async(&self, query: &Value) -> Result<Value, ValidationError> {
        validate_async(self, query).await
    }
}

impl Validator for QuerySchema {
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value> {
        self.schema.check(value, ctx)
    }

    fn kind(&self) -> SchemaKind {
        SchemaKind::Object
    }

    fn describe(&self) -> Value {
        self.schema.describe()
    }
}
