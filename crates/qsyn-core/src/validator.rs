//! The validator contract every schema in qsyn implements.
//!
//! A validator checks a `serde_json::Value`, records every violation into a
//! [`Ctx`], and returns the accepted (possibly coerced) value. Validators are
//! immutable once built and are shared as `Arc<dyn Validator>`.

use std::fmt::Debug;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, ValidationError};
use crate::issue::Ctx;

/// Shared handle to a built validator.
pub type SchemaRef = Arc<dyn Validator>;

/// Structural class of a validator, used to pick the closer branch of a union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Any,
    String,
    Number,
    Boolean,
    Literal,
    Enum,
    Array,
    Object,
    Union,
    ObjectId,
}

impl SchemaKind {
    /// Whether values of this kind can be JSON objects.
    pub fn admits_object(self) -> bool {
        matches!(
            self,
            SchemaKind::Any | SchemaKind::Object | SchemaKind::ObjectId | SchemaKind::Union
        )
    }

    /// Whether `value`'s JSON type is the one this kind is built around.
    pub fn matches_json(self, value: &Value) -> bool {
        match self {
            SchemaKind::Any | SchemaKind::Union => true,
            SchemaKind::String | SchemaKind::Enum => value.is_string(),
            SchemaKind::Number => value.is_number(),
            SchemaKind::Boolean => value.is_boolean(),
            SchemaKind::Literal => !value.is_object() && !value.is_array(),
            SchemaKind::Array => value.is_array(),
            SchemaKind::Object => value.is_object(),
            SchemaKind::ObjectId => value.is_string() || value.is_object(),
        }
    }

    /// Type name used in `Required` issues.
    pub fn name(self) -> &'static str {
        match self {
            SchemaKind::Any => "any",
            SchemaKind::String => "string",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Literal => "literal",
            SchemaKind::Enum => "enum",
            SchemaKind::Array => "array",
            SchemaKind::Object => "object",
            SchemaKind::Union => "union",
            SchemaKind::ObjectId => "objectId",
        }
    }
}

pub trait Validator: Debug + Send + Sync {
    /// Check `value`, reporting every violation into `ctx`.
    ///
    /// Returns `None` exactly when at least one issue was reported.
    fn check(&self, value: &Value, ctx: &mut Ctx) -> Option<Value>;

    fn kind(&self) -> SchemaKind;

    /// Whether an object may omit the key this validator is bound to.
    fn is_optional(&self) -> bool {
        false
    }

    /// Value inserted when the key is missing.
    fn default_value(&self) -> Option<Value> {
        None
    }

    /// JSON description of the accepted shape, used by `explain` and fingerprints.
    fn describe(&self) -> Value;

    /// Validate `value` and return the accepted value or every issue found.
    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let mut ctx = Ctx::new();
        match self.check(value, &mut ctx) {
            Some(out) if !ctx.has_issues() => Ok(out),
            _ => {
                let issues = ctx.into_issues();
                #[cfg(feature = "tracing")]
                tracing::debug!(issues = issues.len(), kind = ?self.kind(), "validation rejected value");
                Err(ValidationError::new(issues))
            }
        }
    }
}

/// Awaitable validation for request pipelines.
///
/// Validation is synchronous; this never suspends.
pub async fn validate_async<V>(schema: &V, value: &Value) -> Result<Value, ValidationError>
where
    V: Validator + ?Sized,
{
    schema.validate(value)
}

/// Typed access on top of the dynamic contract.
pub trait ValidatorExt: Validator {
    /// Validate, then deserialize the accepted value into `T`.
    fn parse<T: DeserializeOwned>(&self, value: &Value) -> Result<T, Error> {
        let accepted = self.validate(value)?;
        Ok(serde_json::from_value(accepted)?)
    }
}

impl<V: Validator + ?Sized> ValidatorExt for V {}

/// Conversion into a shared validator handle.
pub trait IntoSchema {
    fn into_schema(self) -> SchemaRef;
}

impl<V: Validator + 'static> IntoSchema for V {
    fn into_schema(self) -> SchemaRef {
        Arc::new(self)
    }
}

impl IntoSchema for SchemaRef {
    fn into_schema(self) -> SchemaRef {
        self
    }
}

/// Chainable modifiers available on anything that converts into a schema.
pub trait SchemaExt: IntoSchema + Sized {
    /// Accept a missing key.
    fn optional(self) -> crate::schema::OptionalSchema {
        crate::schema::OptionalSchema::new(self.into_schema())
    }

    /// Accept `null`.
    fn nullable(self) -> crate::schema::NullableSchema {
        crate::schema::NullableSchema::new(self.into_schema())
    }

    /// Accept both a missing key and `null`.
    fn nullish(self) -> crate::schema::OptionalSchema {
        self.nullable().optional()
    }

    fn array(self) -> crate::schema::ArraySchema {
        crate::schema::ArraySchema::new(self.into_schema())
    }

    /// Insert `value` when the key is missing.
    fn default_to(self, value: Value) -> crate::schema::DefaultSchema {
        crate::schema::DefaultSchema::new(self.into_schema(), value)
    }
}

impl<T: IntoSchema> SchemaExt for T {}
