//! Convenient re-exports for downstream crates.

pub use crate::error::{Error, Result, ValidationError};
pub use crate::id::{object_id, ObjectId};
pub use crate::issue::{Issue, IssueKind, PathSegment};
pub use crate::schema::{
    any, array, boolean, enumeration, integer, literal, number, object, one_of_literals, string,
    union, ObjectSchema,
};
pub use crate::validator::{
    validate_async, IntoSchema, SchemaExt, SchemaRef, Validator, ValidatorExt,
};
