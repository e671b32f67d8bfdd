//! `$select`: projection as a list of declared field names.

use qsyn_core::schema::{enumeration, OptionalSchema};
use qsyn_core::SchemaExt;

use crate::shape::Shape;

/// Optional array of declared names. Order and duplicates are kept as sent.
pub fn build_select_schema(shape: &Shape) -> OptionalSchema {
    enumeration(shape.keys()).array().optional()
}
