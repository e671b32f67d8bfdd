//! `$sort`: per-field direction, `1` ascending or `-1` descending.

use qsyn_core::schema::{object, one_of_literals, ObjectSchema};
use qsyn_core::SchemaExt;

use crate::shape::Shape;

/// Strict object mapping each declared field to an optional `1 | -1`.
pub fn build_sort_schema(shape: &Shape) -> ObjectSchema {
    shape
        .keys()
        .fold(object(), |sort, key| {
            sort.field(key, one_of_literals([1, -1]).optional())
        })
        .strict()
}
