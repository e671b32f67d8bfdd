#![forbid(unsafe_code)]
//! qsyn-query: derive a Feathers-style query validator from a record shape.
//!
//! Design:
//! - A `Shape` is an ordered list of `(field, validator)` pairs; `Extensions`
//!   add per-field operators such as `$ilike`.
//! - Builders derive each sub-schema in one pass:
//!     * `operators`: equality-or-operator-object per field
//!     * `sort` / `select`: directives keyed by the shape's field names
//!     * `logical`: `$or` / `$and` over the flat property schema
//!     * `compose`: the strict top-level object merging all of the above
//! - `filter` splits an accepted query into filters and typed directives.
//! - `dsl::yaml` reads shapes from YAML for the CLI and tests.
//!
//! Built schemas are immutable and `Send + Sync`; share them behind `Arc`.

pub mod compose;
pub mod dsl;
pub mod filter;
pub mod logical;
pub mod operators;
pub mod select;
pub mod shape;
pub mod sort;

pub use compose::{build_query_properties, compose_query_schema, query_syntax, QuerySchema};
pub use dsl::yaml::{parse_yaml_shape, DslError, ParsedShape};
pub use filter::{split_query, FilteredQuery, QueryDirectives, SortDirection};
pub use logical::{build_logical_schema, LogicalSchemas};
pub use operators::{build_field_operator_schema, OperatorSchema};
pub use select::build_select_schema;
pub use shape::{Extensions, Shape};
pub use sort::build_sort_schema;
