#![forbid(unsafe_code)]
//! qsyn-core: the validator contract shared by every qsyn crate.
//!
//! - `Validator` + `Ctx`: check a `serde_json::Value`, collect *all* issues.
//! - Primitive validators (`schema`) for describing record shapes.
//! - `ObjectId` coercion (`id`) and app-configuration schemas (`config`).
//! - Description fingerprints (`hash`).
//!
//! No async runtime and no I/O here.

pub mod config;
pub mod error;
pub mod hash;
pub mod id;
pub mod issue;
pub mod prelude;
pub mod schema;
pub mod validator;

pub use error::{Error, Result, ValidationError};
pub use issue::{Ctx, Issue, IssueCode, IssueKind, PathSegment};
pub use validator::{
    validate_async, IntoSchema, SchemaExt, SchemaKind, SchemaRef, Validator, ValidatorExt,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
