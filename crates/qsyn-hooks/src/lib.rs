#![forbid(unsafe_code)]
//! qsyn-hooks: validation stages for Feathers-style service pipelines.
//!
//! - `validate_query(schema)`: accept or reject `params.query`.
//! - `validate_data(schema)`: accept or reject `data` (arrays item by item).
//! - `HookChain`: run stages in order, stopping at the first error.
//!
//! Rejections surface as `HookError::BadRequest`, which serializes to the
//! error body Feathers transports send (`code: 400`, issues in `data`).

pub mod context;
pub mod error;
pub mod hooks;

pub use context::{HookContext, Method, Params};
pub use error::{HookError, Result};
pub use hooks::{validate_data, validate_query, Hook, HookChain, ValidateData, ValidateQuery};
