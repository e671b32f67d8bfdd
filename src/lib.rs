#![forbid(unsafe_code)]
//! qsyn: Feathers-style query syntax validation.
//!
//! Re-exports the workspace crates under one roof:
//! - [`qsyn_core`]: validator contract, primitive schemas, `ObjectId`, app config
//! - [`qsyn_query`]: query-schema composition from a record shape
//! - [`qsyn_hooks`]: request-pipeline validation stages
//!
//! ```
//! use qsyn::prelude::*;
//! use serde_json::json;
//!
//! let people = compose_query_schema(
//!     &Shape::new().field("name", string()).field("age", number()),
//!     None,
//! );
//! assert!(people.validate(&json!({ "age": { "$gt": 42 }, "$limit": 10 })).is_ok());
//! assert!(people.validate(&json!({ "name": 1 })).is_err());
//! ```

pub use qsyn_core;
pub use qsyn_hooks;
pub use qsyn_query;

pub mod prelude {
    pub use qsyn_core::prelude::*;
    pub use qsyn_hooks::{validate_data, validate_query, Hook, HookChain, HookContext, HookError};
    pub use qsyn_query::{
        compose_query_schema, parse_yaml_shape, query_syntax, split_query, Extensions,
        QuerySchema, Shape,
    };
}
