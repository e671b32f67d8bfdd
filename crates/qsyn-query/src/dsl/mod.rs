//! Declarative shape definitions.

pub mod yaml;
