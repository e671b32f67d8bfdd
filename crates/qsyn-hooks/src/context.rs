//! The slice of a service call that validation hooks read and rewrite.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub query: Option<Value>,
    /// Set once `query` has passed a `validate_query` stage.
    #[serde(skip)]
    pub query_validated: bool,
    pub provider: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HookContext {
    pub method: Method,
    pub path: String,
    pub params: Params,
    pub data: Option<Value>,
    /// Set once `data` has passed a `validate_data` stage.
    pub data_validated: bool,
}

impl HookContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::default(),
            data: None,
            data_validated: false,
        }
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.params.query = Some(query);
        self.params.query_validated = false;
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self.data_validated = false;
        self
    }
}
