//! Validation stages for a service-call pipeline.
//!
//! A stage runs before the service method, rewrites the context with the
//! accepted value, and either lets the chain continue or stops it with a
//! [`HookError`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use qsyn_core::{validate_async, IntoSchema, SchemaRef, ValidationError};

use crate::context::HookContext;
use crate::error::Result;

#[async_trait]
pub trait Hook: Send + Sync {
    async fn run(&self, ctx: &mut HookContext) -> Result<()>;
}

/// Replaces `params.query` with the accepted query.
#[derive(Debug, Clone)]
pub struct ValidateQuery {
    schema: SchemaRef,
}

pub fn validate_query(schema: impl IntoSchema) -> ValidateQuery {
    ValidateQuery {
        schema: schema.into_schema(),
    }
}

#[async_trait]
impl Hook for ValidateQuery {
    async fn run(&self, ctx: &mut HookContext) -> Result<()> {
        let empty = Value::Object(Default::default());
        let raw = ctx.params.query.as_ref().unwrap_or(&empty);

        let query = match validate_async(self.schema.as_ref(), raw).await {
            Ok(query) => query,
            Err(e) => return Err(rejected(ctx, "query", e)),
        };

        ctx.params.query = Some(query);
        ctx.params.query_validated = true;
        Ok(())
    }
}

/// Replaces `data` with the accepted value; arrays are checked per item.
#[derive(Debug, Clone)]
pub struct ValidateData {
    schema: SchemaRef,
}

pub fn validate_data(schema: impl IntoSchema) -> ValidateData {
    ValidateData {
        schema: schema.into_schema(),
    }
}

impl ValidateData {
    async fn accept(&self, data: &Value) -> std::result::Result<Value, ValidationError> {
        let Value::Array(items) = data else {
            return validate_async(self.schema.as_ref(), data).await;
        };

        let mut accepted = Vec::with_capacity(items.len());
        let mut issues = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            match validate_async(self.schema.as_ref(), item).await {
                Ok(v) => accepted.push(v),
                Err(e) => issues.extend(e.prefixed(idx.into()).issues),
            }
        }
        if issues.is_empty() {
            Ok(Value::Array(accepted))
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

#[async_trait]
impl Hook for ValidateData {
    async fn run(&self, ctx: &mut HookContext) -> Result<()> {
        let raw = ctx.data.clone().unwrap_or(Value::Null);
        let data = match self.accept(&raw).await {
            Ok(data) => data,
            Err(e) => return Err(rejected(ctx, "data", e)),
        };

        ctx.data = Some(data);
        ctx.data_validated = true;
        Ok(())
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn rejected(ctx: &HookContext, what: &str, err: ValidationError) -> crate::error::HookError {
    #[cfg(feature = "tracing")]
    tracing::debug!(
        path = %ctx.path,
        method = ?ctx.method,
        issues = err.len(),
        "{what} rejected"
    );
    err.into()
}

/// Stages run in order; the first error stops the chain.
#[derive(Clone, Default)]
pub struct HookChain {
    stages: Vec<Arc<dyn Hook>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, hook: impl Hook + 'static) -> Self {
        self.stages.push(Arc::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for HookChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookChain")
            .field("stages", &self.stages.len())
            .finish()
    }
}

#[async_trait]
impl Hook for HookChain {
    async fn run(&self, ctx: &mut HookContext) -> Result<()> {
        for stage in &self.stages {
            stage.run(ctx).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Method;
    use crate::error::HookError;
    use qsyn_core::schema::{number, object, string};
    use serde_json::json;

    fn person() -> qsyn_core::schema::ObjectSchema {
        object().field("name", string()).field("age", number()).strict()
    }

    #[tokio::test]
    async fn accepted_query_is_marked_validated() {
        let mut ctx = HookContext::new(Method::Find, "people").with_query(json!({ "name": "Ann" }));
        validate_query(person().partial()).run(&mut ctx).await.unwrap();
        assert!(ctx.params.query_validated);
        assert_eq!(ctx.params.query, Some(json!({ "name": "Ann" })));
    }

    #[tokio::test]
    async fn missing_query_validates_as_empty_object() {
        let mut ctx = HookContext::new(Method::Find, "people");
        validate_query(person().partial()).run(&mut ctx).await.unwrap();
        assert_eq!(ctx.params.query, Some(json!({})));
    }

    #[tokio::test]
    async fn rejected_query_is_a_bad_request() {
        let mut ctx = HookContext::new(Method::Find, "people").with_query(json!({ "name": 1 }));
        let err = validate_query(person().partial())
            .run(&mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, HookError::BadRequest { .. }));
        assert!(err.to_string().contains("Expected string, received number"));
        assert!(!ctx.params.query_validated);
    }

    #[tokio::test]
    async fn array_data_reports_issues_per_item() {
        let mut ctx = HookContext::new(Method::Create, "people").with_data(json!([
            { "name": "Ann", "age": 3 },
            { "name": 2, "age": 4 },
            { "age": "x" }
        ]));
        let err = validate_data(person()).run(&mut ctx).await.unwrap_err();
        let paths: Vec<String> = err.issues().iter().map(|i| i.path_string()).collect();
        assert_eq!(paths, vec!["[1].name", "[2].name", "[2].age"]);
        assert!(!ctx.data_validated);
    }

    #[tokio::test]
    async fn chain_runs_stages_in_order_and_stops_on_error() {
        let chain = HookChain::new()
            .then(validate_query(person().partial()))
            .then(validate_data(person()));

        let mut ok = HookContext::new(Method::Create, "people")
            .with_data(json!({ "name": "Ann", "age": 3 }));
        chain.run(&mut ok).await.unwrap();
        assert!(ok.params.query_validated && ok.data_validated);

        let mut bad = HookContext::new(Method::Create, "people")
            .with_query(json!({ "nope": true }))
            .with_data(json!({ "name": "Ann", "age": 3 }));
        assert!(chain.run(&mut bad).await.is_err());
        assert!(!bad.data_validated);
    }
}
