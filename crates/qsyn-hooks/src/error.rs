use serde_json::{json, Value};
use thiserror::Error;

use qsyn_core::{Issue, ValidationError};

pub type Result<T> = std::result::Result<T, HookError>;

#[derive(Debug, Error)]
pub enum HookError {
    /// Input rejected by a schema; carries every issue found.
    #[error("{message}")]
    BadRequest { message: String, issues: Vec<Issue> },

    #[error("{0}")]
    General(String),
}

impl From<ValidationError> for HookError {
    fn from(err: ValidationError) -> Self {
        HookError::BadRequest {
            message: err.to_string(),
            issues: err.issues,
        }
    }
}

impl HookError {
    pub fn code(&self) -> u16 {
        match self {
            HookError::BadRequest { .. } => 400,
            HookError::General(_) => 500,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HookError::BadRequest { .. } => "BadRequest",
            HookError::General(_) => "GeneralError",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            HookError::BadRequest { .. } => "bad-request",
            HookError::General(_) => "general-error",
        }
    }

    pub fn issues(&self) -> &[Issue] {
        match self {
            HookError::BadRequest { issues, .. } => issues,
            HookError::General(_) => &[],
        }
    }

    /// Error body as a Feathers REST transport sends it.
    pub fn to_json(&self) -> Value {
        let data = match self {
            HookError::BadRequest { issues, .. } => {
                serde_json::to_value(issues).unwrap_or(Value::Null)
            }
            HookError::General(_) => Value::Null,
        };
        json!({
            "name": self.name(),
            "message": self.to_string(),
            "code": self.code(),
            "className": self.class_name(),
            "data": data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qsyn_core::schema::{object, string};
    use qsyn_core::Validator;

    #[test]
    fn validation_errors_become_bad_requests() {
        let err = object()
            .field("name", string())
            .validate(&json!({ "name": 1 }))
            .unwrap_err();
        let hook_err = HookError::from(err);
        let body = hook_err.to_json();
        assert_eq!(body["code"], 400);
        assert_eq!(body["className"], "bad-request");
        assert_eq!(body["data"][0]["path"], json!(["name"]));
        assert_eq!(body["data"][0]["code"], "invalid_type");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("Expected string, received number"));
    }
}
