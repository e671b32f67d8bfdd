//! Validation issues and the collector validators write them into.
//!
//! Validators never stop at the first problem: they push an `Issue` for every
//! violated path into a `Ctx` and keep walking, so one `validate` call reports
//! the complete list.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step in the path from the validated root to an offending value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(k: &str) -> Self {
        PathSegment::Key(k.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(k: String) -> Self {
        PathSegment::Key(k)
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        PathSegment::Index(i)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "[{i}]"),
            PathSegment::Key(k) => write!(f, "{k}"),
        }
    }
}

/// Coarse taxonomy used by callers that only care about the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Value fails a type or structural constraint.
    SchemaViolation,
    /// Extra property in a strict object.
    UnknownKey,
    /// Numeric bound violated.
    RangeViolation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType { expected: String, received: String },
    InvalidLiteral { expected: Vec<Value> },
    InvalidEnumValue { options: Vec<String>, received: String },
    UnrecognizedKey { key: String },
    TooSmall { minimum: f64, inclusive: bool },
    TooBig { maximum: f64, inclusive: bool },
    Custom { params: Option<Value> },
}

impl IssueCode {
    pub fn kind(&self) -> IssueKind {
        match self {
            IssueCode::UnrecognizedKey { .. } => IssueKind::UnknownKey,
            IssueCode::TooSmall { .. } | IssueCode::TooBig { .. } => IssueKind::RangeViolation,
            _ => IssueKind::SchemaViolation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(flatten)]
    pub code: IssueCode,
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    pub fn kind(&self) -> IssueKind {
        self.code.kind()
    }

    /// Path rendered as `a.b[0].c`; empty for the root.
    pub fn path_string(&self) -> String {
        let mut out = String::new();
        for seg in &self.path {
            match seg {
                PathSegment::Index(_) => out.push_str(&seg.to_string()),
                PathSegment::Key(k) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(k);
                }
            }
        }
        out
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path_string(), self.message)
        }
    }
}

/// Issue collector threaded through a validation pass.
///
/// Tracks the current path so validators only need to name the segment they
/// descend into.
#[derive(Debug, Default)]
pub struct Ctx {
    path: Vec<PathSegment>,
    issues: Vec<Issue>,
}

impl Ctx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue at the current path.
    pub fn report(&mut self, code: IssueCode, message: impl Into<String>) {
        self.issues.push(Issue {
            code,
            path: self.path.clone(),
            message: message.into(),
        });
    }

    pub fn invalid_type(&mut self, expected: &str, value: &Value) {
        let received = type_name(value);
        self.report(
            IssueCode::InvalidType {
                expected: expected.to_string(),
                received: received.to_string(),
            },
            format!("Expected {expected}, received {received}"),
        );
    }

    pub fn required(&mut self, expected: &str) {
        self.report(
            IssueCode::InvalidType {
                expected: expected.to_string(),
                received: "undefined".to_string(),
            },
            "Required",
        );
    }

    /// Run `f` one level deeper in the path.
    pub fn at<R>(&mut self, seg: impl Into<PathSegment>, f: impl FnOnce(&mut Ctx) -> R) -> R {
        self.path.push(seg.into());
        let out = f(self);
        self.path.pop();
        out
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Scratch collector rooted at the current path, for trying union branches.
    pub fn fork(&self) -> Ctx {
        Ctx {
            path: self.path.clone(),
            issues: Vec::new(),
        }
    }

    /// Move a forked collector's issues into this one.
    pub fn absorb(&mut self, other: Ctx) {
        self.issues.extend(other.issues);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

/// zod-style name for the JSON type of `value`.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().unwrap_or(f64::NAN);
            if f.is_nan() {
                "nan"
            } else if f.fract() == 0.0 {
                "number"
            } else {
                "float"
            }
        }
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
