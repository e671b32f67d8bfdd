use thiserror::Error;

use crate::issue::Issue;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Hashing error: {0}")]
    Hash(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Schema(e.to_string())
    }
}

/// Aggregate failure of a single `validate` call.
///
/// Carries every issue found, in the order the validator visited them.
/// There is never a partially validated value alongside it.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
#[error("{}", render_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Prefix every issue path with `segment` (used when validating array items).
    pub fn prefixed(mut self, segment: crate::issue::PathSegment) -> Self {
        for issue in &mut self.issues {
            issue.path.insert(0, segment.clone());
        }
        self
    }
}

fn render_issues(issues: &[Issue]) -> String {
    match issues {
        [] => "validation failed".to_string(),
        [one] => one.to_string(),
        many => {
            let parts: Vec<String> = many.iter().map(|i| i.to_string()).collect();
            format!("{} issues: {}", many.len(), parts.join("; "))
        }
    }
}
