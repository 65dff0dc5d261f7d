use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifies a single issue of a repository, exactly as it appeared in the request path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub owner: String,
    pub repo: String,
    pub issue_number: String,
}

impl IssueRef {
    pub fn new<O, R, N>(owner: O, repo: R, issue_number: N) -> Self
    where
        O: Into<String>,
        R: Into<String>,
        N: Into<String>,
    {
        IssueRef {
            owner: owner.into(),
            repo: repo.into(),
            issue_number: issue_number.into(),
        }
    }

    /// Literal, case-sensitive comparison against a fixture triple.
    pub fn is(&self, owner: &str, repo: &str, issue_number: &str) -> bool {
        self.owner == owner && self.repo == repo && self.issue_number == issue_number
    }
}

impl fmt::Display for IssueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/repos/{}/{}/issues/{}",
            self.owner, self.repo, self.issue_number
        )
    }
}

/// An assignee record. Logins requested by a client are echoed back verbatim, whatever their
/// JSON type, so the login is kept as a raw JSON value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub login: Value,
}

impl Assignee {
    pub fn new<IntoValue: Into<Value>>(login: IntoValue) -> Self {
        Assignee {
            login: login.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueResponse {
    pub assignees: Vec<Assignee>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new<T>(message: &T) -> ErrorResponse
    where
        T: ToString + ?Sized,
    {
        ErrorResponse {
            message: message.to_string(),
        }
    }
}
