//! Response selection for the two issue endpoints.
//!
//! Everything in here is a pure function of the request's path parameters, headers and body.
//! Nothing is remembered between calls, so the same input always yields the same response.

use crate::common::data::{Assignee, ErrorResponse, IssueRef, IssueResponse};
use http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderMap, StatusCode,
};
use serde::Serialize;
use serde_json::Value;

pub const FIXTURE_OWNER: &str = "test-owner";
pub const FIXTURE_REPO: &str = "test-repo";
pub const UNASSIGNED_ISSUE: &str = "1";
pub const ASSIGNED_ISSUE: &str = "2";
pub const ASSIGNED_LOGIN: &str = "test-user";

pub const BEARER_PREFIX: &str = "Bearer ";
pub const JSON_MEDIA_TYPE: &str = "application/json";

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Missing or invalid Bearer token";
pub const ISSUE_NOT_FOUND_MESSAGE: &str = "Issue not found";
pub const FORBIDDEN_MESSAGE: &str = "Forbidden";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Issue(IssueResponse),
    Error(ErrorResponse),
}

/// A status code paired with the JSON body that goes with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl CannedResponse {
    fn assignees(status: StatusCode, assignees: Vec<Assignee>) -> Self {
        CannedResponse {
            status,
            body: ResponseBody::Issue(IssueResponse { assignees }),
        }
    }

    fn error(status: StatusCode, message: &str) -> Self {
        CannedResponse {
            status,
            body: ResponseBody::Error(ErrorResponse::new(message)),
        }
    }

    fn unauthorized() -> Self {
        Self::error(StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE)
    }
}

/// Only the `Bearer ` prefix is checked, the token itself is never inspected.
/// A header value that is not valid visible ASCII counts as missing.
pub fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(BEARER_PREFIX))
}

/// Bodies are only read when declared as `application/json`. Media type parameters such as
/// `charset` are ignored and the comparison is case-insensitive.
pub fn is_json_body(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}

/// `GET /repos/{owner}/{repo}/issues/{issue_number}`
pub fn get_issue(issue: &IssueRef, headers: &HeaderMap) -> CannedResponse {
    if !is_authorized(headers) {
        return CannedResponse::unauthorized();
    }

    if issue.is(FIXTURE_OWNER, FIXTURE_REPO, UNASSIGNED_ISSUE) {
        CannedResponse::assignees(StatusCode::OK, Vec::new())
    } else if issue.is(FIXTURE_OWNER, FIXTURE_REPO, ASSIGNED_ISSUE) {
        CannedResponse::assignees(StatusCode::OK, vec![Assignee::new(ASSIGNED_LOGIN)])
    } else {
        CannedResponse::error(StatusCode::NOT_FOUND, ISSUE_NOT_FOUND_MESSAGE)
    }
}

/// `POST /repos/{owner}/{repo}/issues/{issue_number}/assignees`
///
/// Succeeds only for the unassigned fixture issue and only when a JSON body carries a non-empty
/// `assignees` array. The created response echoes the first entry as is, the rest are ignored.
/// A body with any other content type is treated as empty.
pub fn add_assignees(issue: &IssueRef, headers: &HeaderMap, body: &[u8]) -> CannedResponse {
    if !is_authorized(headers) {
        return CannedResponse::unauthorized();
    }

    let login = if is_json_body(headers) {
        requested_login(body)
    } else {
        None
    };

    match login {
        Some(login) if issue.is(FIXTURE_OWNER, FIXTURE_REPO, UNASSIGNED_ISSUE) => {
            CannedResponse::assignees(StatusCode::CREATED, vec![Assignee::new(login)])
        }
        _ => CannedResponse::error(StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE),
    }
}

/// Extracts the first entry of the `assignees` array from a JSON request body.
///
/// Returns `None` for an empty or malformed body, a body that is not an object and a missing,
/// non-array or empty `assignees` field.
pub fn requested_login(body: &[u8]) -> Option<Value> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("assignees")?.as_array()?.first().cloned()
}
