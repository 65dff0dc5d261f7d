//! A test double for the issue assignee endpoints of a repository hosting REST API.
//!
//! The server answers two routes with deterministic, canned JSON responses:
//!
//! - `GET /repos/{owner}/{repo}/issues/{issue_number}`
//! - `POST /repos/{owner}/{repo}/issues/{issue_number}/assignees`
//!
//! Both routes require an `Authorization: Bearer <token>` header. Only the prefix is checked.
//! The fixtures live in [`server::fixtures`] as pure functions, so the matching rules can be
//! exercised without a socket.
//!
//! ```no_run
//! use issuemock::IssueMockServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), issuemock::server::Error> {
//!     IssueMockServerBuilder::new().port(3000).build()?.start().await
//! }
//! ```

pub mod common;
pub mod server;

pub use common::data::{Assignee, ErrorResponse, IssueRef, IssueResponse};
pub use server::{
    builder::IssueMockServerBuilder,
    handler::{Handler, IssueMockHandler},
    server::{MockServer, MockServerConfig, DEFAULT_PORT},
    IssueMockServer,
};
