pub mod builder;
pub mod fixtures;
pub mod handler;
#[allow(clippy::module_inception)]
pub mod server;

pub use server::Error;

/// A mock server wired to the canned issue endpoints.
pub type IssueMockServer = server::MockServer<handler::IssueMockHandler>;
