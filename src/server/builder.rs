use crate::server::{
    handler::IssueMockHandler,
    server::{Error, MockServer, MockServerConfig},
    IssueMockServer,
};

/// The `IssueMockServerBuilder` struct is used to configure the issue mock server.
/// Unset options fall back to loopback-only binding and a disabled access log.
/// Without an explicit port the server binds an ephemeral one.
#[derive(Debug, Default)]
pub struct IssueMockServerBuilder {
    port: Option<u16>,
    expose: Option<bool>,
    print_access_log: Option<bool>,
}

impl IssueMockServerBuilder {
    /// Creates a new instance of `IssueMockServerBuilder` with default settings.
    pub fn new() -> Self {
        IssueMockServerBuilder {
            port: None,
            expose: None,
            print_access_log: None,
        }
    }

    /// Sets the port for the mock server.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets whether the server binds to all interfaces instead of `127.0.0.1`.
    pub fn expose(mut self, expose: bool) -> Self {
        self.expose = Some(expose);
        self
    }

    /// Sets whether to print one access log line per request.
    pub fn print_access_log(mut self, enabled: bool) -> Self {
        self.print_access_log = Some(enabled);
        self
    }

    pub fn build(self) -> Result<IssueMockServer, Error> {
        MockServer::new(
            Box::new(IssueMockHandler::new()),
            MockServerConfig {
                static_port: self.port,
                expose: self.expose.unwrap_or(false),
                print_access_log: self.print_access_log.unwrap_or(false),
            },
        )
    }
}
