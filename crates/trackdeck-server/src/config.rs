//! Server configuration.

use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Whether session cookies are marked `Secure`.
    ///
    /// Off by default; deployments behind TLS should turn it on.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            secure_cookies: false,
        }
    }
}

impl ServerConfig {
    /// Creates a new server configuration with the given bind address.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Builder: mark session cookies `Secure`.
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}

/// Returns the default bind address.
///
/// Port 8888 matches the redirect URI most provider dashboards have
/// registered for local development.
pub fn default_bind_addr() -> SocketAddr {
    "127.0.0.1:8888".parse().expect("valid default bind address")
}
