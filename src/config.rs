use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::Credentials;

/// Port the fixture listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 8080;

/// Realm named in the Basic-Auth challenge unless told otherwise.
pub const DEFAULT_REALM: &str = "mydomain.com";

/// Settings for a [FixtureServer](crate::FixtureServer).
///
/// A port of `0` binds an ephemeral port; the bound address is available from
/// the server once it has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub credentials: Credentials,
    pub realm: String,
    pub keep_alive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            credentials: Credentials::default(),
            realm: DEFAULT_REALM.to_string(),
            keep_alive: true,
        }
    }
}

impl Config {
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns `http://<host>:<port>` for the configured address.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.socket_addr())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
        assert_eq!(config.credentials, Credentials::new("user", "password"));
        assert_eq!(config.realm, "mydomain.com");
        assert!(config.keep_alive);
    }

    #[test]
    fn builder_overrides() {
        let config = Config::default()
            .with_port(9090)
            .with_realm("fixture")
            .with_credentials(Credentials::new("admin", "secret"))
            .with_keep_alive(false);
        assert_eq!(config.socket_addr(), SocketAddr::from(([127, 0, 0, 1], 9090)));
        assert_eq!(config.realm, "fixture");
        assert_eq!(config.credentials.username, "admin");
        assert!(!config.keep_alive);
    }
}
