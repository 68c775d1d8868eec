//! Endpoint parsing for `tcp://` addresses.
//!
//! Accepts the same host forms a libzmq `bind`/`connect` string uses for TCP:
//! IP literals, `localhost`, and the `*` wildcard for all interfaces.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

/// Transport endpoint address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// TCP transport: `tcp://host:port`
    Tcp(SocketAddr),
}

impl Endpoint {
    /// Parse an endpoint from a string.
    ///
    /// Supported formats:
    /// - `tcp://127.0.0.1:5560`
    /// - `tcp://[::1]:5560` (IPv6)
    /// - `tcp://*:5560` (all interfaces)
    /// - `tcp://localhost:5560`
    ///
    /// # Examples
    ///
    /// ```
    /// use hwserver_core::endpoint::Endpoint;
    ///
    /// let endpoint = Endpoint::parse("tcp://*:5560").unwrap();
    /// assert_eq!(endpoint.to_string(), "tcp://0.0.0.0:5560");
    /// ```
    pub fn parse(s: &str) -> Result<Self, EndpointError> {
        s.parse()
    }

    /// The socket address to bind or connect to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        match self {
            Endpoint::Tcp(addr) => *addr,
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(addr) = s.strip_prefix("tcp://") else {
            return Err(EndpointError::InvalidScheme(s.to_string()));
        };

        if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
            return Ok(Endpoint::Tcp(socket_addr));
        }

        let (host, port) = addr
            .rsplit_once(':')
            .ok_or_else(|| EndpointError::InvalidTcpAddress(addr.to_string()))?;
        let port = port
            .parse::<u16>()
            .map_err(|_| EndpointError::InvalidTcpAddress(addr.to_string()))?;

        let ip = match host {
            "*" => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            "localhost" => IpAddr::V4(Ipv4Addr::LOCALHOST),
            _ => return Err(EndpointError::InvalidTcpAddress(addr.to_string())),
        };

        Ok(Endpoint::Tcp(SocketAddr::new(ip, port)))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}

/// Errors that can occur when parsing endpoints.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Invalid scheme in endpoint: {0} (expected tcp://)")]
    InvalidScheme(String),

    #[error("Invalid TCP address: {0}")]
    InvalidTcpAddress(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp_ipv4() {
        let endpoint = Endpoint::parse("tcp://127.0.0.1:5560").unwrap();
        assert_eq!(endpoint.to_string(), "tcp://127.0.0.1:5560");
    }

    #[test]
    fn test_parse_tcp_ipv6() {
        let endpoint = Endpoint::parse("tcp://[::1]:5560").unwrap();
        assert_eq!(endpoint.socket_addr().port(), 5560);
        assert!(endpoint.socket_addr().is_ipv6());
    }

    #[test]
    fn test_parse_wildcard() {
        let endpoint = Endpoint::parse("tcp://*:5560").unwrap();
        assert_eq!(
            endpoint.socket_addr(),
            SocketAddr::from(([0, 0, 0, 0], 5560))
        );
    }

    #[test]
    fn test_parse_localhost() {
        let endpoint = Endpoint::parse("tcp://localhost:5560").unwrap();
        assert_eq!(
            endpoint.socket_addr(),
            SocketAddr::from(([127, 0, 0, 1], 5560))
        );
    }

    #[test]
    fn test_invalid_scheme() {
        let result = Endpoint::parse("ipc:///tmp/hw.sock");
        assert!(matches!(result, Err(EndpointError::InvalidScheme(_))));
    }

    #[test]
    fn test_invalid_tcp_address() {
        assert!(matches!(
            Endpoint::parse("tcp://invalid:port"),
            Err(EndpointError::InvalidTcpAddress(_))
        ));
        assert!(matches!(
            Endpoint::parse("tcp://*"),
            Err(EndpointError::InvalidTcpAddress(_))
        ));
        assert!(matches!(
            Endpoint::parse("tcp://example.com:5560"),
            Err(EndpointError::InvalidTcpAddress(_))
        ));
    }
}
