// address.rs - parsing of "host" / "host:port" strings into server endpoints

use mongodb::options::ServerAddress;
use serde::Deserialize;
use std::{fmt, str::FromStr};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 27017;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address \"{0}\" has an empty host")]
    EmptyHost(String),
    #[error("address \"{0}\" has an invalid port")]
    InvalidPort(String),
    #[error("address \"{0}\" has an unterminated IPv6 literal")]
    UnterminatedIpv6(String),
}

/// A (host, port) pair identifying one database node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl FromStr for Endpoint {
    type Err = AddressError;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let trimmed = address.trim();

        // Bracketed IPv6 literals carry colons inside the host part
        let (host, port) = if let Some(rest) = trimmed.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| AddressError::UnterminatedIpv6(address.to_string()))?;
            match tail {
                "" => (host, None),
                _ => match tail.strip_prefix(':') {
                    Some(port) => (host, Some(port)),
                    None => return Err(AddressError::InvalidPort(address.to_string())),
                },
            }
        } else {
            match trimmed.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (trimmed, None),
            }
        };

        if host.is_empty() {
            return Err(AddressError::EmptyHost(address.to_string()));
        }

        let port = match port {
            None => DEFAULT_PORT,
            Some(port) => match port.parse::<u16>() {
                Ok(port) if port != 0 => port,
                _ => return Err(AddressError::InvalidPort(address.to_string())),
            },
        };

        Ok(Endpoint::new(host, port))
    }
}

impl TryFrom<String> for Endpoint {
    type Error = AddressError;

    fn try_from(address: String) -> Result<Self, Self::Error> {
        address.parse()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl From<Endpoint> for ServerAddress {
    fn from(endpoint: Endpoint) -> Self {
        ServerAddress::Tcp {
            host: endpoint.host,
            port: Some(endpoint.port),
        }
    }
}
