use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the connection bootstrap this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Connects to a listening peer.
    Client,
    /// Binds, listens and waits for exactly one peer.
    Server,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Server => write!(f, "server"),
        }
    }
}

/// The network location of the link and the direction it is bootstrapped in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    address: String,
    port: u16,
    role: Role,
}

impl Endpoint {
    /// Creates a new `Endpoint`.
    ///
    /// # Arguments
    /// * `address` - The host to bind to (server) or connect to (client).
    /// * `port` - The tcp port.
    /// * `role` - The bootstrap direction.
    pub fn new(address: impl Into<String>, port: u16, role: Role) -> Self {
        Self {
            address: address.into(),
            port,
            role,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the `host:port` form accepted by the socket constructors.
    pub fn authority(&self) -> String {
        if self.address.contains(':') && !self.address.starts_with('[') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.role, self.authority())
    }
}
