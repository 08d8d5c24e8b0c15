use std::{error::Error, fmt, io};

use crate::Role;

/// Failure to establish the link, either binding/accepting or connecting.
#[derive(Debug)]
pub struct ConnectErr {
    pub addr: String,
    pub role: Role,
    pub source: io::Error,
}

impl fmt::Display for ConnectErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { addr, role, source } = self;

        match role {
            Role::Server => write!(f, "failed to accept a peer on {addr}: {source}"),
            Role::Client => write!(f, "failed to connect to {addr}: {source}"),
        }
    }
}

impl Error for ConnectErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<ConnectErr> for io::Error {
    fn from(value: ConnectErr) -> Self {
        io::Error::new(value.source.kind(), value)
    }
}
