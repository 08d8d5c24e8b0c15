use std::{fmt, io, path::PathBuf};

use comms::ConnectErr;
use machine_learning::MlErr;

/// All errors that can end a harness session.
#[derive(Debug)]
pub enum SessionErr {
    /// Invalid configuration, caught before connecting.
    InvalidConfig(String),
    /// The link could not be established.
    Connect(ConnectErr),
    /// The frame source could not be opened.
    SourceUnavailable { path: PathBuf, source: io::Error },
    /// The transport or the source failed mid session.
    Io(io::Error),
    /// A reply did not have the shape the protocol requires, the peers are out of sync.
    ProtocolViolation {
        round: u64,
        got: usize,
        expected: usize,
    },
    /// The model could not be loaded or persisted.
    Model(MlErr),
}

impl fmt::Display for SessionErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Connect(e) => write!(f, "{e}"),
            Self::SourceUnavailable { path, source } => {
                write!(f, "failed to open source {}: {source}", path.display())
            }
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::ProtocolViolation {
                round,
                got,
                expected,
            } => write!(
                f,
                "protocol violation at round {round}: got a {got} byte reply, expected {expected}"
            ),
            Self::Model(e) => write!(f, "model error: {e}"),
        }
    }
}

impl std::error::Error for SessionErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Connect(e) => Some(e),
            Self::SourceUnavailable { source, .. } => Some(source),
            Self::Io(e) => Some(e),
            Self::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SessionErr {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConnectErr> for SessionErr {
    fn from(e: ConnectErr) -> Self {
        Self::Connect(e)
    }
}

impl From<MlErr> for SessionErr {
    fn from(e: MlErr) -> Self {
        Self::Model(e)
    }
}
