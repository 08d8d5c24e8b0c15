mod harness;
mod source;

pub use harness::{HarnessConfig, Mode};
pub use source::{SourceConfig, SourceKind};
