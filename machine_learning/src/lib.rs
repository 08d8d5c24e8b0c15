pub mod arch;
pub mod baseline;
pub mod error;
mod model;
pub mod optimization;

pub use baseline::Baseline;
pub use error::{MlErr, Result};
pub use model::{Label, Model, Sample};
