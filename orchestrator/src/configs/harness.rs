use std::{fs, num::NonZeroUsize, path::Path, path::PathBuf};

use comms::{Endpoint, LossByteOrder};
use serde::{Deserialize, Serialize};

use super::{SourceConfig, SourceKind};
use crate::SessionErr;

/// The protocol both peers run once connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Frames flow one way, untagged.
    #[default]
    Relay,
    /// Frames carry a label byte, the server trains in batches.
    Supervised,
    /// Frames carry an origin byte, the server answers each one with its loss.
    Adversarial,
}

/// Everything a process needs to run one side of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub endpoint: Endpoint,
    pub source: SourceConfig,
    #[serde(default)]
    pub mode: Mode,
    /// Samples accumulated before each supervised training batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: NonZeroUsize,
    /// Passes made over every supervised batch.
    #[serde(default = "default_epochs")]
    pub epochs: NonZeroUsize,
    /// Relay server: file receiving the frames. Other modes: where the model is saved.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    /// A model to load before the session starts.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub loss_byte_order: LossByteOrder,
    /// The generator loss is `loss_reference - discriminator loss`.
    #[serde(default = "default_loss_reference")]
    pub loss_reference: f64,
    /// Feed the generator loss back into the model on synthetic rounds.
    #[serde(default = "default_true")]
    pub apply_feedback: bool,
    /// Keep sending synthetic frames once the source is exhausted.
    #[serde(default)]
    pub synthetic_fallback: bool,
    #[serde(default)]
    pub max_rounds: Option<NonZeroUsize>,
    /// CSV file with the losses of every adversarial round.
    #[serde(default)]
    pub loss_log: Option<PathBuf>,
    /// Size of the frames produced by the bundled generator.
    #[serde(default = "default_frame_len")]
    pub frame_len: usize,
}

impl HarnessConfig {
    /// Creates a configuration with default protocol settings.
    ///
    /// # Arguments
    /// * `endpoint` - The link to establish.
    /// * `source` - The frame source, only read by clients.
    pub fn new(endpoint: Endpoint, source: SourceConfig) -> Self {
        Self {
            endpoint,
            source,
            mode: Mode::default(),
            batch_size: default_batch_size(),
            epochs: default_epochs(),
            output_path: None,
            model_path: None,
            seed: None,
            loss_byte_order: LossByteOrder::default(),
            loss_reference: default_loss_reference(),
            apply_feedback: true,
            synthetic_fallback: false,
            max_rounds: None,
            loss_log: None,
            frame_len: default_frame_len(),
        }
    }

    /// Reads a configuration from a json file.
    pub fn from_json_file(path: &Path) -> Result<Self, SessionErr> {
        let raw = fs::read(path)?;
        let config: Self = serde_json::from_slice(&raw)
            .map_err(|e| SessionErr::InvalidConfig(format!("{}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the combinations the type system can not rule out.
    pub fn validate(&self) -> Result<(), SessionErr> {
        let source = &self.source;

        if matches!(source.kind, SourceKind::File | SourceKind::Video) && source.path.is_none() {
            return Err(SessionErr::InvalidConfig(format!(
                "a {:?} source requires a path",
                source.kind
            )));
        }

        if self.synthetic_fallback && self.max_rounds.is_none() {
            return Err(SessionErr::InvalidConfig(
                "synthetic fallback never ends without a round limit".to_string(),
            ));
        }

        if self.mode == Mode::Adversarial && self.frame_len == 0 {
            return Err(SessionErr::InvalidConfig(
                "adversarial sessions need a non empty frame length".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_batch_size() -> NonZeroUsize {
    NonZeroUsize::new(100).unwrap_or(NonZeroUsize::MIN)
}

fn default_epochs() -> NonZeroUsize {
    NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN)
}

fn default_loss_reference() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_frame_len() -> usize {
    1024
}

#[cfg(test)]
mod tests {
    use comms::Role;

    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::new("127.0.0.1", 5201, Role::Client)
    }

    #[test]
    fn json_fills_defaults() {
        let raw = r#"{
            "endpoint": { "address": "10.0.0.2", "port": 9000, "role": "server" },
            "source": { "kind": "file", "path": "data.bin" },
            "mode": "supervised",
            "batch_size": 2
        }"#;

        let config: HarnessConfig = serde_json::from_str(raw).unwrap();
        config.validate().unwrap();

        assert_eq!(config.endpoint.port(), 9000);
        assert_eq!(config.endpoint.role(), Role::Server);
        assert_eq!(config.mode, Mode::Supervised);
        assert_eq!(config.batch_size.get(), 2);
        assert_eq!(config.epochs.get(), 10);
        assert_eq!(config.source.chunk_size.get(), 1024);
        assert_eq!(config.loss_byte_order, LossByteOrder::Network);
        assert!(config.apply_feedback);
    }

    #[test]
    fn file_source_needs_a_path() {
        let mut source = SourceConfig::interactive(NonZeroUsize::MIN);
        source.kind = SourceKind::File;

        let config = HarnessConfig::new(endpoint(), source);
        assert!(matches!(config.validate(), Err(SessionErr::InvalidConfig(_))));
    }

    #[test]
    fn fallback_needs_a_round_limit() {
        let source = SourceConfig::interactive(NonZeroUsize::MIN);
        let mut config = HarnessConfig::new(endpoint(), source);
        config.synthetic_fallback = true;
        assert!(config.validate().is_err());

        config.max_rounds = NonZeroUsize::new(5);
        assert!(config.validate().is_ok());
    }
}
