use std::{num::NonZeroUsize, path::PathBuf};

use clap::{Parser, ValueEnum};
use comms::{Endpoint, LossByteOrder, Role};
use orchestrator::{HarnessConfig, Mode, SessionErr, SourceConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Relay,
    Supervised,
    Adversarial,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Relay => Mode::Relay,
            ModeArg::Supervised => Mode::Supervised,
            ModeArg::Adversarial => Mode::Adversarial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LossOrderArg {
    Network,
    Native,
}

impl From<LossOrderArg> for LossByteOrder {
    fn from(order: LossOrderArg) -> Self {
        match order {
            LossOrderArg::Network => LossByteOrder::Network,
            LossOrderArg::Native => LossByteOrder::Native,
        }
    }
}

const DEFAULT_FRAME_SIZE: NonZeroUsize = NonZeroUsize::new(1024).unwrap();
const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(100).unwrap();
const DEFAULT_EPOCHS: NonZeroUsize = NonZeroUsize::new(10).unwrap();

/// Streams frames between two machines and trains a model on them.
#[derive(Debug, Parser)]
#[command(name = "harness", version, disable_version_flag = true)]
pub struct Cli {
    /// Print version.
    #[arg(long, action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Address to connect to, or to listen on with --server.
    #[arg(short, long)]
    pub addr: String,

    #[arg(short, long, default_value_t = 5201)]
    pub port: u16,

    /// Accept one peer instead of connecting.
    #[arg(short, long)]
    pub server: bool,

    /// Binary file to send, or the frame directory with --video.
    #[arg(short, long = "file-path")]
    pub file: Option<PathBuf>,

    /// Chunk size for interactive and file sources.
    #[arg(short = 'S', long, default_value_t = DEFAULT_FRAME_SIZE)]
    pub frame_size: NonZeroUsize,

    /// Treat --file-path as a looping clip.
    #[arg(short = 'V', long, requires = "file")]
    pub video: bool,

    #[arg(short, long, value_enum, default_value_t = ModeArg::Relay)]
    pub mode: ModeArg,

    /// Samples per supervised training batch.
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: NonZeroUsize,

    /// Passes over every supervised batch.
    #[arg(long, default_value_t = DEFAULT_EPOCHS)]
    pub epochs: NonZeroUsize,

    /// Relay server: where received frames go. Otherwise where the model is saved.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Model to load before starting.
    #[arg(long)]
    pub model: Option<PathBuf>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// CSV file for the losses of every adversarial round.
    #[arg(long)]
    pub loss_log: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LossOrderArg::Network)]
    pub loss_order: LossOrderArg,

    #[arg(long)]
    pub max_rounds: Option<NonZeroUsize>,

    /// Keep sending synthetic frames once the source runs out (needs --max-rounds).
    #[arg(long, requires = "max_rounds")]
    pub synthetic_fallback: bool,

    /// Do not feed losses back into the generator.
    #[arg(long)]
    pub no_feedback: bool,
}

impl Cli {
    /// Builds and validates the harness configuration.
    pub fn into_config(self) -> Result<HarnessConfig, SessionErr> {
        let role = if self.server { Role::Server } else { Role::Client };
        let endpoint = Endpoint::new(self.addr, self.port, role);

        let source = match self.file {
            Some(path) if self.video => SourceConfig::video(path),
            Some(path) => SourceConfig::file(path, self.frame_size),
            None => SourceConfig::interactive(self.frame_size),
        };

        let mut config = HarnessConfig::new(endpoint, source);
        config.mode = self.mode.into();
        config.batch_size = self.batch_size;
        config.epochs = self.epochs;
        config.output_path = self.output;
        config.model_path = self.model;
        config.seed = self.seed;
        config.loss_log = self.loss_log;
        config.loss_byte_order = self.loss_order.into();
        config.max_rounds = self.max_rounds;
        config.synthetic_fallback = self.synthetic_fallback;
        config.apply_feedback = !self.no_feedback;
        config.frame_len = self.frame_size.get();

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use orchestrator::SourceKind;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("harness").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&["-a", "10.0.0.1"]).into_config().unwrap();

        assert_eq!(config.endpoint.port(), 5201);
        assert_eq!(config.endpoint.role(), Role::Client);
        assert_eq!(config.source.kind, SourceKind::Interactive);
        assert_eq!(config.source.chunk_size.get(), 1024);
        assert_eq!(config.mode, Mode::Relay);
        assert_eq!(config.batch_size.get(), 100);
        assert!(config.apply_feedback);
    }

    #[test]
    fn short_flags() {
        let cli = parse(&["-a", "::1", "-p", "9000", "-s", "-f", "clip", "-V", "-S", "64"]);
        let config = cli.into_config().unwrap();

        assert_eq!(config.endpoint.role(), Role::Server);
        assert_eq!(config.endpoint.authority(), "[::1]:9000");
        assert_eq!(config.source.kind, SourceKind::Video);
        assert_eq!(config.frame_len, 64);
    }

    #[test]
    fn adversarial_options() {
        let cli = parse(&[
            "-a",
            "127.0.0.1",
            "-m",
            "adversarial",
            "-f",
            "data.bin",
            "--loss-order",
            "native",
            "--max-rounds",
            "50",
            "--synthetic-fallback",
            "--no-feedback",
        ]);
        let config = cli.into_config().unwrap();

        assert_eq!(config.mode, Mode::Adversarial);
        assert_eq!(config.source.kind, SourceKind::File);
        assert_eq!(config.loss_byte_order, LossByteOrder::Native);
        assert_eq!(config.max_rounds.map(NonZeroUsize::get), Some(50));
        assert!(config.synthetic_fallback);
        assert!(!config.apply_feedback);
    }

    #[test]
    fn video_requires_a_path() {
        let res = Cli::try_parse_from(["harness", "-a", "127.0.0.1", "-V"]);
        assert!(res.is_err());
    }

    #[test]
    fn address_is_required() {
        assert!(Cli::try_parse_from(["harness"]).is_err());
    }
}
