//! Runs one side of a frame training session between two processes.
//!
//! A client reads frames from a `FrameSource` and sends them to a server,
//! which trains a `Model` on them. Depending on the `Mode` the frames are
//! relayed untouched, tagged with a label, or answered with a loss.

mod coin;
pub mod configs;
pub mod error;
mod loss_log;
mod metrics;
mod session;
pub mod source;
mod tags;

use std::future::Future;

use comms::{NetTransport, Role};
use log::info;
use machine_learning::Model;

pub use coin::{Coin, FairCoin};
pub use configs::{HarnessConfig, Mode, SourceConfig, SourceKind};
pub use error::SessionErr;
pub use loss_log::LossLog;
pub use metrics::SessionMetrics;
pub use session::Session;
pub use source::FrameSource;
pub use tags::{Origin, Tag};

/// Connects to the peer and runs the session described by `config`.
///
/// The frame source and the model are prepared before connecting so that
/// configuration problems surface without involving the peer.
///
/// # Arguments
/// * `config` - The harness configuration.
/// * `model` - The model to train or generate with.
/// * `shutdown` - Resolves when the session should stop early.
///
/// # Returns
/// The session metrics or the error that ended it.
pub async fn run(
    config: HarnessConfig,
    mut model: Box<dyn Model + Send>,
    shutdown: impl Future<Output = ()>,
) -> Result<SessionMetrics, SessionErr> {
    config.validate()?;
    let role = config.endpoint.role();

    let source = match role {
        Role::Client => Some(FrameSource::open(&config.source).await?),
        Role::Server => None,
    };

    if let Some(path) = &config.model_path {
        model.load(path)?;
        info!("model loaded from {}", path.display());
    }

    let loss_log = match (&config.loss_log, role, config.mode) {
        (Some(path), Role::Client, Mode::Adversarial) => Some(LossLog::create(path).await?),
        _ => None,
    };

    let transport = NetTransport::connect(&config.endpoint).await?;
    let mut session = Session::new(transport, config).with_model(model);

    if let Some(source) = source {
        session = session.with_source(source);
    }

    if let Some(loss_log) = loss_log {
        session = session.with_loss_log(loss_log);
    }

    session.run_until(shutdown).await
}
