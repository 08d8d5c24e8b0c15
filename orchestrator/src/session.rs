use std::{future::Future, num::NonZeroUsize};

use comms::{LOSS_SIZE, Loss, Role, Transport};
use log::{debug, error, info, warn};
use machine_learning::{Label, Model, Sample};
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter},
};

use crate::{
    Coin, FairCoin, FrameSource, LossLog, Origin, SessionErr, SessionMetrics,
    configs::{HarnessConfig, Mode},
    tags,
};

type BoxedModel = Box<dyn Model + Send>;

/// The states of an adversarial client, one transition per suspension point.
#[derive(Debug)]
enum ClientState {
    ChooseOrigin,
    ProduceFrame(Origin),
    Send(Origin, Vec<u8>),
    AwaitLossReply { origin: Origin, round: u64 },
    ApplyFeedback { origin: Origin, round: u64, loss: f64 },
    Done,
}

/// The states of an adversarial server.
#[derive(Debug)]
enum ServerState {
    AwaitFrame,
    StripLabel(Vec<u8>),
    Train { label: Label, frame: Vec<u8> },
    SendLoss(f64),
    Done,
}

/// One side of a training session over an established transport.
///
/// The role comes from the configured endpoint and the protocol from the
/// configured mode, both peers must agree on the latter.
pub struct Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    transport: Transport<R, W>,
    config: HarnessConfig,
    source: Option<FrameSource>,
    model: Option<BoxedModel>,
    coin: Box<dyn Coin + Send>,
    loss_log: Option<LossLog>,
    /// Relay server file receiving the frames, flushed when the session closes.
    sink: Option<BufWriter<File>>,
    pending: Vec<Sample>,
    metrics: SessionMetrics,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new `Session`.
    ///
    /// The coin is seeded from `config.seed`, replace it with `with_coin`.
    ///
    /// # Arguments
    /// * `transport` - The connection to the peer.
    /// * `config` - The harness configuration.
    pub fn new(transport: Transport<R, W>, config: HarnessConfig) -> Self {
        let coin = Box::new(FairCoin::seeded(config.seed));

        Self {
            transport,
            config,
            source: None,
            model: None,
            coin,
            loss_log: None,
            sink: None,
            pending: Vec::new(),
            metrics: SessionMetrics::default(),
        }
    }

    /// Sets the frames a client sends.
    pub fn with_source(mut self, source: FrameSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_model(mut self, model: BoxedModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_coin(mut self, coin: Box<dyn Coin + Send>) -> Self {
        self.coin = coin;
        self
    }

    pub fn with_loss_log(mut self, loss_log: LossLog) -> Self {
        self.loss_log = Some(loss_log);
        self
    }

    /// Runs the session until the protocol ends, see `run_until`.
    pub async fn run(self) -> Result<SessionMetrics, SessionErr> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the session until the protocol ends or `shutdown` resolves.
    ///
    /// Whatever way the loop ends, any pending samples are trained and the
    /// model is saved at the output path before returning. A loop error
    /// takes precedence over an error while closing.
    ///
    /// # Returns
    /// The session metrics or the error that ended the loop.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<SessionMetrics, SessionErr> {
        info!(
            "starting {:?} session as {}",
            self.config.mode,
            self.config.endpoint.role()
        );

        let outcome = tokio::select! {
            outcome = self.drive() => outcome,
            () = shutdown => {
                info!("shutdown requested, stopping the session");
                Ok(())
            }
        };

        let closed = self.close().await;
        self.metrics.log();

        match (outcome, closed) {
            (Err(e), Err(close)) => {
                error!("failed to close the session: {close}");
                Err(e)
            }
            (outcome, closed) => outcome.and(closed).map(|()| self.metrics),
        }
    }

    async fn drive(&mut self) -> Result<(), SessionErr> {
        match (self.config.endpoint.role(), self.config.mode) {
            (Role::Client, Mode::Relay) => self.relay_client().await,
            (Role::Server, Mode::Relay) => self.relay_server().await,
            (Role::Client, Mode::Supervised) => self.supervised_client().await,
            (Role::Server, Mode::Supervised) => self.supervised_server().await,
            (Role::Client, Mode::Adversarial) => self.adversarial_client().await,
            (Role::Server, Mode::Adversarial) => self.adversarial_server().await,
        }
    }

    async fn relay_client(&mut self) -> Result<(), SessionErr> {
        let source = required_source(&mut self.source)?;

        while !reached(self.config.max_rounds, self.metrics.rounds) {
            let Some(frame) = source.read_frame().await? else {
                info!("source exhausted");
                break;
            };

            let n = self.transport.send(&frame).await?;
            self.metrics.add_sent(n);
            self.metrics.bump_round();
            debug!(size = n; "frame sent");
        }

        self.end_of_stream().await;
        Ok(())
    }

    async fn relay_server(&mut self) -> Result<(), SessionErr> {
        if let Some(path) = &self.config.output_path {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;

            self.sink = Some(BufWriter::new(file));
        }

        let mut buf = Vec::new();
        while let Some(frame) = self.transport.recv_into(&mut buf).await? {
            self.metrics.add_received(frame.len());
            debug!(size = frame.len(); "frame received");

            if let Some(sink) = self.sink.as_mut() {
                sink.write_all(frame).await?;
            }
        }

        info!("peer closed the stream");
        Ok(())
    }

    async fn supervised_client(&mut self) -> Result<(), SessionErr> {
        let source = required_source(&mut self.source)?;

        while !reached(self.config.max_rounds, self.metrics.rounds) {
            let Some(frame) = source.read_frame().await? else {
                info!("source exhausted");
                break;
            };

            let label = Label::from(self.coin.toss());
            let n = self.transport.send(&tags::tag(label, &frame)).await?;
            self.metrics.add_sent(n);
            self.metrics.bump_round();
            debug!(label = label.as_byte(), size = n; "sample sent");
        }

        self.end_of_stream().await;
        Ok(())
    }

    async fn supervised_server(&mut self) -> Result<(), SessionErr> {
        let model = required_model(&mut self.model)?;
        let batch_size = self.config.batch_size.get();
        let epochs = self.config.epochs;

        let mut buf = Vec::new();
        while let Some(frame) = self.transport.recv_into(&mut buf).await? {
            self.metrics.add_received(frame.len());

            let (tag, body) = tags::strip(frame);
            if tag.coerced {
                self.metrics.bump_coerced();
            }

            self.pending.push(Sample::new(body.to_vec(), tag.label));

            if self.pending.len() == batch_size {
                train_pending(model, &mut self.pending, epochs, &mut self.metrics);
            }
        }

        info!("peer closed the stream");
        Ok(())
    }

    async fn adversarial_client(&mut self) -> Result<(), SessionErr> {
        let source = required_source(&mut self.source)?;
        let model = required_model(&mut self.model)?;
        let order = self.config.loss_byte_order;

        let mut exhausted = false;
        let mut buf = Vec::new();
        let mut state = ClientState::ChooseOrigin;

        loop {
            state = match state {
                ClientState::ChooseOrigin => {
                    if reached(self.config.max_rounds, self.metrics.rounds) {
                        ClientState::Done
                    } else if exhausted {
                        ClientState::ProduceFrame(Origin::Synthetic)
                    } else {
                        ClientState::ProduceFrame(Origin::from(self.coin.toss()))
                    }
                }
                ClientState::ProduceFrame(Origin::Synthetic) => {
                    ClientState::Send(Origin::Synthetic, model.generate())
                }
                ClientState::ProduceFrame(Origin::Source) => match source.read_frame().await? {
                    Some(frame) => ClientState::Send(Origin::Source, frame),
                    None if self.config.synthetic_fallback => {
                        info!("source exhausted, continuing with synthetic frames");
                        exhausted = true;
                        ClientState::ProduceFrame(Origin::Synthetic)
                    }
                    None => {
                        info!("source exhausted");
                        ClientState::Done
                    }
                },
                ClientState::Send(origin, frame) => {
                    let n = self
                        .transport
                        .send(&tags::tag(origin.label(), &frame))
                        .await?;

                    self.metrics.add_sent(n);
                    match origin {
                        Origin::Synthetic => self.metrics.synthetic_frames += 1,
                        Origin::Source => self.metrics.source_frames += 1,
                    }

                    let round = self.metrics.rounds;
                    self.metrics.bump_round();
                    ClientState::AwaitLossReply { origin, round }
                }
                ClientState::AwaitLossReply { origin, round } => {
                    match self.transport.recv_into(&mut buf).await? {
                        Some(reply) => {
                            self.metrics.add_received(reply.len());

                            let loss = Loss::from_bytes(reply, order).ok_or(
                                SessionErr::ProtocolViolation {
                                    round,
                                    got: reply.len(),
                                    expected: LOSS_SIZE,
                                },
                            )?;

                            ClientState::ApplyFeedback {
                                origin,
                                round,
                                loss: loss.0,
                            }
                        }
                        None => {
                            warn!(round = round; "peer closed before replying, round lost");
                            self.metrics.bump_lost_reply();
                            ClientState::ChooseOrigin
                        }
                    }
                }
                ClientState::ApplyFeedback {
                    origin,
                    round,
                    loss,
                } => {
                    let generator_loss = self.config.loss_reference - loss;
                    if self.config.apply_feedback && origin == Origin::Synthetic {
                        model.apply_loss(generator_loss);
                    }

                    if let Some(log) = self.loss_log.as_mut() {
                        log.record(round, origin, loss, generator_loss).await?;
                    }

                    self.metrics.last_loss = Some(loss);
                    debug!(
                        round = round,
                        loss = loss,
                        generator_loss = generator_loss;
                        "{origin} round answered"
                    );
                    ClientState::ChooseOrigin
                }
                ClientState::Done => break,
            };
        }

        self.end_of_stream().await;
        Ok(())
    }

    async fn adversarial_server(&mut self) -> Result<(), SessionErr> {
        let model = required_model(&mut self.model)?;
        let order = self.config.loss_byte_order;
        let mut state = ServerState::AwaitFrame;

        loop {
            state = match state {
                ServerState::AwaitFrame => match self.transport.recv().await? {
                    Some(frame) => {
                        self.metrics.add_received(frame.len());
                        ServerState::StripLabel(frame)
                    }
                    None => ServerState::Done,
                },
                ServerState::StripLabel(frame) => {
                    let (tag, body) = tags::strip(&frame);
                    if tag.coerced {
                        self.metrics.bump_coerced();
                    }

                    ServerState::Train {
                        label: tag.label,
                        frame: body.to_vec(),
                    }
                }
                ServerState::Train { label, frame } => {
                    ServerState::SendLoss(model.train(&frame, label))
                }
                ServerState::SendLoss(loss) => {
                    let n = self.transport.send(&Loss(loss).to_bytes(order)).await?;
                    self.metrics.add_sent(n);
                    self.metrics.last_loss = Some(loss);

                    debug!(round = self.metrics.rounds, loss = loss; "loss sent");
                    self.metrics.bump_round();
                    ServerState::AwaitFrame
                }
                ServerState::Done => break,
            };
        }

        info!("peer closed the stream");
        Ok(())
    }

    /// Signals the peer that no more frames will follow.
    async fn end_of_stream(&mut self) {
        if let Err(e) = self.transport.shutdown().await {
            debug!("failed to shut the stream down: {e}");
        }
    }

    /// Flushes the relay output and the loss log, trains what is left and
    /// persists the model.
    async fn close(&mut self) -> Result<(), SessionErr> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush().await?;
        }

        if let Some(log) = self.loss_log.as_mut() {
            log.flush().await?;
        }

        let Some(model) = self.model.as_mut() else {
            return Ok(());
        };

        if !self.pending.is_empty() {
            train_pending(
                model,
                &mut self.pending,
                self.config.epochs,
                &mut self.metrics,
            );
        }

        if self.config.mode == Mode::Relay {
            return Ok(());
        }

        if let Some(path) = &self.config.output_path {
            model.save(path)?;
            info!("model saved at {}", path.display());
        }

        Ok(())
    }
}

/// Whether `rounds` reached the optional `limit`.
fn reached(limit: Option<NonZeroUsize>, rounds: u64) -> bool {
    limit.is_some_and(|limit| rounds >= limit.get() as u64)
}

fn required_source(source: &mut Option<FrameSource>) -> Result<&mut FrameSource, SessionErr> {
    source
        .as_mut()
        .ok_or_else(|| SessionErr::InvalidConfig("a client session needs a frame source".into()))
}

fn required_model(model: &mut Option<BoxedModel>) -> Result<&mut BoxedModel, SessionErr> {
    model
        .as_mut()
        .ok_or_else(|| SessionErr::InvalidConfig("this session needs a model".into()))
}

fn train_pending(
    model: &mut BoxedModel,
    pending: &mut Vec<Sample>,
    epochs: NonZeroUsize,
    metrics: &mut SessionMetrics,
) {
    let loss = model.train_batch(pending, epochs);
    metrics.bump_batch(loss);
    info!(
        batch = metrics.batches,
        samples = pending.len(),
        loss = loss;
        "batch trained"
    );
    pending.clear();
}
