#![allow(dead_code)]

use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use comms::{Endpoint, Role, Transport};
use machine_learning::{Label, Model, Sample};
use orchestrator::{Coin, HarnessConfig, Mode, SourceConfig};
use tokio::io::{self, DuplexStream, ReadHalf, WriteHalf};

pub type Pipe = Transport<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

pub fn transport_pair() -> (Pipe, Pipe) {
    let (one, two) = io::duplex(1024);
    let (rx1, tx1) = io::split(one);
    let (rx2, tx2) = io::split(two);
    (Transport::new(rx1, tx1), Transport::new(rx2, tx2))
}

pub fn config(role: Role, mode: Mode) -> HarnessConfig {
    let endpoint = Endpoint::new("127.0.0.1", 0, role);
    let mut config = HarnessConfig::new(endpoint, SourceConfig::interactive(NonZeroUsize::MIN));
    config.mode = mode;
    config.seed = Some(0);
    config
}

/// A fresh path under the temp dir, unique per process and test.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("harness-{}-{name}", std::process::id()))
}

pub async fn temp_file(name: &str, contents: &[u8]) -> io::Result<PathBuf> {
    let path = temp_path(name);
    tokio::fs::write(&path, contents).await?;
    Ok(path)
}

pub async fn remove(path: &Path) {
    let _ = tokio::fs::remove_file(path).await;
}

/// Everything a `RecordingModel` was asked to do.
#[derive(Debug, Default)]
pub struct Record {
    pub generated: usize,
    pub trained: Vec<(Vec<u8>, Label)>,
    pub batches: Vec<Vec<Sample>>,
    pub applied: Vec<f64>,
    pub saved: Vec<PathBuf>,
}

/// A model that answers with predictable losses and records every call.
///
/// The n-th call to `train` returns `0.25 * n`.
#[derive(Clone, Default)]
pub struct RecordingModel {
    record: Arc<Mutex<Record>>,
}

impl RecordingModel {
    pub const SYNTHETIC: &'static [u8] = b"synthetic";

    pub fn record(&self) -> std::sync::MutexGuard<'_, Record> {
        self.record.lock().unwrap()
    }

    pub fn boxed(&self) -> Box<dyn Model + Send> {
        Box::new(self.clone())
    }
}

impl Model for RecordingModel {
    fn generate(&mut self) -> Vec<u8> {
        self.record().generated += 1;
        Self::SYNTHETIC.to_vec()
    }

    fn classify(&mut self, _frame: &[u8]) -> Label {
        Label::Negative
    }

    fn train(&mut self, frame: &[u8], label: Label) -> f64 {
        let mut record = self.record();
        record.trained.push((frame.to_vec(), label));
        0.25 * record.trained.len() as f64
    }

    fn train_batch(&mut self, batch: &[Sample], _epochs: NonZeroUsize) -> f64 {
        self.record().batches.push(batch.to_vec());
        0.5
    }

    fn apply_loss(&mut self, loss: f64) -> f64 {
        self.record().applied.push(loss);
        loss
    }

    fn save(&self, path: &Path) -> machine_learning::Result<()> {
        self.record().saved.push(path.to_path_buf());
        Ok(())
    }

    fn load(&mut self, _path: &Path) -> machine_learning::Result<()> {
        Ok(())
    }
}

/// A coin replaying a fixed sequence of tosses, cycling when it runs out.
pub struct ScriptedCoin {
    tosses: Vec<bool>,
    next: usize,
}

impl ScriptedCoin {
    pub fn new(tosses: Vec<bool>) -> Box<Self> {
        Box::new(Self { tosses, next: 0 })
    }
}

impl Coin for ScriptedCoin {
    fn toss(&mut self) -> bool {
        let toss = self.tosses[self.next % self.tosses.len()];
        self.next += 1;
        toss
    }
}
