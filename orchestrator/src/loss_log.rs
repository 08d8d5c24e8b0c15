use std::path::Path;

use tokio::{
    fs::File,
    io::{self, AsyncWriteExt, BufWriter},
};

use crate::Origin;

const HEADER: &str = "round,origin,discriminator_loss,generator_loss\n";

/// A csv file with the losses of each adversarial round.
pub struct LossLog {
    writer: BufWriter<File>,
}

impl LossLog {
    /// Creates the file at `path`, truncating it, and writes the header.
    pub async fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path).await?;
        let mut writer = BufWriter::new(file);
        writer.write_all(HEADER.as_bytes()).await?;

        Ok(Self { writer })
    }

    pub async fn record(
        &mut self,
        round: u64,
        origin: Origin,
        discriminator_loss: f64,
        generator_loss: f64,
    ) -> io::Result<()> {
        let row = format!("{round},{origin},{discriminator_loss},{generator_loss}\n");
        self.writer.write_all(row.as_bytes()).await
    }

    pub async fn flush(&mut self) -> io::Result<()> {
        self.writer.flush().await
    }
}
