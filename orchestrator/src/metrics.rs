use log::info;

/// Counters describing what a session did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionMetrics {
    pub frames_sent: u64,
    pub frames_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,

    pub rounds: u64,
    pub lost_replies: u64,
    pub coerced_labels: u64,
    pub batches: u64,

    pub synthetic_frames: u64,
    pub source_frames: u64,
    pub last_loss: Option<f64>,
}

impl SessionMetrics {
    #[inline]
    pub fn add_sent(&mut self, n: usize) {
        self.frames_sent += 1;
        self.bytes_sent += n as u64;
    }

    #[inline]
    pub fn add_received(&mut self, n: usize) {
        self.frames_received += 1;
        self.bytes_received += n as u64;
    }

    #[inline]
    pub fn bump_round(&mut self) {
        self.rounds += 1;
    }

    #[inline]
    pub fn bump_lost_reply(&mut self) {
        self.lost_replies += 1;
    }

    #[inline]
    pub fn bump_coerced(&mut self) {
        self.coerced_labels += 1;
    }

    #[inline]
    pub fn bump_batch(&mut self, loss: f64) {
        self.batches += 1;
        self.last_loss = Some(loss);
    }

    pub fn log(&self) {
        info!(
            frames_sent = self.frames_sent,
            frames_received = self.frames_received,
            bytes_sent = self.bytes_sent,
            bytes_received = self.bytes_received,
            rounds = self.rounds,
            lost_replies = self.lost_replies,
            coerced_labels = self.coerced_labels,
            batches = self.batches;
            "session finished"
        );
    }
}
