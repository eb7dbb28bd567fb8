use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Handle for reporting human-readable progress lines from inside a job.
///
/// Every line is mirrored to the tracing log; when the handle was created
/// with [`Progress::channel`] the line is also delivered, in order, to the
/// job's consumer. Cloning the handle shares the same channel.
#[derive(Clone, Default)]
pub struct Progress {
    tx: Option<UnboundedSender<String>>,
}

impl Progress {
    /// A progress handle that only logs, for CLI paths with no job consumer.
    pub fn sink() -> Self {
        Self { tx: None }
    }

    /// A progress handle paired with the receiving end of its channel.
    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn report(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        if let Some(tx) = &self.tx {
            // The consumer may already be gone; progress is best effort then
            let _ = tx.send(message);
        }
    }
}
