use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::assemble;
use crate::codec::{AudioCodec, FfmpegCodec};
use crate::config::Config;
use crate::distribute;
use crate::progress::Progress;
use crate::tagger;
use crate::transfer::{FtpTransport, TransferEngine, Transport};
use crate::Result;

/// Final line on every job's progress stream, success or failure.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Everything one submission carries
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Broadcast date in `MM-DD-YY` form, validated before processing starts
    pub broadcast_date: String,
    pub source: PathBuf,
    pub artwork: Option<PathBuf>,
    pub show_title: String,
    pub guest: String,
}

type SharedReceiver = Arc<tokio::sync::Mutex<UnboundedReceiver<String>>>;

/// Concurrent-safe map from job id to its progress stream.
///
/// The submitting side inserts, the polling side reads and removes after the
/// sentinel; nothing else is shared between a job and its consumer.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<Uuid, SharedReceiver>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: Uuid, receiver: UnboundedReceiver<String>) {
        self.jobs
            .lock()
            .expect("job registry lock poisoned")
            .insert(id, Arc::new(tokio::sync::Mutex::new(receiver)));
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.jobs.lock().expect("job registry lock poisoned").contains_key(&id)
    }

    /// Drop a finished job's channel. Safe to call more than once.
    pub fn remove(&self, id: Uuid) {
        self.jobs.lock().expect("job registry lock poisoned").remove(&id);
    }

    /// Wait up to `wait` for the job's next progress line.
    ///
    /// Returns `Ok(None)` when the poll timed out and the caller should
    /// simply poll again.
    pub async fn next_message(&self, id: Uuid, wait: Duration) -> Result<Option<String>> {
        let receiver = self
            .jobs
            .lock()
            .expect("job registry lock poisoned")
            .get(&id)
            .cloned()
            .with_context(|| format!("No such job: {id}"))?;

        match tokio::time::timeout(wait, async {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        })
        .await
        {
            Err(_) => Ok(None),
            Ok(Some(message)) => Ok(Some(message)),
            Ok(None) => anyhow::bail!("Progress stream for job {id} ended without a sentinel"),
        }
    }
}

/// Spawns and tracks processing jobs.
///
/// Each job runs the blocking pipeline (assemble, tag, distribute, strictly
/// in that order) on its own worker; the only concurrency in the system is
/// across independent jobs and between a job and its progress consumer.
pub struct JobRunner {
    config: Arc<Config>,
    codec: Arc<dyn AudioCodec>,
    transport: Arc<dyn Transport>,
    registry: Arc<JobRegistry>,
}

impl JobRunner {
    /// Runner with the real audio and FTP backends.
    pub fn new(config: Arc<Config>) -> Self {
        let codec = Arc::new(FfmpegCodec::new(config.processing.ffmpeg_bin.clone()));
        Self::with_services(config, codec, Arc::new(FtpTransport::new()))
    }

    /// Runner with injected backends.
    pub fn with_services(
        config: Arc<Config>,
        codec: Arc<dyn AudioCodec>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self { config, codec, transport, registry: Arc::new(JobRegistry::new()) }
    }

    pub fn registry(&self) -> Arc<JobRegistry> {
        Arc::clone(&self.registry)
    }

    /// Start one job and return its id immediately.
    ///
    /// Every terminal outcome, success or failure, ends with
    /// [`DONE_SENTINEL`] on the job's stream so a consumer polling the
    /// registry always terminates.
    pub fn submit(&self, request: JobRequest) -> Uuid {
        let id = Uuid::new_v4();
        let (progress, receiver) = Progress::channel();
        self.registry.insert(id, receiver);

        let config = Arc::clone(&self.config);
        let codec = Arc::clone(&self.codec);
        let transport = Arc::clone(&self.transport);

        let _worker = tokio::task::spawn_blocking(move || {
            if let Err(e) = run_pipeline(&config, codec.as_ref(), transport.as_ref(), &request, &progress)
            {
                progress.report(format!("❌ Error during processing: {e:#}"));
            }
            progress.report(DONE_SENTINEL);
        });

        id
    }
}

/// One full pipeline run: assemble, tag, distribute.
fn run_pipeline(
    config: &Config,
    codec: &dyn AudioCodec,
    transport: &dyn Transport,
    request: &JobRequest,
    progress: &Progress,
) -> Result<()> {
    progress.report("⏳ Starting processing...");

    // Reject a bad date before touching any audio
    let date = crate::calendar::BroadcastDate::parse(&request.broadcast_date)?;

    fs_err::create_dir_all(&config.processing.output_dir)?;
    let outputs = assemble::assemble(
        codec,
        &request.source,
        &config.processing.output_dir,
        &date,
        progress,
    )?;
    progress.report("✅ Processing complete!");

    // Tag faults are reported, never fatal; the untagged podcast still ships
    progress.report("Applying ID3 tags to Podcast...");
    if tagger::tag_podcast(
        &outputs.podcast,
        &date,
        &request.show_title,
        &request.guest,
        request.artwork.as_deref(),
    ) {
        progress.report(format!("✅ ID3 tags applied to {}", outputs.podcast.display()));
    } else {
        progress.report(format!("❌ Failed to apply ID3 tags to {}", outputs.podcast.display()));
    }

    let engine = TransferEngine::new(
        transport,
        config.transfer.max_retries,
        Duration::from_secs(config.transfer.backoff_secs),
    );
    distribute::distribute(&engine, &outputs, &config.destinations, progress)?;

    Ok(())
}
