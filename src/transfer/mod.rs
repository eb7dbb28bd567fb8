use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;

use crate::config::Destination;
use crate::progress::Progress;
use crate::{PipelineError, Result};

pub mod ftp;

pub use ftp::FtpTransport;

/// Connection factory for one upload protocol.
///
/// One session is opened per destination batch and reused for every file in
/// it; nothing here is shared between jobs.
pub trait Transport: Send + Sync {
    fn connect(&self, destination: &Destination) -> Result<Box<dyn TransferSession>>;
}

/// An authenticated connection positioned in the destination directory
pub trait TransferSession {
    /// Store one local file under the given remote name
    fn store(&mut self, local: &Path, remote_name: &str) -> Result<()>;

    /// Size in bytes of a remote file
    fn size(&mut self, remote_name: &str) -> Result<u64>;
}

/// Uploads batches of files with retry and post-upload size verification.
pub struct TransferEngine<'a> {
    transport: &'a dyn Transport,
    max_retries: u32,
    backoff: Duration,
}

impl<'a> TransferEngine<'a> {
    pub fn new(transport: &'a dyn Transport, max_retries: u32, backoff: Duration) -> Self {
        Self { transport, max_retries, backoff }
    }

    /// Upload every file to one destination over a single connection.
    ///
    /// Remote names come from `rename` (identity when absent). Each file
    /// gets up to `max_retries` attempts; an upload whose remote size does
    /// not match the local size counts as a failed attempt even though the
    /// transfer itself completed. Once one file exhausts its attempts the
    /// whole batch fails; remaining files are not attempted silently.
    pub fn upload(
        &self,
        files: &[PathBuf],
        destination: &Destination,
        rename: &HashMap<String, String>,
        progress: &Progress,
    ) -> Result<()> {
        let mut session = self
            .transport
            .connect(destination)
            .with_context(|| format!("Failed to connect to {}", destination.name))?;

        for file in files {
            let local_name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .with_context(|| format!("Upload path has no filename: {}", file.display()))?;
            let remote_name = rename.get(&local_name).cloned().unwrap_or(local_name);
            let local_size = fs_err::metadata(file)?.len();

            self.upload_one(session.as_mut(), destination, file, &remote_name, local_size, progress)?;
        }

        Ok(())
    }

    fn upload_one(
        &self,
        session: &mut dyn TransferSession,
        destination: &Destination,
        file: &Path,
        remote_name: &str,
        local_size: u64,
        progress: &Progress,
    ) -> Result<()> {
        for attempt in 1..=self.max_retries {
            progress.report(format!(
                "Uploading {} (Attempt {}/{})...",
                remote_name, attempt, self.max_retries
            ));

            match attempt_upload(session, file, remote_name, local_size) {
                Ok(()) => {
                    progress.report(format!("✓ Verified: {} uploaded successfully.", remote_name));
                    return Ok(());
                }
                Err(e) => {
                    progress.report(format!("⚠️ Error uploading {}: {:#}", remote_name, e));
                    if attempt < self.max_retries {
                        std::thread::sleep(self.backoff);
                    }
                }
            }
        }

        Err(PipelineError::TransferExhausted {
            destination: destination.name.clone(),
            file: remote_name.to_string(),
            attempts: self.max_retries,
        }
        .into())
    }
}

fn attempt_upload(
    session: &mut dyn TransferSession,
    file: &Path,
    remote_name: &str,
    local_size: u64,
) -> Result<()> {
    session.store(file, remote_name)?;

    let remote_size = session.size(remote_name)?;
    if remote_size != local_size {
        anyhow::bail!("File size mismatch: local={}, remote={}", local_size, remote_size);
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    pub struct TransportState {
        /// Size checks that report a short remote file before behaving
        pub failing_verifications: u32,
        /// Destination names whose connect always fails
        pub unreachable: Vec<String>,
        pub connects: Vec<String>,
        pub stored: Vec<(String, String)>,
        last_size: Option<u64>,
    }

    /// In-memory transport scripted to fail a fixed number of verifications.
    #[derive(Clone, Default)]
    pub struct FakeTransport {
        pub state: Arc<Mutex<TransportState>>,
    }

    impl FakeTransport {
        pub fn failing_verifications(count: u32) -> Self {
            let fake = Self::default();
            fake.state.lock().unwrap().failing_verifications = count;
            fake
        }

        pub fn unreachable_destination(name: &str) -> Self {
            let fake = Self::default();
            fake.state.lock().unwrap().unreachable.push(name.to_string());
            fake
        }

        pub fn stored_names(&self) -> Vec<String> {
            self.state.lock().unwrap().stored.iter().map(|(_, n)| n.clone()).collect()
        }
    }

    impl Transport for FakeTransport {
        fn connect(&self, destination: &Destination) -> Result<Box<dyn TransferSession>> {
            let mut state = self.state.lock().unwrap();
            state.connects.push(destination.name.clone());
            if state.unreachable.contains(&destination.name) {
                anyhow::bail!("connection refused by {}", destination.host);
            }
            Ok(Box::new(FakeSession {
                destination: destination.name.clone(),
                state: Arc::clone(&self.state),
            }))
        }
    }

    struct FakeSession {
        destination: String,
        state: Arc<Mutex<TransportState>>,
    }

    impl TransferSession for FakeSession {
        fn store(&mut self, local: &Path, remote_name: &str) -> Result<()> {
            let size = fs_err::metadata(local)?.len();
            let mut state = self.state.lock().unwrap();
            state.stored.push((self.destination.clone(), remote_name.to_string()));
            state.last_size = Some(size);
            Ok(())
        }

        fn size(&mut self, _remote_name: &str) -> Result<u64> {
            let mut state = self.state.lock().unwrap();
            let uploaded = state.last_size.context("nothing stored yet")?;
            if state.failing_verifications > 0 {
                state.failing_verifications -= 1;
                // Simulate a truncated upload
                return Ok(uploaded.saturating_sub(1));
            }
            Ok(uploaded)
        }
    }
}
