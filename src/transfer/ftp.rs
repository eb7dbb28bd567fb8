use std::path::Path;

use anyhow::Context;
use suppaftp::types::FileType;
use suppaftp::FtpStream;

use super::{TransferSession, Transport};
use crate::config::Destination;
use crate::Result;

/// FTP-backed transport: one control connection per destination batch,
/// binary mode, passive transfers.
pub struct FtpTransport;

impl FtpTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FtpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for FtpTransport {
    fn connect(&self, destination: &Destination) -> Result<Box<dyn TransferSession>> {
        let addr = format!("{}:{}", destination.host, destination.port);
        tracing::debug!("Connecting to {} ({})", destination.name, addr);

        let mut stream = FtpStream::connect(&addr)
            .with_context(|| format!("FTP connect to {} failed", addr))?;
        stream
            .login(&destination.user, &destination.password)
            .with_context(|| format!("FTP login to {} failed", destination.host))?;
        stream
            .transfer_type(FileType::Binary)
            .context("Failed to switch FTP connection to binary mode")?;
        stream
            .cwd(&destination.remote_dir)
            .with_context(|| format!("Failed to enter remote directory {}", destination.remote_dir))?;

        Ok(Box::new(FtpSession { stream }))
    }
}

struct FtpSession {
    stream: FtpStream,
}

impl TransferSession for FtpSession {
    fn store(&mut self, local: &Path, remote_name: &str) -> Result<()> {
        let mut file = fs_err::File::open(local)?;
        self.stream
            .put_file(remote_name, &mut file)
            .with_context(|| format!("STOR {} failed", remote_name))?;
        Ok(())
    }

    fn size(&mut self, remote_name: &str) -> Result<u64> {
        let size = self
            .stream
            .size(remote_name)
            .with_context(|| format!("SIZE {} failed", remote_name))?;
        Ok(size as u64)
    }
}

impl Drop for FtpSession {
    fn drop(&mut self) {
        let _ = self.stream.quit();
    }
}
