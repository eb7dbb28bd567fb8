use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::distribute::{DeliveryRule, OutputKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Local processing settings
    pub processing: ProcessingConfig,

    /// Upload behavior shared by every destination
    pub transfer: TransferConfig,

    /// Upload destinations, attempted in the order they are listed
    pub destinations: Vec<Destination>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Directory the output file set is written into
    pub output_dir: PathBuf,

    /// ffmpeg binary used for MP3 encoding
    pub ffmpeg_bin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Upload attempts per file before the destination's batch fails
    pub max_retries: u32,

    /// Seconds to wait between attempts
    pub backoff_secs: u64,
}

/// Static configuration for one upload target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    pub host: String,
    #[serde(default = "default_ftp_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub remote_dir: String,
    /// Which outputs this destination receives, and under what names
    pub rule: DeliveryRule,
}

fn default_ftp_port() -> u16 {
    21
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig {
                output_dir: PathBuf::from("processed"),
                ffmpeg_bin: "ffmpeg".to_string(),
            },
            transfer: TransferConfig { max_retries: 3, backoff_secs: 2 },
            destinations: vec![
                Destination {
                    name: "srn".to_string(),
                    host: "ftp.srn.example.com".to_string(),
                    port: 21,
                    user: "stevebrown".to_string(),
                    password: "".to_string(),
                    remote_dir: "/".to_string(),
                    rule: DeliveryRule::Only {
                        kinds: vec![OutputKind::Highlight, OutputKind::FeedSegment],
                    },
                },
                Destination {
                    name: "ambos".to_string(),
                    host: "ftp.ambos.example.com".to_string(),
                    port: 21,
                    user: "KLProducer".to_string(),
                    password: "".to_string(),
                    remote_dir: "/users/klproducer/Steve Brown Etc".to_string(),
                    rule: DeliveryRule::Renamed {
                        kind: OutputKind::Highlight,
                        suffixes: vec!["NONCOM".to_string(), "COM".to_string()],
                    },
                },
                Destination {
                    name: "kln".to_string(),
                    host: "ftp.kln.example.com".to_string(),
                    port: 21,
                    user: "acc1186603788".to_string(),
                    password: "".to_string(),
                    remote_dir: "/sbetc/steve-brown-etc-podcast".to_string(),
                    rule: DeliveryRule::Only { kinds: vec![OutputKind::Podcast] },
                },
            ],
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("showsplit").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.destinations.is_empty() {
            anyhow::bail!("At least one upload destination must be configured");
        }

        if self.transfer.max_retries == 0 {
            anyhow::bail!("transfer.max_retries must be at least 1");
        }

        for dest in &self.destinations {
            if dest.host.is_empty() {
                anyhow::bail!("Destination {:?} has no host", dest.name);
            }
            if let DeliveryRule::Renamed { suffixes, .. } = &dest.rule {
                if suffixes.is_empty() {
                    anyhow::bail!(
                        "Destination {:?} uses a rename rule with no suffixes",
                        dest.name
                    );
                }
            }
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Output dir: {}", self.processing.output_dir.display());
        println!("  ffmpeg: {}", self.processing.ffmpeg_bin);
        println!(
            "  Transfer: {} attempts, {}s backoff",
            self.transfer.max_retries, self.transfer.backoff_secs
        );
        println!("  Destinations:");
        for dest in &self.destinations {
            println!(
                "    {} - {}:{}{} ({})",
                dest.name, dest.host, dest.port, dest.remote_dir, dest.rule
            );
        }
    }
}
