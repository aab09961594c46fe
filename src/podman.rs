//! # Podman CLI Engine
//!
//! Implements [`EngineClient`] by running the `podman` binary with
//! `--format json` and decoding its output. This reaches local and remote
//! engines alike: remote access goes through podman's own `--url`,
//! `--identity` and `--connection` flags, so SSH tunnelling and socket
//! discovery stay podman's business.
//!
//! ## Commands
//!
//! | Operation       | Command                                    |
//! |-----------------|--------------------------------------------|
//! | `list_images`   | `podman images [--all] --format json`      |
//! | `list_networks` | `podman network ls --format json`          |
//!
//! ## Bounds
//!
//! Every command is bounded by [`PodmanConfig::timeout`] (default
//! [`ENGINE_COMMAND_TIMEOUT`]) and by the caller's cancellation token. The
//! child process is killed when either fires. Stdout is read through a
//! [`PodmanConfig::max_output_size`] window (default [`MAX_OUTPUT_SIZE`]):
//! the first byte past it kills the command and fails it, since truncated
//! JSON cannot be decoded.
//!
//! [`ENGINE_COMMAND_TIMEOUT`]: crate::constants::ENGINE_COMMAND_TIMEOUT
//! [`MAX_OUTPUT_SIZE`]: crate::constants::MAX_OUTPUT_SIZE

use crate::constants::{
    DEFAULT_PODMAN_BINARY, ENGINE_COMMAND_TIMEOUT, MAX_OUTPUT_SIZE, MAX_STDERR_IN_ERROR,
};
use crate::engine::{EngineClient, ImageSummary, NetworkListReport};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Settings for reaching a podman engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodmanConfig {
    /// Engine binary, looked up on `PATH` when relative.
    pub binary: PathBuf,
    /// Remote service URL (`unix://...`, `ssh://...`, `tcp://...`).
    pub url: Option<String>,
    /// SSH identity file for remote URLs.
    pub identity: Option<PathBuf>,
    /// Named system connection.
    pub connection: Option<String>,
    /// Per-command timeout.
    pub timeout: Duration,
    /// Largest stdout accepted from one command, in bytes.
    pub max_output_size: usize,
}

impl Default for PodmanConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_PODMAN_BINARY),
            url: None,
            identity: None,
            connection: None,
            timeout: ENGINE_COMMAND_TIMEOUT,
            max_output_size: MAX_OUTPUT_SIZE,
        }
    }
}

impl PodmanConfig {
    /// Uses a specific engine binary.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Talks to a remote service.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Authenticates remote access with this SSH key.
    pub fn with_identity(mut self, identity: impl Into<PathBuf>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Uses a named system connection.
    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    /// Overrides the per-command timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the stdout limit.
    pub fn with_max_output_size(mut self, limit: usize) -> Self {
        self.max_output_size = limit;
        self
    }

    /// Global flags placed before the subcommand.
    pub fn global_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(connection) = &self.connection {
            args.push("--connection".to_string());
            args.push(connection.clone());
        }
        if let Some(url) = &self.url {
            args.push("--url".to_string());
            args.push(url.clone());
        }
        if let Some(identity) = &self.identity {
            args.push("--identity".to_string());
            args.push(identity.to_string_lossy().into_owned());
        }
        args
    }
}

/// [`EngineClient`] backed by the `podman` command line.
#[derive(Debug, Clone, Default)]
pub struct PodmanCli {
    config: PodmanConfig,
}

impl PodmanCli {
    /// Creates a client with default settings (local `podman` on `PATH`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client from explicit settings.
    pub fn with_config(config: PodmanConfig) -> Self {
        Self { config }
    }

    /// Returns the active settings.
    pub fn config(&self) -> &PodmanConfig {
        &self.config
    }

    /// Runs a podman subcommand and decodes its JSON array output.
    ///
    /// Empty output and a literal `null` both decode to an empty list;
    /// podman prints either when there is nothing to report.
    async fn run_json<T: DeserializeOwned>(
        &self,
        args: &[&str],
        cancel: &CancellationToken,
    ) -> Result<Vec<T>> {
        let mut all_args = self.config.global_args();
        all_args.extend(args.iter().map(|a| a.to_string()));
        let command = format!("{} {}", self.config.binary.display(), all_args.join(" "));
        debug!("engine command: {}", command);

        let mut cmd = Command::new(&self.config.binary);
        cmd.args(&all_args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::EngineUnavailable {
                    binary: self.config.binary.display().to_string(),
                    reason: e.to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let limit = self.config.max_output_size;

        let run = async {
            let read_stdout = async {
                let mut buf = Vec::new();
                if let Some(stdout) = stdout {
                    stdout.take(limit as u64 + 1).read_to_end(&mut buf).await?;
                }
                if buf.len() > limit {
                    return Err(Error::OutputTooLarge {
                        command: command.clone(),
                        limit,
                    });
                }
                Ok::<_, Error>(buf)
            };
            let read_stderr = async {
                let mut buf = Vec::new();
                if let Some(stderr) = stderr {
                    stderr.take(limit as u64).read_to_end(&mut buf).await?;
                }
                Ok::<_, Error>(buf)
            };
            let (stdout, stderr) = tokio::try_join!(read_stdout, read_stderr)?;
            let status = child.wait().await?;
            Ok::<_, Error>((status, stdout, stderr))
        };

        // Returning early drops `child`, which kills the process.
        let (status, stdout, stderr) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(Error::Cancelled(command.clone()));
            }
            result = timeout(self.config.timeout, run) => {
                result.map_err(|_| Error::Timeout {
                    operation: command.clone(),
                    duration: self.config.timeout,
                })??
            }
        };

        if !status.success() {
            let stderr: String = String::from_utf8_lossy(&stderr)
                .trim()
                .chars()
                .take(MAX_STDERR_IN_ERROR)
                .collect();
            warn!("engine command failed: {} ({})", command, status);
            return Err(Error::CommandFailed {
                command,
                status: status.to_string(),
                stderr,
            });
        }

        decode_list(&stdout)
    }
}

/// Decodes a JSON array, treating empty output and `null` as no entries.
pub(crate) fn decode_list<T: DeserializeOwned>(stdout: &[u8]) -> Result<Vec<T>> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let list: Option<Vec<T>> = serde_json::from_slice(stdout)?;
    Ok(list.unwrap_or_default())
}

#[async_trait]
impl EngineClient for PodmanCli {
    async fn list_images(
        &self,
        include_all: bool,
        cancel: &CancellationToken,
    ) -> Result<Vec<ImageSummary>> {
        let mut args = vec!["images"];
        if include_all {
            args.push("--all");
        }
        args.extend(["--format", "json"]);
        self.run_json(&args, cancel).await
    }

    async fn list_networks(&self, cancel: &CancellationToken) -> Result<Vec<NetworkListReport>> {
        self.run_json(&["network", "ls", "--format", "json"], cancel)
            .await
    }
}
