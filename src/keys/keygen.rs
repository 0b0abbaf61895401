use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::algorithm::KeyAlgorithm;
use super::handle::{public_key_path_for, remove_if_present};
use crate::config::KeygenSettings;
use crate::error::{GhostKeyError, KeyGenError};

/// A single attempt at producing a key pair on disk.
///
/// Implementations write `base_path` (private key) and `base_path.pub`
/// (public key), replacing whatever was there, and report whether both files
/// were produced. Failure is a plain `false`: the caller decides whether to
/// fall back to another algorithm.
#[async_trait]
pub trait KeygenTool: Send + Sync {
    async fn generate(&self, base_path: &Path, algorithm: KeyAlgorithm) -> bool;
}

/// Shells out to OpenSSH's `ssh-keygen`.
#[derive(Debug, Clone)]
pub struct SshKeygen {
    program: PathBuf,
    rsa_bits: u32,
    comment: Option<String>,
}

impl SshKeygen {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            rsa_bits: 4096,
            comment: None,
        }
    }

    pub fn from_settings(settings: &KeygenSettings) -> Self {
        Self {
            program: settings.program.clone(),
            rsa_bits: settings.rsa_bits,
            comment: settings.comment.clone(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn generate_command(&self, base_path: &Path, algorithm: KeyAlgorithm) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-t").arg(algorithm.keygen_type());
        if algorithm == KeyAlgorithm::Rsa {
            cmd.arg("-b").arg(self.rsa_bits.to_string());
        }
        cmd.arg("-N").arg("").arg("-q");
        if let Some(ref comment) = self.comment {
            cmd.arg("-C").arg(comment);
        }
        cmd.arg("-f")
            .arg(base_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Ask the tool which algorithm the key at `path` uses
    /// (`ssh-keygen -vvv -l -f <path>`).
    pub async fn inspect(&self, path: &Path) -> Result<KeyAlgorithm, GhostKeyError> {
        let output = Command::new(&self.program)
            .arg("-vvv")
            .arg("-l")
            .arg("-f")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(KeyGenError::SpawnFailed)?;

        if !output.status.success() {
            return Err(KeyGenError::InspectFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .find_map(KeyAlgorithm::from_fingerprint_line)
            .ok_or_else(|| {
                KeyGenError::InspectFailed(format!(
                    "no algorithm tag in output for {}",
                    path.display()
                ))
                .into()
            })
    }
}

impl Default for SshKeygen {
    fn default() -> Self {
        Self::new("ssh-keygen")
    }
}

#[async_trait]
impl KeygenTool for SshKeygen {
    async fn generate(&self, base_path: &Path, algorithm: KeyAlgorithm) -> bool {
        let public_path = public_key_path_for(base_path);

        // ssh-keygen prompts before overwriting, so clear the way first.
        for path in [base_path, public_path.as_path()] {
            if let Err(e) = remove_if_present(path).await {
                warn!(path = %path.display(), error = %e, "Cannot remove stale key file");
                return false;
            }
        }

        info!(
            program = %self.program.display(),
            path = %base_path.display(),
            %algorithm,
            "Running key generation tool"
        );

        let output = match self.generate_command(base_path, algorithm).output().await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, %algorithm, "Failed to spawn key generation tool");
                return false;
            }
        };

        if !output.stderr.is_empty() {
            debug!(stderr = %String::from_utf8_lossy(&output.stderr).trim(), "ssh-keygen stderr");
        }

        if !output.status.success() {
            warn!(status = %output.status, %algorithm, "ssh-keygen exited with failure");
            return false;
        }

        let produced = tokio::fs::try_exists(base_path).await.unwrap_or(false)
            && tokio::fs::try_exists(&public_path).await.unwrap_or(false);
        if !produced {
            warn!(path = %base_path.display(), %algorithm, "ssh-keygen succeeded but key files are missing");
        }
        produced
    }
}
