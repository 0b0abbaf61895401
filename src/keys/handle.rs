use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::algorithm::KeyAlgorithm;
use crate::error::{GhostKeyError, KeyGenError, Result};

/// Append `.pub` to a key base path, keeping any dots already in the name.
pub fn public_key_path_for(base_path: &Path) -> PathBuf {
    let mut path = base_path.as_os_str().to_owned();
    path.push(".pub");
    PathBuf::from(path)
}

/// Remove a file, treating "already gone" as success.
pub(crate) async fn remove_if_present(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Restrict a private key file to owner read/write (0600).
#[cfg(unix)]
pub(crate) async fn restrict_to_owner(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    debug!(path = %path.display(), "Private key restricted to 0600");
    Ok(())
}

/// Permission bits have no owner-only equivalent here; nothing to enforce.
#[cfg(not(unix))]
pub(crate) async fn restrict_to_owner(path: &Path) -> io::Result<()> {
    debug!(path = %path.display(), "Skipping permission enforcement on this platform");
    Ok(())
}

/// One generated key pair on disk: `base_path` and `base_path.pub`.
///
/// Deletion state is never cached. Every [`is_deleted`](Self::is_deleted)
/// call looks at the filesystem, so removal by the lifecycle timer or by
/// something outside this process is observed as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPairHandle {
    private_key_path: PathBuf,
    public_key_path: PathBuf,
    algorithm: KeyAlgorithm,
}

impl KeyPairHandle {
    pub fn new(base_path: impl Into<PathBuf>, algorithm: KeyAlgorithm) -> Self {
        let private_key_path = base_path.into();
        let public_key_path = public_key_path_for(&private_key_path);
        Self {
            private_key_path,
            public_key_path,
            algorithm,
        }
    }

    pub fn private_key_path(&self) -> &Path {
        &self.private_key_path
    }

    pub fn public_key_path(&self) -> &Path {
        &self.public_key_path
    }

    /// The algorithm that produced this pair.
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Raw contents of the public key file.
    pub async fn public_key(&self) -> Result<Vec<u8>> {
        let bytes = tokio::fs::read(&self.public_key_path).await?;
        if bytes.is_empty() {
            return Err(GhostKeyError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("public key file {} is empty", self.public_key_path.display()),
            )));
        }
        Ok(bytes)
    }

    /// Parse the public key file and report the algorithm it declares.
    pub async fn algorithm_on_disk(&self) -> Result<KeyAlgorithm> {
        let text = tokio::fs::read_to_string(&self.public_key_path).await?;
        let key = ssh_key::PublicKey::from_openssh(text.trim())
            .map_err(|e| KeyGenError::InspectFailed(e.to_string()))?;
        KeyAlgorithm::from_ssh_key(&key.algorithm()).ok_or_else(|| {
            KeyGenError::InspectFailed(format!("unsupported key algorithm {}", key.algorithm()))
                .into()
        })
    }

    /// Remove both key files. Files that are already gone are not an error,
    /// so this may run any number of times.
    pub async fn delete(&self) -> Result<()> {
        let private = remove_if_present(&self.private_key_path).await;
        let public = remove_if_present(&self.public_key_path).await;
        private?;
        public?;
        info!(path = %self.private_key_path.display(), "Key pair deleted");
        Ok(())
    }

    /// A pair missing either file counts as deleted: a half-removed pair
    /// must never be used.
    pub async fn is_deleted(&self) -> bool {
        !(exists(&self.private_key_path).await && exists(&self.public_key_path).await)
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
