use std::collections::HashMap;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::algorithm::KeyAlgorithm;
use super::handle::{public_key_path_for, remove_if_present, restrict_to_owner, KeyPairHandle};
use super::keygen::KeygenTool;
use super::timer::LifecycleTimer;
use crate::error::{KeyGenError, Result};

/// Produces ephemeral key pairs that delete themselves after a time-to-live.
///
/// Clones share the table of armed timers, so regenerating a path through
/// any clone disarms the timer of the pair it replaces.
#[derive(Clone)]
pub struct KeyGenerator {
    tool: Arc<dyn KeygenTool>,
    armed: Arc<Mutex<HashMap<PathBuf, AbortHandle>>>,
}

impl KeyGenerator {
    pub fn new(tool: impl KeygenTool + 'static) -> Self {
        Self::from_shared(Arc::new(tool))
    }

    pub fn from_shared(tool: Arc<dyn KeygenTool>) -> Self {
        Self {
            tool,
            armed: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Stop the timer of a previous pair at `base_path`, if one is pending.
    fn disarm(&self, base_path: &Path) {
        let mut armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);
        armed.retain(|_, timer| !timer.is_finished());
        if let Some(previous) = armed.remove(base_path) {
            previous.abort();
            debug!(path = %base_path.display(), "Disarmed timer of replaced key pair");
        }
    }

    fn track(&self, base_path: &Path, timer: &LifecycleTimer) {
        self.armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(base_path.to_path_buf(), timer.abort_handle());
    }

    /// Generate a fresh key pair at `base_path` and arm its self-destruct.
    ///
    /// Existing files at that path are always overwritten. Algorithms are
    /// tried in [`KeyAlgorithm::PREFERENCE`] order; only when all of them
    /// fail does this return [`KeyGenError::Exhausted`]. The private key is
    /// restricted to its owner before the handle is handed out.
    pub async fn get_or_create(
        &self,
        base_path: impl AsRef<Path>,
        ttl: Duration,
    ) -> Result<EphemeralKeyPair> {
        let base_path = base_path.as_ref();
        // The old pair's timer must not outlive it and delete the new files.
        self.disarm(base_path);
        let algorithm = self.generate_with_fallback(base_path).await?;

        if let Err(e) = restrict_to_owner(base_path).await {
            discard_attempt(base_path).await;
            return Err(e.into());
        }

        let handle = KeyPairHandle::new(base_path, algorithm);
        let doomed = handle.clone();
        let timer = LifecycleTimer::arm(ttl, move || async move {
            info!(path = %doomed.private_key_path().display(), "Key pair TTL elapsed");
            if let Err(e) = doomed.delete().await {
                warn!(path = %doomed.private_key_path().display(), error = %e, "Scheduled key deletion failed");
            }
        });
        self.track(base_path, &timer);

        info!(
            path = %base_path.display(),
            %algorithm,
            ?ttl,
            "Ephemeral key pair ready"
        );

        Ok(EphemeralKeyPair { handle, timer })
    }

    async fn generate_with_fallback(&self, base_path: &Path) -> Result<KeyAlgorithm> {
        let mut tried = Vec::with_capacity(KeyAlgorithm::PREFERENCE.len());
        for algorithm in KeyAlgorithm::PREFERENCE {
            tried.push(algorithm);
            if self.tool.generate(base_path, algorithm).await {
                return Ok(algorithm);
            }
            warn!(path = %base_path.display(), %algorithm, "Key generation failed, trying next algorithm");
            discard_attempt(base_path).await;
        }

        Err(KeyGenError::Exhausted {
            path: base_path.to_path_buf(),
            tried,
        }
        .into())
    }
}

/// Remove whatever a failed attempt left behind, so a lone private or public
/// key file never outlives the failure.
async fn discard_attempt(base_path: &Path) {
    for path in [base_path.to_path_buf(), public_key_path_for(base_path)] {
        if let Err(e) = remove_if_present(&path).await {
            warn!(path = %path.display(), error = %e, "Cannot remove leftover key file");
        }
    }
}

/// A live key pair together with the timer that will delete it.
#[derive(Debug)]
pub struct EphemeralKeyPair {
    handle: KeyPairHandle,
    timer: LifecycleTimer,
}

impl EphemeralKeyPair {
    pub fn handle(&self) -> &KeyPairHandle {
        &self.handle
    }

    pub fn timer(&self) -> &LifecycleTimer {
        &self.timer
    }

    pub fn into_parts(self) -> (KeyPairHandle, LifecycleTimer) {
        (self.handle, self.timer)
    }
}

impl Deref for EphemeralKeyPair {
    type Target = KeyPairHandle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}
