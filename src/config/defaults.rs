use std::path::PathBuf;

use super::settings::*;

impl Default for GhostKeyConfig {
    fn default() -> Self {
        Self {
            keygen: KeygenSettings::default(),
            lifecycle: LifecycleSettings::default(),
        }
    }
}

impl Default for KeygenSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ssh-keygen"),
            rsa_bits: 4096,
            comment: None,
        }
    }
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            default_ttl_ms: 30_000,
            key_dir: None,
        }
    }
}
