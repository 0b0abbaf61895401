use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key algorithms understood by the generator, in no particular order.
/// Use [`KeyAlgorithm::PREFERENCE`] for the order in which they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    Ed25519,
    Rsa,
}

impl KeyAlgorithm {
    /// First entry wins; later entries are fallbacks.
    pub const PREFERENCE: [KeyAlgorithm; 2] = [KeyAlgorithm::Ed25519, KeyAlgorithm::Rsa];

    /// Value passed to `ssh-keygen -t`.
    pub fn keygen_type(&self) -> &'static str {
        match self {
            KeyAlgorithm::Ed25519 => "ed25519",
            KeyAlgorithm::Rsa => "rsa",
        }
    }

    /// Parse the algorithm tag printed at the end of an `ssh-keygen -l` line,
    /// e.g. `256 SHA256:... comment (ED25519)`.
    pub fn from_fingerprint_line(line: &str) -> Option<Self> {
        let tag = line.trim_end().rsplit_once('(')?.1.strip_suffix(')')?;
        tag.parse().ok()
    }

    pub(crate) fn from_ssh_key(algorithm: &ssh_key::Algorithm) -> Option<Self> {
        match algorithm {
            ssh_key::Algorithm::Ed25519 => Some(KeyAlgorithm::Ed25519),
            ssh_key::Algorithm::Rsa { .. } => Some(KeyAlgorithm::Rsa),
            _ => None,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Ed25519 => f.write_str("ED25519"),
            KeyAlgorithm::Rsa => f.write_str("RSA"),
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ed25519" | "ssh-ed25519" => Ok(KeyAlgorithm::Ed25519),
            "rsa" | "ssh-rsa" => Ok(KeyAlgorithm::Rsa),
            other => Err(format!("unknown key algorithm: {other}")),
        }
    }
}
