mod algorithm;
mod generator;
mod handle;
mod keygen;
mod timer;

pub use algorithm::KeyAlgorithm;
pub use generator::{EphemeralKeyPair, KeyGenerator};
pub use handle::{public_key_path_for, KeyPairHandle};
pub use keygen::{KeygenTool, SshKeygen};
pub use timer::LifecycleTimer;
