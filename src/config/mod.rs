mod defaults;
mod settings;

pub use settings::{GhostKeyConfig, KeygenSettings, LifecycleSettings};
