//! Preload pass configuration.

use serde::{Deserialize, Serialize};

/// Smallest number of frame boundaries the host needs after a scene
/// transition before the scene's objects can be enumerated.
pub const MIN_SETTLE_FRAMES: u32 = 2;

/// Configuration for the cross-scene preload pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloadConfig {
    /// Frame boundaries to wait after each scene transition.
    /// Values below [`MIN_SETTLE_FRAMES`] are raised to it.
    #[serde(default = "default_settle_frames")]
    pub settle_frames: u32,
    /// Whether to cover the screen while scenes are cycled.
    #[serde(default = "default_true")]
    pub use_blanker: bool,
}

impl PreloadConfig {
    /// Returns the effective number of frames to wait per transition.
    pub fn effective_settle_frames(&self) -> u32 {
        self.settle_frames.max(MIN_SETTLE_FRAMES)
    }
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            settle_frames: default_settle_frames(),
            use_blanker: true,
        }
    }
}

fn default_settle_frames() -> u32 {
    MIN_SETTLE_FRAMES
}

fn default_true() -> bool {
    true
}
