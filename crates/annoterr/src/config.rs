//! Stack-capture configuration.
//!
//! Library defaults with runtime environment overrides:
//!
//! | Variable              | Default | Effect                                            |
//! |-----------------------|---------|---------------------------------------------------|
//! | `ANNOTERR_MAX_FRAMES` | `1024`  | Upper bound on frames kept per error              |
//! | `ANNOTERR_CAPTURE`    | on      | Any value but `1`/`true`/`yes`/`on` disables it   |
//!
//! The environment is read once, the first time an error is constructed.
//! Stack resolution also needs the `backtrace` cargo feature (on by default).
//!
//! ```rust,ignore
//! use annoterr::CaptureConfig;
//!
//! let config = CaptureConfig::from_env().max_frames(32);
//! ```

use once_cell::sync::Lazy;

use crate::env::{env_get, env_get_bool};

/// Default frame bound.
pub const DEFAULT_MAX_FRAMES: usize = 1024;

/// How `AnnotatedError::new` captures the call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Capture at all.
    pub enabled: bool,
    /// Keep at most this many resolved frames.
    pub max_frames: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_frames: DEFAULT_MAX_FRAMES,
        }
    }
}

impl CaptureConfig {
    /// Library defaults with `ANNOTERR_*` overrides applied.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_get_bool("ANNOTERR_CAPTURE", defaults.enabled),
            max_frames: env_get("ANNOTERR_MAX_FRAMES", defaults.max_frames),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Frame bound to actually use; zero when capture is off.
    pub fn effective_max_frames(&self) -> usize {
        if self.enabled {
            self.max_frames
        } else {
            0
        }
    }
}

static GLOBAL: Lazy<CaptureConfig> = Lazy::new(|| {
    let config = CaptureConfig::from_env();
    tracing::trace!(?config, "stack capture configured");
    config
});

/// Process-wide capture configuration, read from the environment once.
pub fn global() -> &'static CaptureConfig {
    &GLOBAL
}
