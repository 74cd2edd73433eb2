//! # annoterr — annotated errors
//!
//! Tag a failure with a registered error type, attach any payload, and get
//! the call stack at the point of failure for free.
//!
//! ## Design
//!
//! - **`ErrorType`**: a small integer from a `TypeRegistry`. Names are
//!   registered at startup or lazily; the same name always maps to the same
//!   id, from any thread. Nine generic types are built in.
//!
//! - **`AnnotatedError`**: immutable bundle of cause, type, `Context`
//!   payload and captured `Frame`s. Branch on `.error_type()`, read
//!   `.context()`, or print it.
//!
//! ## Quick Start
//!
//! ```rust
//! use annoterr::{annotate, AnnotatedError, Context, ErrorType};
//!
//! fn simulate_network_fail(network_fail: ErrorType) -> AnnotatedError {
//!     annotate!("No network connection", network_fail)
//! }
//!
//! // Register a new error type
//! let network_fail = annoterr::register("NetworkFail");
//! let err = simulate_network_fail(network_fail);
//! assert!(err.render().starts_with("Error reason : NetworkFail\n"));
//!
//! let err = AnnotatedError::new("File is corrupted", ErrorType::DATA_CORRUPTION,
//!                               Context::new("/disk/a/report"));
//! if err.error_type() == ErrorType::DATA_CORRUPTION {
//!     assert_eq!(err.context().downcast_ref::<&str>(), Some(&"/disk/a/report"));
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Flag        | Effect |
//! |-------------|--------|
//! | `backtrace` | Resolves call stacks on construction (default) |
//! | `metrics`   | Per-type AtomicU64 counters, Prometheus dump |
//!
//! ## Environment
//!
//! `ANNOTERR_MAX_FRAMES` and `ANNOTERR_CAPTURE`; see [`CaptureConfig`].

mod id;
mod registry;
mod context;
mod frame;
mod error;
#[macro_use]
mod macros;
mod convert;
mod config;
mod env;

#[cfg(feature = "metrics")]
pub mod metrics;

// ── Public API ────────────────────────────────────────────────────

pub use id::ErrorType;
pub use registry::{global as global_registry, register, RegistryError, TypeRegistry};
pub use context::{Context, ContextValue};
pub use frame::{FixedFrames, Frame, FrameSource, SystemFrames, UNKNOWN_FILE};
pub use error::AnnotatedError;
pub use convert::{io_error_type, ResultExt};
pub use config::{global as capture_config, CaptureConfig, DEFAULT_MAX_FRAMES};

/// Convenience Result alias.
pub type Result<T, E = AnnotatedError> = std::result::Result<T, E>;
