use std::io;

use crate::{AnnotatedError, Context, ContextValue, ErrorType};

/// Built-in classification for an `io::ErrorKind`.
pub fn io_error_type(kind: io::ErrorKind) -> ErrorType {
    match kind {
        io::ErrorKind::NotFound          => ErrorType::NOT_FOUND,
        io::ErrorKind::PermissionDenied  => ErrorType::PERMISSION_DENIED,
        io::ErrorKind::TimedOut          => ErrorType::EXPIRED,
        io::ErrorKind::Interrupted       => ErrorType::CANCELLED,
        io::ErrorKind::InvalidData
        | io::ErrorKind::UnexpectedEof   => ErrorType::DATA_CORRUPTION,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::BrokenPipe      => ErrorType::SERVICE_UNAVAILABLE,
        _                                => ErrorType::FILE_SYSTEM,
    }
}

// ── From<io::Error> ───────────────────────────────────────────────

impl From<io::Error> for AnnotatedError {
    /// Classify by `io_error_type`, no context. The stack is captured
    /// here, so `?` records where the conversion happened.
    #[inline(never)]
    fn from(err: io::Error) -> Self {
        let error_type = io_error_type(err.kind());
        AnnotatedError::new(err, error_type, Context::none())
    }
}

// ── ResultExt — annotate errors on Results ────────────────────────

/// Extension trait for turning any `Result` error into an `AnnotatedError`.
///
/// ```
/// use annoterr::{ErrorType, ResultExt};
///
/// fn read_config() -> Result<String, annoterr::AnnotatedError> {
///     std::fs::read_to_string("/no/such/config.toml")
///         .annotate_with(ErrorType::FILE_SYSTEM, "/no/such/config.toml")
/// }
///
/// let err = read_config().unwrap_err();
/// assert!(err.is(ErrorType::FILE_SYSTEM));
/// ```
pub trait ResultExt<T> {
    /// Wrap the error, classified as `error_type`, with no context.
    fn annotate(self, error_type: ErrorType) -> Result<T, AnnotatedError>;

    /// Wrap the error with `context` as its payload.
    fn annotate_with<C: ContextValue>(
        self,
        error_type: ErrorType,
        context: C,
    ) -> Result<T, AnnotatedError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[inline(never)]
    fn annotate(self, error_type: ErrorType) -> Result<T, AnnotatedError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(AnnotatedError::new(e, error_type, Context::none())),
        }
    }

    #[inline(never)]
    fn annotate_with<C: ContextValue>(
        self,
        error_type: ErrorType,
        context: C,
    ) -> Result<T, AnnotatedError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(AnnotatedError::new(e, error_type, Context::new(context))),
        }
    }
}
