use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::config::{self, CaptureConfig};
use crate::context::Context;
use crate::frame::{Frame, FrameSource, SystemFrames};
use crate::registry::{self, RegistryError, TypeRegistry};
use crate::ErrorType;

/// An error tagged with an [`ErrorType`], a caller payload and the call
/// stack at the point it was created.
///
/// All fields are fixed at construction. Cloning is cheap and shares the
/// same cause, context and trace, so an `AnnotatedError` can be handed to
/// any number of threads.
///
/// # Rendering
///
/// `Display` (and [`render`](Self::render)) produce:
///
/// ```text
/// Error reason : NotFound
/// Error message: no such user
/// Stack:
/// 	app::load_user
/// 		 at src/app.rs:12
/// 	app::main
/// 		 at src/main.rs:4
/// ```
///
/// The reason line needs the type's name from the process-wide registry.
/// An id that registry never issued is a bug in the caller, and rendering
/// panics rather than print a guess. Use [`try_render`](Self::try_render)
/// or [`render_with`](Self::render_with) for ids from another registry.
#[derive(Clone)]
pub struct AnnotatedError {
    inner: Arc<Inner>,
}

struct Inner {
    cause: Box<dyn Error + Send + Sync>,
    error_type: ErrorType,
    context: Context,
    trace: Vec<Frame>,
}

// ── Constructors ──────────────────────────────────────────────────

impl AnnotatedError {
    /// Wrap `cause`, capturing the current call stack.
    ///
    /// `cause` can be any `Error + Send + Sync`, or a `&str`/`String`
    /// message. Never fails; with capture disabled or no resolvable frames
    /// the trace is simply empty.
    ///
    /// ```
    /// use annoterr::{AnnotatedError, Context, ErrorType};
    ///
    /// let err = AnnotatedError::new("File is corrupted", ErrorType::DATA_CORRUPTION,
    ///                               Context::new("/disk/a/report"));
    /// assert!(err.is(ErrorType::DATA_CORRUPTION));
    /// assert_eq!(err.context().downcast_ref::<&str>(), Some(&"/disk/a/report"));
    /// ```
    #[inline(never)]
    pub fn new<E>(cause: E, error_type: ErrorType, context: Context) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self::with_config(cause, error_type, context, config::global())
    }

    /// Like [`new`](Self::new), with capture governed by `config` instead of
    /// the process-wide [`CaptureConfig`].
    #[inline(never)]
    pub fn with_config<E>(
        cause: E,
        error_type: ErrorType,
        context: Context,
        config: &CaptureConfig,
    ) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let trace = SystemFrames.capture(config.effective_max_frames());
        Self::with_trace(cause, error_type, context, trace)
    }

    /// Like [`new`](Self::new), with the stack taken from `source`.
    #[inline(never)]
    pub fn capture_with<E>(
        cause: E,
        error_type: ErrorType,
        context: Context,
        source: &dyn FrameSource,
    ) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let trace = source.capture(config::global().max_frames);
        Self::with_trace(cause, error_type, context, trace)
    }

    /// Build from an already captured trace.
    pub fn with_trace<E>(
        cause: E,
        error_type: ErrorType,
        context: Context,
        trace: Vec<Frame>,
    ) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        #[cfg(feature = "metrics")]
        crate::metrics::bump(error_type);

        tracing::trace!(id = error_type.id(), frames = trace.len(), "annotated error created");

        Self {
            inner: Arc::new(Inner {
                cause: cause.into(),
                error_type,
                context,
                trace,
            }),
        }
    }
}

// ── Accessors ─────────────────────────────────────────────────────

impl AnnotatedError {
    /// The wrapped failure.
    #[inline]
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.inner.cause
    }

    /// The cause as a concrete type.
    pub fn cause_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.inner.cause.downcast_ref::<E>()
    }

    #[inline]
    pub fn error_type(&self) -> ErrorType {
        self.inner.error_type
    }

    /// True if this error is classified as `t`.
    #[inline]
    pub fn is(&self, t: ErrorType) -> bool {
        self.inner.error_type == t
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.inner.context
    }

    /// Frames captured at construction, innermost first.
    #[inline]
    pub fn trace(&self) -> &[Frame] {
        &self.inner.trace
    }
}

// ── Rendering ─────────────────────────────────────────────────────

impl AnnotatedError {
    /// Multi-line diagnostic text, resolving the type name in the
    /// process-wide registry.
    ///
    /// # Panics
    ///
    /// If the error type was never issued by the process-wide registry.
    pub fn render(&self) -> String {
        self.render_with(registry::global())
    }

    /// [`render`](Self::render) against an explicit registry.
    ///
    /// # Panics
    ///
    /// If the error type was never issued by `registry`.
    pub fn render_with(&self, registry: &TypeRegistry) -> String {
        self.write_rendered(&registry.name_of(self.inner.error_type))
    }

    /// Non-panicking [`render`](Self::render).
    pub fn try_render(&self) -> Result<String, RegistryError> {
        self.try_render_with(registry::global())
    }

    /// Non-panicking [`render_with`](Self::render_with).
    pub fn try_render_with(&self, registry: &TypeRegistry) -> Result<String, RegistryError> {
        let name = registry.try_name_of(self.inner.error_type)?;
        Ok(self.write_rendered(&name))
    }

    fn write_rendered(&self, type_name: &str) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut out, type_name);
        out
    }

    fn write_to<W: fmt::Write>(&self, out: &mut W, type_name: &str) -> fmt::Result {
        writeln!(out, "Error reason : {}", type_name)?;
        writeln!(out, "Error message: {}", self.inner.cause)?;
        out.write_str("Stack:\n")?;
        for frame in &self.inner.trace {
            writeln!(out, "{}", frame)?;
        }
        Ok(())
    }
}

// ── std::error::Error ─────────────────────────────────────────────

impl Error for AnnotatedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.inner.cause)
    }
}

// ── Display ───────────────────────────────────────────────────────

impl fmt::Display for AnnotatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = registry::global().name_of(self.inner.error_type);
        self.write_to(f, &name)
    }
}

// ── Debug ─────────────────────────────────────────────────────────

impl fmt::Debug for AnnotatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatedError")
            .field("error_type", &self.inner.error_type)
            .field("cause", &self.inner.cause)
            .field("context", &self.inner.context)
            .field("frames", &self.inner.trace.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FixedFrames;

    fn frames() -> Vec<Frame> {
        vec![
            Frame::new("app::load_user", "src/app.rs", 12),
            Frame::new("app::main", "src/main.rs", 4),
        ]
    }

    #[test]
    fn context_preserved_exactly() {
        let e = AnnotatedError::new("test error", ErrorType::GENERIC, Context::new(10));
        assert_eq!(e.context().downcast_ref::<i32>(), Some(&10));

        let e = AnnotatedError::new("test error", ErrorType::GENERIC, Context::new(true));
        assert_eq!(e.context().downcast_ref::<bool>(), Some(&true));

        let e = AnnotatedError::new("test error", ErrorType::GENERIC, Context::none());
        assert!(e.context().is_none());
    }

    #[test]
    fn type_preserved_exactly() {
        let e = AnnotatedError::new("test error", ErrorType::NOT_FOUND, Context::none());
        assert_eq!(e.error_type(), ErrorType::NOT_FOUND);
        assert_eq!(e.error_type().to_string(), "NotFound");
        assert!(e.is(ErrorType::NOT_FOUND));
        assert!(!e.is(ErrorType::GENERIC));
    }

    #[test]
    fn custom_type() {
        let network_fail = crate::register("error::tests::NetworkFail");
        let e = AnnotatedError::new("No network connection", network_fail, Context::none());
        assert_eq!(e.error_type(), network_fail);
        assert!(e.render().starts_with("Error reason : error::tests::NetworkFail\n"));
    }

    #[test]
    fn cause_is_kept() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let e = AnnotatedError::new(io, ErrorType::FILE_SYSTEM, Context::none());
        assert_eq!(e.cause().to_string(), "disk on fire");
        assert_eq!(
            e.cause_ref::<std::io::Error>().map(|io| io.kind()),
            Some(std::io::ErrorKind::Other)
        );
        assert!(e.source().is_some());
    }

    #[cfg(all(feature = "backtrace", debug_assertions))]
    #[inline(never)]
    fn create_error() -> AnnotatedError {
        AnnotatedError::new("test error", ErrorType::NOT_FOUND, Context::none())
    }

    #[cfg(all(feature = "backtrace", debug_assertions))]
    #[inline(never)]
    fn nested_function_call() -> AnnotatedError {
        create_error()
    }

    #[cfg(all(feature = "backtrace", debug_assertions))]
    #[test]
    fn nested_call_captures_innermost_first() {
        let e = nested_function_call();
        let trace = e.trace();
        assert!(trace.len() >= 2, "trace: {:?}", trace);
        assert!(trace[0].function.ends_with("create_error"), "trace: {:?}", trace);
        assert!(trace[1].function.ends_with("nested_function_call"), "trace: {:?}", trace);
        assert!(trace[0].file.ends_with("error.rs"), "trace: {:?}", trace);
        assert!(trace[0].line > 0);
    }

    // A user `From` impl that builds the error while `?` converts.
    #[cfg(all(feature = "backtrace", debug_assertions))]
    mod user_conversion {
        use super::*;

        struct ParseFailure;

        struct AppError(AnnotatedError);

        #[inline(never)]
        fn classify_parse_failure() -> AnnotatedError {
            AnnotatedError::new("bad header", ErrorType::DATA_CORRUPTION, Context::none())
        }

        impl From<ParseFailure> for AppError {
            #[inline(never)]
            fn from(_: ParseFailure) -> Self {
                AppError(classify_parse_failure())
            }
        }

        #[inline(never)]
        fn parse() -> Result<(), ParseFailure> {
            Err(ParseFailure)
        }

        #[inline(never)]
        fn handler() -> Result<(), AppError> {
            parse()?;
            Ok(())
        }

        #[test]
        fn user_conversion_frames_are_kept() {
            let e = match handler() {
                Err(AppError(e)) => e,
                Ok(()) => panic!("handler should fail"),
            };
            let names: Vec<&str> = e.trace().iter().map(|f| f.function.as_str()).collect();
            assert!(names[0].ends_with("classify_parse_failure"), "trace: {:?}", names);
            let from = names.iter().position(|n| n.contains("AppError as core::convert::From"));
            let handler = names.iter().position(|n| n.ends_with("user_conversion::handler"));
            assert!(
                matches!((from, handler), (Some(a), Some(b)) if 0 < a && a < b),
                "trace: {:?}",
                names
            );
        }
    }

    #[test]
    fn disabled_capture_gives_empty_trace() {
        let config = CaptureConfig::default().enabled(false);
        let e = AnnotatedError::with_config("x", ErrorType::GENERIC, Context::none(), &config);
        assert!(e.trace().is_empty());
        assert!(e.render().ends_with("Stack:\n"));
    }

    #[cfg(feature = "backtrace")]
    #[test]
    fn configured_bound_limits_trace() {
        let config = CaptureConfig::default().max_frames(1);
        let e = AnnotatedError::with_config("x", ErrorType::GENERIC, Context::none(), &config);
        assert_eq!(e.trace().len(), 1);
    }

    #[cfg(all(feature = "backtrace", debug_assertions))]
    #[test]
    fn configured_capture_starts_at_caller() {
        let config = CaptureConfig::default().max_frames(2);
        let e = AnnotatedError::with_config("x", ErrorType::GENERIC, Context::none(), &config);
        assert_eq!(e.trace().len(), 2);
        assert!(
            e.trace()[0].function.ends_with("configured_capture_starts_at_caller"),
            "trace: {:?}",
            e.trace()
        );
    }

    #[test]
    fn render_format() {
        let e = AnnotatedError::with_trace("test error", ErrorType::GENERIC, Context::none(), frames());
        assert_eq!(
            e.render(),
            "Error reason : Generic\n\
             Error message: test error\n\
             Stack:\n\
             \tapp::load_user\n\t\t at src/app.rs:12\n\
             \tapp::main\n\t\t at src/main.rs:4\n"
        );
        assert_eq!(e.to_string(), e.render());
    }

    #[test]
    fn render_starts_with_reason_and_message() {
        let e = AnnotatedError::new("test error", ErrorType::GENERIC, Context::none());
        let text = e.render();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Error reason : Generic"));
        assert_eq!(lines.next(), Some("Error message: test error"));
        assert_eq!(lines.next(), Some("Stack:"));
    }

    #[test]
    fn render_empty_trace() {
        let e = AnnotatedError::with_trace("gone", ErrorType::EXPIRED, Context::none(), Vec::new());
        assert_eq!(e.render(), "Error reason : Expired\nError message: gone\nStack:\n");
    }

    #[test]
    fn capture_with_injected_source() {
        let source = FixedFrames(frames());
        let e = AnnotatedError::capture_with("x", ErrorType::CANCELLED, Context::none(), &source);
        assert_eq!(e.trace(), frames().as_slice());
    }

    #[test]
    fn render_with_scoped_registry() {
        let reg = TypeRegistry::new();
        let t = reg.register("Scoped");
        let e = AnnotatedError::with_trace("boom", t, Context::none(), Vec::new());
        assert!(e.render_with(&reg).starts_with("Error reason : Scoped\n"));
    }

    #[test]
    fn try_render_reports_unknown_type() {
        let reg = TypeRegistry::new();
        let e = AnnotatedError::with_trace("boom", ErrorType::GENERIC, Context::none(), Vec::new());
        assert_eq!(
            e.try_render_with(&reg),
            Err(RegistryError::UnknownType { id: 0, registered: 0 })
        );
        assert!(e.try_render().is_ok());
    }

    #[test]
    #[should_panic(expected = "never registered")]
    fn render_unknown_type_panics() {
        let bogus = ErrorType::from_raw(u32::MAX);
        let e = AnnotatedError::with_trace("boom", bogus, Context::none(), Vec::new());
        let _ = e.render();
    }

    #[test]
    fn debug_is_compact() {
        let e = AnnotatedError::with_trace("boom", ErrorType::GENERIC, Context::new(3u8), frames());
        let s = format!("{:?}", e);
        assert!(s.contains("Generic(0)"), "got: {}", s);
        assert!(s.contains("Context(3)"), "got: {}", s);
        assert!(s.contains("frames: 2"), "got: {}", s);
    }

    #[test]
    fn clones_share_state() {
        let e = AnnotatedError::with_trace("boom", ErrorType::GENERIC, Context::none(), frames());
        let c = e.clone();
        assert!(std::ptr::eq(e.trace(), c.trace()));
    }

    #[test]
    fn send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnnotatedError>();
    }

    #[test]
    fn shared_across_threads() {
        let e = AnnotatedError::with_trace("boom", ErrorType::GENERIC, Context::new(1), frames());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let e = e.clone();
                std::thread::spawn(move || e.render())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), e.render());
        }
    }
}
