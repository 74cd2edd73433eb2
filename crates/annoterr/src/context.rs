use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Values that can ride along as an error's [`Context`].
///
/// Blanket-implemented for every `'static + Debug + Send + Sync` type.
pub trait ContextValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T> ContextValue for T
where
    T: Any + fmt::Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Caller-supplied payload attached to an `AnnotatedError`.
///
/// Any shape is accepted and handed back untouched; this crate never looks
/// inside. Cloning shares the payload.
///
/// ```
/// use annoterr::Context;
///
/// let ctx = Context::new("/disk/a/report");
/// assert_eq!(ctx.downcast_ref::<&str>(), Some(&"/disk/a/report"));
/// assert!(Context::none().is_none());
/// ```
#[derive(Clone, Default)]
pub struct Context(Option<Arc<dyn ContextValue>>);

impl Context {
    pub fn new<T: ContextValue>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    /// No payload.
    pub const fn none() -> Self {
        Self(None)
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    /// The payload as `T`, if there is one and it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|v| v.as_any().downcast_ref::<T>())
    }

    /// True if the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_deref() {
            Some(value) => f.debug_tuple("Context").field(&value).finish(),
            None => f.write_str("Context(None)"),
        }
    }
}
