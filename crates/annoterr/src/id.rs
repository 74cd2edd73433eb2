use std::sync::Arc;

use crate::registry::{self, RegistryError};

/// Classification key for an [`AnnotatedError`](crate::AnnotatedError).
///
/// An `ErrorType` is a small integer handed out by a
/// [`TypeRegistry`](crate::TypeRegistry). Ids are assigned sequentially from
/// zero in first-registration order and never change or get reused, so two
/// `ErrorType`s are equal exactly when they were registered under the same
/// name in the same registry.
///
/// The nine built-in categories are available as associated constants and
/// are registered in the process-wide registry before any lookup can happen.
///
/// | Constant                 | Id | Name                   |
/// |--------------------------|----|------------------------|
/// | `GENERIC`                | 0  | `Generic`              |
/// | `NOT_FOUND`              | 1  | `NotFound`             |
/// | `PERMISSION_DENIED`      | 2  | `PermissionDenied`     |
/// | `AUTHENTICATION_FAILED`  | 3  | `AuthenticationFailed` |
/// | `DATA_CORRUPTION`        | 4  | `DataCorruption`       |
/// | `CANCELLED`              | 5  | `Cancelled`            |
/// | `EXPIRED`                | 6  | `Expired`              |
/// | `SERVICE_UNAVAILABLE`    | 7  | `ServiceUnavailable`   |
/// | `FILE_SYSTEM`            | 8  | `FileSystem`           |
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ErrorType(u32);

impl ErrorType {
    pub const GENERIC: ErrorType = ErrorType(0);
    pub const NOT_FOUND: ErrorType = ErrorType(1);
    pub const PERMISSION_DENIED: ErrorType = ErrorType(2);
    pub const AUTHENTICATION_FAILED: ErrorType = ErrorType(3);
    pub const DATA_CORRUPTION: ErrorType = ErrorType(4);
    pub const CANCELLED: ErrorType = ErrorType(5);
    pub const EXPIRED: ErrorType = ErrorType(6);
    pub const SERVICE_UNAVAILABLE: ErrorType = ErrorType(7);
    pub const FILE_SYSTEM: ErrorType = ErrorType(8);

    /// Built-in names, indexed by id.
    pub(crate) const BUILTINS: [(ErrorType, &'static str); 9] = [
        (Self::GENERIC, "Generic"),
        (Self::NOT_FOUND, "NotFound"),
        (Self::PERMISSION_DENIED, "PermissionDenied"),
        (Self::AUTHENTICATION_FAILED, "AuthenticationFailed"),
        (Self::DATA_CORRUPTION, "DataCorruption"),
        (Self::CANCELLED, "Cancelled"),
        (Self::EXPIRED, "Expired"),
        (Self::SERVICE_UNAVAILABLE, "ServiceUnavailable"),
        (Self::FILE_SYSTEM, "FileSystem"),
    ];

    /// Only registries mint ids.
    #[inline]
    pub(crate) const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// The numeric id. Also the index of the name in its registry.
    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    /// Name of this type in the process-wide registry.
    ///
    /// # Panics
    ///
    /// If the id was never issued by the process-wide registry.
    pub fn name(self) -> Arc<str> {
        registry::global().name_of(self)
    }

    /// Non-panicking [`name`](Self::name).
    pub fn try_name(self) -> Result<Arc<str>, RegistryError> {
        registry::global().try_name_of(self)
    }
}

impl core::fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.try_name() {
            Ok(name) => write!(f, "{}({})", name, self.0),
            Err(_) => write!(f, "<unregistered>({})", self.0),
        }
    }
}

/// Writes the registered name.
///
/// Fails fast like [`ErrorType::name`]: formatting an id the process-wide
/// registry never issued panics instead of printing a made-up label.
impl core::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.name())
    }
}
