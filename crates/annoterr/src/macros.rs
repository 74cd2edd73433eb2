/// Construct an `AnnotatedError` at the call site.
///
/// # Forms
///
/// ```ignore
/// // No context:
/// annotate!("No network connection", network_fail)
///
/// // With a context payload (any Debug + Send + Sync + 'static value):
/// annotate!(io_err, ErrorType::DATA_CORRUPTION, "/disk/a/report")
/// ```
#[macro_export]
macro_rules! annotate {
    ($cause:expr, $error_type:expr $(,)?) => {
        $crate::AnnotatedError::new($cause, $error_type, $crate::Context::none())
    };

    ($cause:expr, $error_type:expr, $context:expr $(,)?) => {
        $crate::AnnotatedError::new($cause, $error_type, $crate::Context::new($context))
    };
}

/// Branch on an `AnnotatedError`'s type.
///
/// ```ignore
/// match_type!(err, {
///     ErrorType::NOT_FOUND => { /* create it */ },
///     network_fail         => { /* retry later */ },
///     _                    => { /* fallback */ },
/// })
/// ```
///
/// Arms are compared with `==` in order. Without a `_` arm, an unmatched
/// type hits `unreachable!`.
#[macro_export]
macro_rules! match_type {
    ($error:expr, { $($arms:tt)* }) => {{
        let __t = ($error).error_type();
        $crate::__match_type_arms!(__t; $($arms)*)
    }};
}

/// Internal helper for match_type!.
#[doc(hidden)]
#[macro_export]
macro_rules! __match_type_arms {
    // No arms left
    ($t:ident; ) => {
        unreachable!("unhandled error type: {:?}", $t)
    };

    // Wildcard
    ($t:ident; _ => $handler:expr $(, $($rest:tt)*)?) => {
        $handler
    };

    // Exact type
    ($t:ident; $ty:path => $handler:expr $(, $($rest:tt)*)?) => {
        if $t == $ty {
            $handler
        } else {
            $crate::__match_type_arms!($t; $($($rest)*)?)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{AnnotatedError, ErrorType};

    #[test]
    fn annotate_without_context() {
        let e = annotate!("test error", ErrorType::NOT_FOUND);
        assert!(e.is(ErrorType::NOT_FOUND));
        assert!(e.context().is_none());
    }

    #[test]
    fn annotate_with_context() {
        let e = annotate!("test error", ErrorType::GENERIC, 10);
        assert_eq!(e.context().downcast_ref::<i32>(), Some(&10));
    }

    fn classify(e: &AnnotatedError, custom: ErrorType) -> &'static str {
        match_type!(e, {
            ErrorType::NOT_FOUND => "not found",
            ErrorType::EXPIRED => "expired",
            custom => "custom",
            _ => "other",
        })
    }

    #[test]
    fn match_type_arms() {
        let custom = crate::register("macros::tests::Custom");
        assert_eq!(classify(&annotate!("x", ErrorType::NOT_FOUND), custom), "not found");
        assert_eq!(classify(&annotate!("x", ErrorType::EXPIRED), custom), "expired");
        assert_eq!(classify(&annotate!("x", custom), custom), "custom");
        assert_eq!(classify(&annotate!("x", ErrorType::CANCELLED), custom), "other");
    }

    #[test]
    fn match_type_blocks() {
        let e = annotate!("x", ErrorType::GENERIC);
        let mut hits = 0;
        match_type!(e, {
            ErrorType::GENERIC => { hits += 1; },
            _ => {},
        });
        assert_eq!(hits, 1);
    }

    #[test]
    #[should_panic(expected = "unhandled error type")]
    fn match_type_without_wildcard_is_unreachable() {
        let e = annotate!("x", ErrorType::FILE_SYSTEM);
        match_type!(e, {
            ErrorType::NOT_FOUND => (),
        })
    }
}
