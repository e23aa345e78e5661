//! Utility macros shared across the crate.

/// Early-returns with the given error when the predicate does not hold.
///
/// Like `assert!`, but produces an `Err` instead of panicking:
///
/// ```ignore
/// ensure!(colon >= 1, MultipartError::invalid_header_line(line));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
