pub mod cursor;
pub mod read;

/// Returns early with a [`J3dError::FormatInvariant`](crate::format::error::J3dError)
/// raised at the cursor's current position when `$cond` does not hold.
#[macro_export]
macro_rules! ensure_format {
    ($cur:expr, $cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($cur.invariant(format!($($arg)+)));
        }
    };
}
