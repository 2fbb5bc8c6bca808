//! Logging facade for the calculation pipeline.
//!
//! With the `tracing` feature, `debug!` and `warn!` are the `tracing` macros.
//! Without it they swallow their arguments, so call sites never need a
//! `cfg` of their own.

#[cfg(feature = "tracing")]
pub use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, warn};
