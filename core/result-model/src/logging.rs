//! FILENAME: core/result-model/src/logging.rs
// PURPOSE: Category-tagged logging macros shared by every crate in the workspace.
// The category becomes the `log` target, so hosts can filter per stage
// (e.g. `RUST_LOG=PIVOT=debug`). The core never installs a logger itself.

#[doc(hidden)]
pub use log as __log;

#[macro_export]
macro_rules! log_debug {
    ($category:expr, $($arg:tt)*) => {
        $crate::logging::__log::debug!(target: $category, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::logging::__log::info!(target: $category, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($category:expr, $($arg:tt)*) => {
        $crate::logging::__log::warn!(target: $category, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::logging::__log::error!(target: $category, $($arg)*)
    };
}
