//! Build metadata reported by the logger and the health check.

pub const NAME: &str = "blulibrary";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The VCS revision, if the build environment provided one.
pub const REVISION: Option<&str> = option_env!("BACKEND_REVISION");

pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");
