//! Passkey account version.

/// The short version information.
pub const PASSKEY_SHORT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// The long version information.
pub const PASSKEY_LONG_VERSION: &str = concat!(
    "Version: ",
    env!("CARGO_PKG_VERSION"),
    "\n",
    "Package: ",
    env!("CARGO_PKG_NAME"),
    "\n",
    "Minimum Rust: ",
    env!("CARGO_PKG_RUST_VERSION")
);
