//! Shared primitive types.
mod account;
pub use account::*;

mod challenge;
pub use challenge::*;

mod credential;
pub use credential::*;

mod payload;
pub use payload::*;

mod point;
pub use point::*;

mod signature;
pub use signature::*;

mod webauthn;
pub use webauthn::*;
