//! Typed facades over the resource stores.
//!
//! Mutations go to the remote service first; only a successful response is
//! patched into the store. A failed mutation leaves the store untouched.

#[macro_use]
mod macros;

mod drill_client;
mod session_client;
mod user_client;

pub use drill_client::*;
pub use session_client::*;
pub use user_client::*;
