pub mod user;
pub mod drill;
pub mod session;

pub use user::*;
pub use drill::*;
pub use session::*;

/// Unix timestamp as reported by the server. Milliseconds in practice, but
/// some sources send seconds; see [`crate::timing::normalize_timestamp`].
pub type Timestamp = i64;
