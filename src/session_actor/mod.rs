//! Session history store wiring. Read-only: sessions change only on refresh.

pub mod entity;
pub mod error;

pub use error::*;
