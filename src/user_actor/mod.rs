//! User store wiring: entity binding, create payload and errors.

mod dtos;
pub mod entity;
pub mod error;

pub use dtos::*;
pub use error::*;
