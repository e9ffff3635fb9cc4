//! Drill store wiring, including the start/stop actions.

mod actions;
mod dtos;
pub mod entity;
pub mod error;

pub use actions::*;
pub use dtos::*;
pub use error::*;
