//! Admin console for timed drill sessions.
//!
//! Each remote collection (users, drills, session history) is mirrored by its
//! own store actor and reached through a typed client. Drill cards and
//! reports are pure views computed from those collections.

pub mod actor_framework;
pub mod api;
pub mod app_system;
pub mod clients;
pub mod clock;
pub mod config;
pub mod domain;
pub mod drill_actor;
pub mod drill_card;
pub mod error;
pub mod report;
pub mod session_actor;
pub mod start_cache;
pub mod timer;
pub mod timing;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;
