//! tgdash - Core Library
//!
//! The dashboard controller shared by the browser and terminal front ends.
//! All UI state lives in one owned [`UiState`] that only the [`Controller`]
//! mutates. Front ends feed [`Input`]s in and carry out the [`Effect`]s that
//! come back (HTTP calls, channel messages, timers, prompts); the controller
//! itself performs no I/O.

pub mod activity;
pub mod config;
pub mod controller;
pub mod error;
pub mod handshake;
pub mod request;
pub mod state;

pub use activity::*;
pub use config::*;
pub use controller::*;
pub use error::*;
pub use handshake::*;
pub use request::*;
pub use state::*;

pub use tgdash_types as types;
