//! Server core functionality
//!
//! Contains the listener and the accept loop.

pub mod core;

pub use core::Server;
