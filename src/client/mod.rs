//! Client management system
//!
//! Handles the client directory, per-connection sessions and shared writers.

pub mod registry;
pub mod session;
pub mod state;

pub use registry::{ClientRegistry, NameReservation};
pub use session::{ConnectionSession, SessionState, handle_client};
pub use state::{BoxedWriter, Client, SharedWriter, send, shared_writer};
