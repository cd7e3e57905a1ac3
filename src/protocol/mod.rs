//! Chat wire protocol
//!
//! Handles input framing and the fixed strings shown to clients.

pub mod input;
pub mod responses;

pub use input::{Input, read_input, reader_capacity};
