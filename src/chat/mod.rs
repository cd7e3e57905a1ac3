//! Chat room core
//!
//! Broadcast formatting and delivery, the in-memory history, the transcript
//! sink and the lock that ties them to the client registry.

pub mod broadcast;
pub mod history;
pub mod room;
pub mod transcript;

pub use broadcast::DeliveryReport;
pub use history::ChatHistory;
pub use room::ChatRoom;
pub use transcript::{ChatLog, FileChatLog};
