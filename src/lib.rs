pub mod chat;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod utils;

pub use chat::ChatRoom;
pub use config::ChatConfig;
pub use server::Server;
