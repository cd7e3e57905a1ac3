//! Error handlers
//!
//! Provides error reporting for failures that end a worker.

use crate::error::types::ChatServerError;
use log::{error, info};

/// Handle a chat server error
///
/// Peer disconnects are routine and only logged at info level.
pub fn handle_error(context: &str, err: &ChatServerError) {
    if err.is_disconnect() {
        info!("{}: {}", context, err);
    } else {
        error!("{}: {}", context, err);
    }
}
