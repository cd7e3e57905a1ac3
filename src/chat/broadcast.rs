//! Broadcast formatting and delivery
//!
//! Delivery is sequential and best-effort: a failed write to one recipient is
//! logged and the remaining recipients are still served.

use crate::client::{SharedWriter, send};
use chrono::Local;
use log::warn;

/// Outcome of delivering one line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Current local time as `[YYYY-MM-DD HH:MM:SS]`.
pub fn timestamp() -> String {
    Local::now().format("[%Y-%m-%d %H:%M:%S]").to_string()
}

/// Formats a broadcast line.
///
/// A peer message carries its sender; a system notice (`sender == None`)
/// carries only the timestamp.
pub fn format_line(timestamp: &str, sender: Option<&str>, message: &str) -> String {
    match sender {
        Some(sender) => format!("{} [{}]: {}\n", timestamp, sender, message),
        None => format!("{}: {}\n", timestamp, message),
    }
}

/// Writes `line` to every recipient except the sender.
pub async fn deliver(
    recipients: &[(String, SharedWriter)],
    sender: Option<&str>,
    line: &str,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();

    for (name, writer) in recipients {
        if sender == Some(name.as_str()) {
            continue;
        }
        match send(writer, line).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                warn!("Error broadcasting message to client {}: {}", name, e);
                report.failed += 1;
            }
        }
    }

    report
}
