//! Shared chat room state
//!
//! The registry, the history and the transcript live behind one lock. Every
//! public operation is a single critical section, which gives all joins,
//! renames, leaves and broadcasts a total order: a broadcast's recipient
//! snapshot and its history append can never straddle a join or a leave.

use crate::chat::broadcast::{DeliveryReport, deliver, format_line, timestamp};
use crate::chat::history::ChatHistory;
use crate::chat::transcript::ChatLog;
use crate::client::registry::ClientRegistry;
use crate::client::{SharedWriter, send};
use crate::error::RegistryError;
use crate::protocol::responses::{join_notice, leave_notice, rename_notice};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

struct RoomState {
    registry: ClientRegistry,
    history: ChatHistory,
    log: Box<dyn ChatLog>,
}

impl RoomState {
    /// Formats, delivers, records. Caller holds the room lock.
    async fn broadcast(&mut self, sender: Option<&str>, message: &str) -> DeliveryReport {
        let line = format_line(&timestamp(), sender, message);
        let recipients = self.registry.snapshot();
        let report = deliver(&recipients, sender, &line).await;

        if let Err(e) = self.log.append(&line) {
            warn!("Failed to write transcript: {}", e);
        }
        self.history.push(line);

        report
    }
}

/// Handle to the process-wide room; clones share the same state.
#[derive(Clone)]
pub struct ChatRoom {
    state: Arc<Mutex<RoomState>>,
}

impl ChatRoom {
    pub fn new(max_clients: usize, log: Box<dyn ChatLog>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RoomState {
                registry: ClientRegistry::new(max_clients),
                history: ChatHistory::new(),
                log,
            })),
        }
    }

    /// Admission check made when a connection arrives.
    pub async fn is_full(&self) -> bool {
        self.state.lock().await.registry.is_full()
    }

    /// Registers `name`, replays the history to the newcomer and announces it.
    ///
    /// All three happen under one acquisition, so every line broadcast before
    /// the join arrives through the replay and every later line arrives live.
    pub async fn join(&self, name: &str, writer: SharedWriter) -> Result<DeliveryReport, RegistryError> {
        let mut state = self.state.lock().await;
        state.registry.try_reserve(name)?.insert(writer.clone());

        let replay = state.history.replay();
        if !replay.is_empty() {
            if let Err(e) = send(&writer, &replay).await {
                warn!("Failed to replay history to {}: {}", name, e);
            }
        }

        info!(
            "{} joined ({}/{} clients)",
            name,
            state.registry.len(),
            state.registry.capacity()
        );
        Ok(state.broadcast(None, &join_notice(name)).await)
    }

    /// Re-keys a client and announces the change. Nothing is announced on failure.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> Result<DeliveryReport, RegistryError> {
        let mut state = self.state.lock().await;
        state.registry.rename(old_name, new_name)?;

        info!("{} renamed to {}", old_name, new_name);
        Ok(state.broadcast(None, &rename_notice(old_name, new_name)).await)
    }

    /// Removes a client and announces the departure.
    ///
    /// Returns `None` without announcing when the name was not registered.
    pub async fn leave(&self, name: &str) -> Option<DeliveryReport> {
        let mut state = self.state.lock().await;
        state.registry.remove(name)?;

        info!(
            "{} left ({}/{} clients)",
            name,
            state.registry.len(),
            state.registry.capacity()
        );
        Some(state.broadcast(None, &leave_notice(name)).await)
    }

    /// Sends a peer message (`Some(sender)`) or a system notice (`None`).
    pub async fn broadcast(&self, sender: Option<&str>, message: &str) -> DeliveryReport {
        self.state.lock().await.broadcast(sender, message).await
    }

    pub async fn history(&self) -> Vec<String> {
        self.state.lock().await.history.lines().to_vec()
    }

    pub async fn member_names(&self) -> Vec<String> {
        self.state.lock().await.registry.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::shared_writer;
    use std::io;
    use std::pin::Pin;
    use std::sync::Mutex as StdMutex;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncReadExt, AsyncWrite, DuplexStream, duplex};

    /// Transcript kept in memory so tests can inspect it.
    #[derive(Clone, Default)]
    struct MemoryLog(Arc<StdMutex<Vec<String>>>);

    impl ChatLog for MemoryLog {
        fn append(&mut self, line: &str) -> io::Result<()> {
            self.0.lock().unwrap().push(line.to_string());
            Ok(())
        }
    }

    /// Transport whose peer is gone.
    struct BrokenWriter;

    impl AsyncWrite for BrokenWriter {
        fn poll_write(self: Pin<&mut Self>, _: &mut Context<'_>, _: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone")))
        }

        fn poll_flush(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn room(capacity: usize) -> (ChatRoom, MemoryLog) {
        let log = MemoryLog::default();
        (ChatRoom::new(capacity, Box::new(log.clone())), log)
    }

    /// A client endpoint: the writer goes to the room, the stream is read by the test.
    fn endpoint() -> (SharedWriter, DuplexStream) {
        let (server, client) = duplex(64 * 1024);
        (shared_writer(server), client)
    }

    /// Reads whatever is buffered without blocking forever.
    async fn drain(stream: &mut DuplexStream) -> String {
        let mut out = Vec::new();
        let mut buf = [0u8; 4096];
        while let Ok(Ok(n)) =
            tokio::time::timeout(std::time::Duration::from_millis(20), stream.read(&mut buf)).await
        {
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_join_announces_to_everyone() {
        let (room, log) = room(10);
        let (alice_w, mut alice) = endpoint();
        let (bob_w, mut bob) = endpoint();

        room.join("alice", alice_w).await.unwrap();
        let report = room.join("bob", bob_w).await.unwrap();
        assert_eq!(report, DeliveryReport { delivered: 2, failed: 0 });

        assert!(drain(&mut alice).await.ends_with(": bob Has Joined The Chat\n"));
        let bob_text = drain(&mut bob).await;
        assert!(bob_text.contains(": alice Has Joined The Chat\n"));
        assert!(bob_text.ends_with(": bob Has Joined The Chat\n"));
        assert_eq!(log.0.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_join_rejected_without_notice() {
        let (room, log) = room(10);
        let (w1, _s1) = endpoint();
        let (w2, mut s2) = endpoint();

        room.join("alice", w1).await.unwrap();
        assert_eq!(
            room.join("alice", w2).await,
            Err(RegistryError::NameTaken("alice".into()))
        );
        assert_eq!(room.member_names().await, vec!["alice"]);
        assert_eq!(drain(&mut s2).await, "");
        assert_eq!(log.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_peer_message_skips_sender() {
        let (room, _log) = room(10);
        let (alice_w, mut alice) = endpoint();
        let (bob_w, mut bob) = endpoint();
        room.join("alice", alice_w).await.unwrap();
        room.join("bob", bob_w).await.unwrap();
        drain(&mut alice).await;
        drain(&mut bob).await;

        let report = room.broadcast(Some("alice"), "hi").await;
        assert_eq!(report, DeliveryReport { delivered: 1, failed: 0 });
        assert!(drain(&mut bob).await.ends_with("] [alice]: hi\n"));
        assert_eq!(drain(&mut alice).await, "");
    }

    #[tokio::test]
    async fn test_history_replayed_exactly_once() {
        let (room, _log) = room(10);
        let (alice_w, _alice) = endpoint();
        room.join("alice", alice_w).await.unwrap();
        room.broadcast(Some("alice"), "one").await;
        room.broadcast(Some("alice"), "two").await;

        let (bob_w, mut bob) = endpoint();
        room.join("bob", bob_w).await.unwrap();
        room.broadcast(Some("alice"), "three").await;

        let text = drain(&mut bob).await;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with(": alice Has Joined The Chat"));
        assert!(lines[1].ends_with(" [alice]: one"));
        assert!(lines[2].ends_with(" [alice]: two"));
        assert!(lines[3].ends_with(": bob Has Joined The Chat"));
        assert!(lines[4].ends_with(" [alice]: three"));

        let history = room.history().await;
        assert_eq!(history.concat(), text);
    }

    #[tokio::test]
    async fn test_broken_recipient_does_not_block_others() {
        let (room, log) = room(10);
        let (alice_w, _alice) = endpoint();
        let (bob_w, mut bob) = endpoint();
        let (carol_w, mut carol) = endpoint();
        room.join("alice", alice_w).await.unwrap();
        room.join("bob", bob_w).await.unwrap();
        room.join("carol", carol_w).await.unwrap();
        room.join("dave", shared_writer(BrokenWriter)).await.unwrap();
        drain(&mut bob).await;
        drain(&mut carol).await;
        let logged_before = log.0.lock().unwrap().len();

        let report = room.broadcast(Some("alice"), "still here").await;
        assert_eq!(report, DeliveryReport { delivered: 2, failed: 1 });
        assert!(drain(&mut bob).await.ends_with("[alice]: still here\n"));
        assert!(drain(&mut carol).await.ends_with("[alice]: still here\n"));

        let logged = log.0.lock().unwrap();
        assert_eq!(logged.len(), logged_before + 1);
        assert!(logged[logged.len() - 1].ends_with("[alice]: still here\n"));
        drop(logged);
        assert_eq!(room.history().await.len(), logged_before + 1);
    }

    #[tokio::test]
    async fn test_rename_announces_once() {
        let (room, _log) = room(10);
        let (alice_w, mut alice) = endpoint();
        let (bob_w, mut bob) = endpoint();
        room.join("alice", alice_w).await.unwrap();
        room.join("bob", bob_w).await.unwrap();
        drain(&mut alice).await;
        drain(&mut bob).await;

        assert_eq!(
            room.rename("alice", "bob").await,
            Err(RegistryError::NameTaken("bob".into()))
        );
        assert_eq!(drain(&mut alice).await, "");

        room.rename("alice", "carol").await.unwrap();
        assert_eq!(room.member_names().await, vec!["bob", "carol"]);
        let expected = ": alice changed their name to carol\n";
        assert!(drain(&mut alice).await.ends_with(expected));
        assert!(drain(&mut bob).await.ends_with(expected));
    }

    #[tokio::test]
    async fn test_leave_is_idempotent() {
        let (room, log) = room(10);
        let (alice_w, _alice) = endpoint();
        let (bob_w, mut bob) = endpoint();
        room.join("alice", alice_w).await.unwrap();
        room.join("bob", bob_w).await.unwrap();
        drain(&mut bob).await;

        assert!(room.leave("alice").await.is_some());
        assert!(room.leave("alice").await.is_none());
        assert!(drain(&mut bob).await.ends_with(": alice Has Left The Chat\n"));
        assert_eq!(log.0.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_capacity_under_concurrent_joins() {
        let (room, _log) = room(10);
        let mut tasks = Vec::new();
        for i in 0..25 {
            let room = room.clone();
            tasks.push(tokio::spawn(async move {
                let (writer, stream) = endpoint();
                let joined = room.join(&format!("user{}", i), writer).await.is_ok();
                (joined, stream)
            }));
        }

        let mut joined = 0;
        let mut streams = Vec::new();
        for task in tasks {
            let (ok, stream) = task.await.unwrap();
            if ok {
                joined += 1;
            }
            streams.push(stream);
        }
        assert_eq!(joined, 10);
        assert_eq!(room.member_names().await.len(), 10);
        assert!(room.is_full().await);
    }

    #[tokio::test]
    async fn test_same_name_races_once() {
        let (room, _log) = room(10);
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let room = room.clone();
            tasks.push(tokio::spawn(async move {
                let (writer, stream) = endpoint();
                (room.join("alice", writer).await.is_ok(), stream)
            }));
        }

        let mut winners = 0;
        let mut streams = Vec::new();
        for task in tasks {
            let (ok, stream) = task.await.unwrap();
            winners += usize::from(ok);
            streams.push(stream);
        }
        assert_eq!(winners, 1);
        assert_eq!(room.member_names().await, vec!["alice"]);
    }
}
