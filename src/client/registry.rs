//! Client registry
//!
//! Directory of connected clients keyed by display name. The registry itself
//! is plain data; callers hold it behind the room lock, and every compound
//! check-then-act step is a single method here so it cannot be split across
//! two lock acquisitions.

use crate::client::{Client, SharedWriter};
use crate::error::RegistryError;
use std::collections::BTreeMap;

/// Registry for tracking named clients
pub struct ClientRegistry {
    clients: BTreeMap<String, Client>,
    capacity: usize,
}

/// A name proven free (and a slot proven available) under the current borrow.
///
/// Consuming it with [`NameReservation::insert`] is the only way to add a
/// client, so an insert is always preceded by the uniqueness check.
pub struct NameReservation<'a> {
    registry: &'a mut ClientRegistry,
    name: String,
}

impl NameReservation<'_> {
    /// Stores a client under the reserved name.
    pub fn insert(self, writer: SharedWriter) {
        let client = Client::new(self.name.clone(), writer);
        self.registry.clients.insert(self.name, client);
    }
}

impl ClientRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            clients: BTreeMap::new(),
            capacity,
        }
    }

    /// Checks that `name` is absent and a slot is free, and holds both facts
    /// for the lifetime of the returned reservation.
    pub fn try_reserve(&mut self, name: &str) -> Result<NameReservation<'_>, RegistryError> {
        if self.clients.contains_key(name) {
            return Err(RegistryError::NameTaken(name.to_string()));
        }
        if self.is_full() {
            return Err(RegistryError::RegistryFull(self.capacity));
        }
        Ok(NameReservation {
            registry: self,
            name: name.to_string(),
        })
    }

    /// Removes a client; a no-op when the name is not registered.
    pub fn remove(&mut self, name: &str) -> Option<Client> {
        self.clients.remove(name)
    }

    /// Re-keys a client, keeping its transport.
    ///
    /// Fails without touching the registry when `new_name` is taken
    /// (including when it equals `old_name`).
    pub fn rename(&mut self, old_name: &str, new_name: &str) -> Result<(), RegistryError> {
        if !self.clients.contains_key(old_name) {
            return Err(RegistryError::ClientNotFound(old_name.to_string()));
        }
        if self.clients.contains_key(new_name) {
            return Err(RegistryError::NameTaken(new_name.to_string()));
        }

        let mut client = self
            .clients
            .remove(old_name)
            .ok_or_else(|| RegistryError::ClientNotFound(old_name.to_string()))?;
        client.set_name(new_name.to_string());
        self.clients.insert(new_name.to_string(), client);
        Ok(())
    }

    /// Current members in name order, for delivering a broadcast.
    pub fn snapshot(&self) -> Vec<(String, SharedWriter)> {
        self.clients
            .values()
            .map(|client| (client.name().to_string(), client.writer().clone()))
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.clients.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.clients.len() >= self.capacity
    }
}
