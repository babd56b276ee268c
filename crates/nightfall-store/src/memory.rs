//! In-process room store used by tests and demos.
//!
//! `MemoryStore` is a faithful reference implementation of the
//! [`RoomStore`] contract: document-level last-writer-wins merges,
//! version-stamped compare-and-swap updates, and a per-room change feed
//! delivered over unbounded channels. Cloning the store clones a handle to
//! the same shared state, so several simulated clients can share one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use nightfall_protocol::{RoomCode, RoomRecord};
use tokio::sync::mpsc;

use crate::{RoomEvent, RoomPatch, RoomStore, StoreError, Subscription};

/// A subscriber's outbound channel plus the id used to release it.
struct Watcher {
    id: u64,
    sender: mpsc::UnboundedSender<RoomEvent>,
}

/// One stored room: the committed record, its version, and its watchers.
struct Entry {
    record: RoomRecord,
    version: u64,
    watchers: Vec<Watcher>,
}

#[derive(Default)]
struct Inner {
    rooms: HashMap<RoomCode, Entry>,
    next_watcher_id: u64,
}

/// In-memory [`RoomStore`] implementation.
///
/// A plain `Mutex` is enough here: no lock is ever held across an await
/// point, and notification fan-out is just pushing onto unbounded channels.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms currently stored. Test helper.
    pub fn room_count(&self) -> usize {
        self.lock().rooms.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a panic mid-mutation in another test
        // thread; the map itself is still structurally sound.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Entry {
    /// Sends an event to every live watcher, pruning the dead ones.
    fn notify(&mut self, event: &RoomEvent) {
        self.watchers
            .retain(|w| w.sender.send(event.clone()).is_ok());
    }
}

impl RoomStore for MemoryStore {
    async fn create_room(
        &self,
        record: RoomRecord,
    ) -> Result<(RoomRecord, u64), StoreError> {
        let mut inner = self.lock();
        let code = record.room_code.clone();
        if inner.rooms.contains_key(&code) {
            return Err(StoreError::DuplicateRoomCode(code));
        }

        let version = 1;
        inner.rooms.insert(
            code.clone(),
            Entry {
                record: record.clone(),
                version,
                watchers: Vec::new(),
            },
        );
        tracing::info!(room_code = %code, "room created");
        Ok((record, version))
    }

    async fn get_room(
        &self,
        code: &RoomCode,
    ) -> Result<(RoomRecord, u64), StoreError> {
        let inner = self.lock();
        let entry = inner
            .rooms
            .get(code)
            .ok_or_else(|| StoreError::NotFound(code.clone()))?;
        Ok((entry.record.clone(), entry.version))
    }

    async fn update_room(
        &self,
        code: &RoomCode,
        patch: RoomPatch,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let mut inner = self.lock();
        let entry = inner
            .rooms
            .get_mut(code)
            .ok_or_else(|| StoreError::NotFound(code.clone()))?;

        if entry.version != expected_version {
            return Err(StoreError::Conflict {
                code: code.clone(),
                expected: expected_version,
                found: entry.version,
            });
        }

        patch.apply(&mut entry.record);
        entry.version += 1;
        let event = RoomEvent::Changed {
            record: entry.record.clone(),
            version: entry.version,
        };
        entry.notify(&event);
        tracing::debug!(
            room_code = %code,
            version = entry.version,
            watchers = entry.watchers.len(),
            "room updated"
        );
        Ok(entry.version)
    }

    async fn delete_room(&self, code: &RoomCode) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let mut entry = inner
            .rooms
            .remove(code)
            .ok_or_else(|| StoreError::NotFound(code.clone()))?;

        entry.notify(&RoomEvent::Deleted);
        tracing::info!(room_code = %code, "room deleted");
        Ok(())
    }

    async fn subscribe(
        &self,
        code: &RoomCode,
    ) -> Result<Subscription, StoreError> {
        let mut inner = self.lock();
        let watcher_id = inner.next_watcher_id;
        inner.next_watcher_id += 1;

        let entry = inner
            .rooms
            .get_mut(code)
            .ok_or_else(|| StoreError::NotFound(code.clone()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        entry.watchers.push(Watcher {
            id: watcher_id,
            sender: tx,
        });

        let shared = Arc::clone(&self.inner);
        let release_code = code.clone();
        let release = Box::new(move || {
            let mut inner =
                shared.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = inner.rooms.get_mut(&release_code) {
                entry.watchers.retain(|w| w.id != watcher_id);
            }
        });

        tracing::debug!(room_code = %code, watcher_id, "subscribed");
        Ok(Subscription::new(code.clone(), rx, release))
    }
}

// =========================================================================
// Tests
// =========================================================================
