//! Sprite cache.
//!
//! The only state the renderer reads besides its explicit inputs. Entries
//! are requested once, resolved by the host loader, and never required for
//! a complete frame: a sprite that is not `Ready` is drawn as primitives.
//! The cache lives for one session and is dropped on leave.

use std::collections::{BTreeSet, HashMap};

use frost_shared::render::SpriteKey;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    /// Requested, load in flight.
    Pending,
    Ready,
    /// Load failed; stays on the primitive fallback for the session.
    Failed,
}

#[derive(Debug, Default)]
pub struct AssetCache {
    entries: HashMap<SpriteKey, AssetState>,
    /// Requested keys not yet handed to the loader.
    outbox: BTreeSet<SpriteKey>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: SpriteKey) -> Option<AssetState> {
        self.entries.get(&key).copied()
    }

    pub fn is_ready(&self, key: SpriteKey) -> bool {
        self.state(key) == Some(AssetState::Ready)
    }

    /// Queues a load the first time `key` is seen. Returns whether it was new.
    pub fn request(&mut self, key: SpriteKey) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, AssetState::Pending);
        self.outbox.insert(key);
        true
    }

    /// Keys the host should start loading, in stable order.
    pub fn take_requests(&mut self) -> Vec<SpriteKey> {
        std::mem::take(&mut self.outbox).into_iter().collect()
    }

    /// Records a finished load. Keys this cache never requested are ignored,
    /// so a load that outlives its session cannot leak into the next one.
    pub fn mark_loaded(&mut self, key: SpriteKey) {
        if self.resolve(key, AssetState::Ready) {
            debug!(sprite = ?key, "Sprite ready");
        }
    }

    pub fn mark_failed(&mut self, key: SpriteKey) {
        if self.resolve(key, AssetState::Failed) {
            warn!(sprite = ?key, path = %key.path(), "Sprite failed to load; keeping fallback");
        }
    }

    fn resolve(&mut self, key: SpriteKey, state: AssetState) -> bool {
        match self.entries.get_mut(&key) {
            Some(entry @ AssetState::Pending) => {
                *entry = state;
                true
            }
            _ => {
                debug!(sprite = ?key, "Ignoring result for a sprite this cache did not request");
                false
            }
        }
    }

    pub fn ready_count(&self) -> usize {
        self.entries
            .values()
            .filter(|s| **s == AssetState::Ready)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
