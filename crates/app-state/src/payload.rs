//! Transient payload handoff between screens
//!
//! A screen that navigates to a destination needing a rich object (one that
//! does not fit in a route parameter) puts the object here right before
//! navigating. The destination takes it exactly once.
//!
//! Each payload type owns a single slot, identified by [`Payload::KEY`]. A
//! second `put` before the destination reads the slot replaces the first
//! value, and `take` empties the slot.

use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A value that can be handed to another screen through the [`PayloadStore`]
pub trait Payload: Any + Send + 'static {
    /// Slot name for this payload kind
    const KEY: &'static str;
}

/// Shared single-slot-per-kind exchange
///
/// Cloning the store yields another handle to the same slots.
#[derive(Clone, Default)]
pub struct PayloadStore {
    slots: Arc<Mutex<HashMap<&'static str, Box<dyn Any + Send>>>>,
}

impl PayloadStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload, replacing any unread value of the same kind
    ///
    /// Returns `true` if an unread value was overwritten.
    pub fn put<P: Payload>(&self, value: P) -> bool {
        let replaced = self.slots.lock().insert(P::KEY, Box::new(value)).is_some();
        if replaced {
            tracing::trace!(key = P::KEY, "payload overwritten before it was read");
        } else {
            tracing::trace!(key = P::KEY, "payload stored");
        }
        replaced
    }

    /// Remove and return the pending payload of this kind
    pub fn take<P: Payload>(&self) -> Option<P> {
        let boxed = self.slots.lock().remove(P::KEY)?;
        match boxed.downcast::<P>() {
            Ok(value) => {
                tracing::trace!(key = P::KEY, "payload taken");
                Some(*value)
            }
            Err(_) => {
                // Two payload types sharing a key; the stored value is unusable.
                tracing::warn!(key = P::KEY, "payload slot held a value of another type");
                None
            }
        }
    }

    /// Check whether a value is waiting in the slot named `key`
    pub fn is_pending(&self, key: &str) -> bool {
        self.slots.lock().contains_key(key)
    }

    /// Drop the value waiting in the slot named `key`, unread
    ///
    /// Returns `true` if a value was dropped.
    pub fn discard(&self, key: &str) -> bool {
        let dropped = self.slots.lock().remove(key).is_some();
        if dropped {
            tracing::trace!(key, "payload discarded");
        }
        dropped
    }

    /// Drop every pending payload
    pub fn clear(&self) {
        self.slots.lock().clear();
    }

    /// Number of slots currently holding a value
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Check if no payload is pending
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Typed handle to one payload kind
    pub fn slot<P: Payload>(&self) -> PayloadSlot<P> {
        PayloadSlot {
            store: self.clone(),
            _kind: PhantomData,
        }
    }
}

impl fmt::Debug for PayloadStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.lock();
        f.debug_struct("PayloadStore")
            .field("pending", &slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Typed single-slot channel for one payload kind
pub struct PayloadSlot<P: Payload> {
    store: PayloadStore,
    _kind: PhantomData<fn() -> P>,
}

impl<P: Payload> PayloadSlot<P> {
    /// Store a value, replacing an unread one
    pub fn put(&self, value: P) -> bool {
        self.store.put(value)
    }

    /// Remove and return the pending value
    pub fn take(&self) -> Option<P> {
        self.store.take::<P>()
    }

    /// Check whether a value is waiting
    pub fn is_pending(&self) -> bool {
        self.store.is_pending(P::KEY)
    }
}

impl<P: Payload> Clone for PayloadSlot<P> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _kind: PhantomData,
        }
    }
}

impl<P: Payload> fmt::Debug for PayloadSlot<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadSlot")
            .field("key", &P::KEY)
            .field("pending", &self.is_pending())
            .finish()
    }
}
