// Copyright (c) 2024 Mike Tsao

//! Unique identifiers for events, and factories that help ensure they are in
//! fact unique.

use core::sync::atomic::Ordering;
use core::{hash::Hash, marker::PhantomData, sync::atomic::AtomicUsize};
use delegate::delegate;
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// An optional Uid trait.
pub trait IsUid: Eq + Hash + Clone + From<usize> {
    /// Returns the raw uid.
    fn as_usize(&self) -> usize;
}

/// Generates unique uids.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UidFactory<U: IsUid> {
    pub(crate) next_uid_value: AtomicUsize,
    #[serde(skip)]
    pub(crate) _phantom: PhantomData<U>,
}
impl<U: IsUid> UidFactory<U> {
    /// Creates a new [UidFactory] starting with the given value.
    pub fn new(first_uid: usize) -> Self {
        Self {
            next_uid_value: AtomicUsize::new(first_uid),
            _phantom: Default::default(),
        }
    }

    /// Generates the next unique uid.
    pub fn mint_next(&self) -> U {
        let uid_value = self.next_uid_value.fetch_add(1, Ordering::Relaxed);
        U::from(uid_value)
    }

    /// Notifies the factory that a uid exists that might have been created
    /// elsewhere (for example, in a seed that was just loaded). This gives the
    /// factory an opportunity to adjust `next_uid_value` to stay consistent
    /// with all known uids.
    pub fn notify_externally_minted_uid(&self, uid: U) {
        if uid.as_usize() >= self.next_uid_value.load(Ordering::Relaxed) {
            self.next_uid_value
                .store(uid.as_usize().saturating_add(1), Ordering::Relaxed);
        }
    }
}
impl<U: IsUid> PartialEq for UidFactory<U> {
    fn eq(&self, other: &Self) -> bool {
        self.next_uid_value.load(Ordering::Relaxed) == other.next_uid_value.load(Ordering::Relaxed)
    }
}
impl<U: IsUid> Clone for UidFactory<U> {
    fn clone(&self) -> Self {
        Self::new(self.next_uid_value.load(Ordering::Relaxed))
    }
}

/// Identifies a single event within a tune.
#[derive(Synonym, Serialize, Deserialize)]
pub struct EventUid(pub usize);
impl EventUid {
    /// The largest uid a tune will keep as-is. Anything bigger, which only a
    /// hand-edited seed can carry, is replaced when the tune adopts it.
    pub const MAX_VALUE: usize = u32::MAX as usize;
}
impl IsUid for EventUid {
    fn as_usize(&self) -> usize {
        self.0
    }
}

/// Mints unique [EventUid]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventUidFactory(UidFactory<EventUid>);
impl Default for EventUidFactory {
    fn default() -> Self {
        Self(UidFactory::<EventUid>::new(1))
    }
}
impl EventUidFactory {
    delegate! {
        to self.0 {
            /// Generates the next unique [EventUid].
            pub fn mint_next(&self) -> EventUid;
            /// See [UidFactory::notify_externally_minted_uid()].
            pub fn notify_externally_minted_uid(&self, uid: EventUid);
        }
    }
}
