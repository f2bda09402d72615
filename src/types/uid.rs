// Copyright (c) 2024 Mike Tsao

//! Unique identifiers for modules, and the factory that helps ensure they are
//! in fact unique.

use core::sync::atomic::Ordering;
use core::{hash::Hash, marker::PhantomData, sync::atomic::AtomicUsize};
use serde::{Deserialize, Serialize};
use synonym::Synonym;

/// An identifier that is unique within the current patch. Module identity in
/// the graph, the adjacency lists, and modulation routes is always a [Uid],
/// never a reference.
#[derive(Synonym, Serialize, Deserialize, Eq, PartialEq)]
// See
// https://doc.rust-lang.org/stable/std/marker/trait.StructuralPartialEq.html
// for explanation why we derive PartialEq rather than letting Synonym do it.
#[synonym(skip(PartialEq))]
#[serde(rename_all = "kebab-case")]
pub struct Uid(pub usize);
impl IsUid for Uid {
    fn as_usize(&self) -> usize {
        self.0
    }
}

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
impl<U: IsUid> Default for UidFactory<U> {
    // Uid zero is reserved as "no module," so minting starts at one.
    fn default() -> Self {
        Self::new(1)
    }
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

    /// Returns the value that the next call to [UidFactory::mint_next()] will
    /// use, without consuming it.
    pub fn peek_next(&self) -> usize {
        self.next_uid_value.load(Ordering::Relaxed)
    }
}
