//! Lifecycle reporting from a link to its owner.
//!
//! A [`PeerLink`](crate::link::PeerLink) only ever holds its owner weakly and
//! talks to it through [`LinkObserver`]; it reports, it never mutates.
//! Only teardown the owner did not cause itself is reported. Connecting,
//! disconnecting and dropping a link are silent.

use std::sync::{Arc, Weak};

use crate::address::Endpoint;

/// Lifecycle events reported by a peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum LinkEvent {
   /// The peer tore the link down; discovered by `poll_hangup()`.
   PeerHangup,
}

/// Narrow capability a link uses to report to its owner.
pub trait LinkObserver: Send + Sync {
   /// Called synchronously from `poll_hangup()`.
   ///
   /// An owner that polls its links while holding its own lock must not take
   /// that lock again here.
   fn notify(&self, local: &Endpoint, remote: &Endpoint, event: LinkEvent);
}

/// Non-owning handle to a link's owner.
pub type ParentRef = Weak<dyn LinkObserver>;

/// Observer that drops every event.
#[derive(Debug, Default)]
pub struct Detached;

impl LinkObserver for Detached {
   fn notify(&self, _: &Endpoint, _: &Endpoint, _: LinkEvent) {}
}

/// A parent reference that never resolves.
pub fn detached() -> ParentRef {
   Weak::<Detached>::new()
}

/// Downgrades an owner into the handle a link keeps.
pub fn parent_ref<T: LinkObserver + 'static>(owner: &Arc<T>) -> ParentRef {
   Arc::downgrade(owner) as ParentRef
}
