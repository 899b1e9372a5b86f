//! Connection-oriented Bluetooth LE peer links.
//!
//! A [`PeerLink`] holds one L2CAP socket between a local and a remote LE
//! endpoint and tracks the idle-expiry deadline its owner uses to reap
//! unused links.

pub mod address;
pub mod bluetooth;
pub mod config;
pub mod error;
pub mod event;
pub mod link;

pub use address::{AddressKind, Endpoint};
pub use error::{LinkError, Result};
pub use event::{LinkEvent, LinkObserver, ParentRef};
pub use link::{LinkOptions, LinkState, PeerLink};
