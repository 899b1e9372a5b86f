//! Peer link lifecycle.
//!
//! A [`PeerLink`] owns at most one connected L2CAP socket to one remote LE
//! device and carries the idle-expiry deadline its owner uses for reaping.
//!
//! ```text
//! Created ──connect()──▶ Connected ──disconnect() / peer hangup──▶ Idle
//!    ▲                                                              │
//!    └──────────────── both idle, both reapable ◀───────────────────┘
//! ```
//!
//! A connected link is pinned (no expiry). Leaving `Connected` always sets a
//! fresh expiry of `now + idle_timeout`.

use std::{
   fmt, io,
   time::{Duration, Instant},
};

use log::{debug, info, warn};
use tokio::time;

use crate::{
   address::Endpoint,
   bluetooth::l2cap::{Connector, L2capConnector, LinkStream},
   error::{LinkError, Result},
   event::{LinkEvent, ParentRef},
};

/// Default time an idle link stays alive before it becomes reapable
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
/// Default bound on a single connection attempt
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for a single link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkOptions {
   pub idle_timeout: Duration,
   pub connect_timeout: Duration,
}

impl Default for LinkOptions {
   fn default() -> Self {
      Self {
         idle_timeout: DEFAULT_IDLE_TIMEOUT,
         connect_timeout: DEFAULT_CONNECT_TIMEOUT,
      }
   }
}

/// Where a link is in its lifecycle. Dropping the link ends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum LinkState {
   /// Never connected.
   Created,
   /// Socket open, expiry cleared.
   Connected,
   /// Socket closed by `disconnect()` or a peer hangup.
   Idle,
}

/// A single LE peer link.
///
/// Move-only: the socket has exactly one owner. To talk to the same peer
/// from elsewhere, build a new link.
pub struct PeerLink<C: Connector = L2capConnector> {
   connector: C,
   socket: Option<C::Stream>,
   local: Endpoint,
   remote: Endpoint,
   state: LinkState,
   expires: Option<Instant>,
   options: LinkOptions,
   parent: ParentRef,
}

impl PeerLink {
   /// Creates an unconnected link backed by a kernel L2CAP socket.
   pub fn new(
      parent: ParentRef,
      local: Endpoint,
      remote: Endpoint,
      expires: Instant,
   ) -> Result<Self> {
      Self::with_connector(L2capConnector, parent, local, remote, expires)
   }
}

impl<C: Connector> PeerLink<C> {
   pub fn with_connector(
      connector: C,
      parent: ParentRef,
      local: Endpoint,
      remote: Endpoint,
      expires: Instant,
   ) -> Result<Self> {
      if remote.is_any() {
         return Err(LinkError::InvalidAddress(format!(
            "{remote} is not a connectable peer"
         )));
      }
      if local == remote {
         return Err(LinkError::InvalidAddress(format!(
            "local and remote are both {remote}"
         )));
      }

      Ok(Self {
         connector,
         socket: None,
         local,
         remote,
         state: LinkState::Created,
         expires: Some(expires),
         options: LinkOptions::default(),
         parent,
      })
   }

   #[must_use]
   pub fn with_options(mut self, options: LinkOptions) -> Self {
      self.options = options;
      self
   }

   pub const fn local(&self) -> &Endpoint {
      &self.local
   }

   pub const fn remote(&self) -> &Endpoint {
      &self.remote
   }

   pub const fn state(&self) -> LinkState {
      self.state
   }

   pub const fn is_connected(&self) -> bool {
      self.socket.is_some()
   }

   /// Opens the socket and connects to the remote endpoint.
   ///
   /// On success the link is pinned. On failure nothing changes: no socket is
   /// kept and the expiry is left as it was. There is no retry here.
   pub async fn connect(&mut self) -> Result<()> {
      if self.is_connected() {
         return Err(LinkError::AlreadyConnected {
            remote: self.remote,
         });
      }

      debug!("Connecting {} → {}", self.local, self.remote);
      let attempt = self.connector.connect(self.local, self.remote);
      let socket = match time::timeout(self.options.connect_timeout, attempt).await {
         Ok(Ok(socket)) => socket,
         Ok(Err(source)) => {
            warn!("Failed to connect to {}: {source}", self.remote);
            return Err(LinkError::ConnectFailed {
               remote: self.remote,
               source,
            });
         },
         Err(_) => {
            warn!(
               "Connect to {} timed out after {:?}",
               self.remote, self.options.connect_timeout
            );
            return Err(LinkError::ConnectFailed {
               remote: self.remote,
               source: io::Error::from_raw_os_error(libc::ETIMEDOUT),
            });
         },
      };

      self.socket = Some(socket);
      self.state = LinkState::Connected;
      self.expires = None;
      info!("Link to {} connected", self.remote);
      Ok(())
   }

   /// Closes the socket if open, moves to `Idle` and restarts the idle
   /// countdown. A link that never connected also ends up `Idle`.
   ///
   /// Safe to call any number of times.
   pub fn disconnect(&mut self) {
      if self.socket.take().is_some() {
         info!("Link to {} disconnected", self.remote);
      }
      self.state = LinkState::Idle;
      self.touch();
   }

   /// Checks the open socket for a peer-initiated teardown.
   ///
   /// A hung-up link is closed and handled like `disconnect()`, then the
   /// parent is told with [`LinkEvent::PeerHangup`]. This is the only place a
   /// link calls its parent. Returns whether a hangup was found.
   pub fn poll_hangup(&mut self) -> Result<bool> {
      let Some(socket) = &self.socket else {
         return Ok(false);
      };
      if !socket.hung_up()? {
         return Ok(false);
      }

      self.socket = None;
      self.state = LinkState::Idle;
      self.touch();
      warn!("Peer {} hung up", self.remote);
      self.report(LinkEvent::PeerHangup);
      Ok(true)
   }

   pub fn set_expires(&mut self, expires: Instant) {
      self.expires = Some(expires);
   }

   pub const fn expires(&self) -> Option<Instant> {
      self.expires
   }

   /// Pins the link; it stays unexpiring until `set_expires` or a disconnect.
   pub fn clear_expires(&mut self) {
      self.expires = None;
   }

   pub fn is_expired(&self, now: Instant) -> bool {
      self.expires.is_some_and(|t| t <= now)
   }

   /// Whether an owner may drop this link at `now`.
   pub fn is_reapable(&self, now: Instant) -> bool {
      !self.is_connected() && self.is_expired(now)
   }

   fn touch(&mut self) {
      self.expires = Some(Instant::now() + self.options.idle_timeout);
   }

   fn report(&self, event: LinkEvent) {
      match self.parent.upgrade() {
         Some(parent) => parent.notify(&self.local, &self.remote, event),
         None => debug!("No parent for {}, dropping {event}", self.remote),
      }
   }
}

impl<C: Connector> Drop for PeerLink<C> {
   fn drop(&mut self) {
      if self.socket.take().is_some() {
         debug!("Closing link to {} on release", self.remote);
      }
   }
}

impl<C: Connector> fmt::Debug for PeerLink<C> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("PeerLink")
         .field("local", &self.local)
         .field("remote", &self.remote)
         .field("state", &self.state)
         .field("expires", &self.expires)
         .finish_non_exhaustive()
   }
}
