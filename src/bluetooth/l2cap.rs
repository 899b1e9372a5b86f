//! L2CAP socket setup for LE peer links.
//!
//! This module opens the connection-oriented socket a
//! [`PeerLink`](crate::link::PeerLink) holds, bound to the local endpoint and
//! connected to the remote one on the ATT fixed channel.

use std::{io, os::fd::AsRawFd};

use bluer::l2cap::{SeqPacket, Socket, SocketAddr};
use log::debug;

use crate::address::Endpoint;

/// Fixed channel id of the Attribute Protocol on LE links
pub const ATT_CID: u16 = 0x0004;
/// LE fixed channels are addressed by CID, never by PSM
const PSM_NONE: u16 = 0;

/// An open, connected link socket.
pub trait LinkStream: Send {
   /// Non-blocking check for a peer-initiated teardown.
   fn hung_up(&self) -> io::Result<bool>;
}

/// Opens link sockets.
pub trait Connector: Send + Sync {
   type Stream: LinkStream;

   /// Creates a socket, binds it to `local` and connects it to `remote`.
   ///
   /// Dropping the returned future closes whatever socket it had opened.
   fn connect(
      &self,
      local: Endpoint,
      remote: Endpoint,
   ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Socket address of `ep` on the ATT fixed channel.
pub fn socket_addr(ep: Endpoint) -> SocketAddr {
   let mut sa = SocketAddr::new(ep.address, ep.kind.address_type(), PSM_NONE);
   sa.cid = ATT_CID;
   sa
}

/// Kernel-backed connector (AF_BLUETOOTH, SOCK_SEQPACKET, BTPROTO_L2CAP).
#[derive(Debug, Default, Clone, Copy)]
pub struct L2capConnector;

impl Connector for L2capConnector {
   type Stream = SeqPacket;

   async fn connect(&self, local: Endpoint, remote: Endpoint) -> io::Result<SeqPacket> {
      debug!("Creating L2CAP socket on {local}");

      let socket = Socket::new_seq_packet()?;
      socket.bind(socket_addr(local))?;

      debug!("Connecting {local} → {remote}");
      socket.connect(socket_addr(remote)).await
   }
}

impl LinkStream for SeqPacket {
   fn hung_up(&self) -> io::Result<bool> {
      let mut pfd = libc::pollfd {
         fd: self.as_raw_fd(),
         events: libc::POLLRDHUP,
         revents: 0,
      };
      // Zero timeout: readiness probe only, nothing is read.
      let rc = unsafe { libc::poll(&mut pfd, 1, 0) };
      if rc < 0 {
         return Err(io::Error::last_os_error());
      }
      Ok(pfd.revents & (libc::POLLHUP | libc::POLLRDHUP | libc::POLLERR) != 0)
   }
}

#[cfg(test)]
mod tests {
   use bluer::AddressType;

   use super::*;
   use crate::address::AddressKind;

   #[test]
   fn test_socket_addr_uses_att_channel() {
      let ep = Endpoint::parse("BB:BB:BB:BB:BB:BB", AddressKind::Random).unwrap();
      let sa = socket_addr(ep);

      assert_eq!(sa.addr, ep.address);
      assert_eq!(sa.addr_type, AddressType::LeRandom);
      assert_eq!(sa.psm, PSM_NONE);
      assert_eq!(sa.cid, ATT_CID);
   }

   #[test]
   fn test_socket_addr_keeps_kind_per_side() {
      let local = Endpoint::parse("AA:AA:AA:AA:AA:AA", AddressKind::Public).unwrap();
      let remote = Endpoint::parse("BB:BB:BB:BB:BB:BB", AddressKind::Random).unwrap();

      assert_eq!(socket_addr(local).addr_type, AddressType::LePublic);
      assert_eq!(socket_addr(remote).addr_type, AddressType::LeRandom);
   }
}
