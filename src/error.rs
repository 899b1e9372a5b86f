//! Error types for peer links.
//!
//! This module defines every error a [`PeerLink`](crate::link::PeerLink) or
//! the surrounding configuration layer can report to its caller.

use std::io;

use thiserror::Error;

use crate::address::Endpoint;

/// Main error type for the peer-link core.
#[derive(Error, Debug)]
pub enum LinkError {
   #[error("Link to {remote} is already connected")]
   AlreadyConnected { remote: Endpoint },

   #[error("Connect to {remote} failed: {source}")]
   ConnectFailed {
      remote: Endpoint,
      #[source]
      source: io::Error,
   },

   #[error("Invalid address: {0}")]
   InvalidAddress(String),

   #[error("I/O error: {0}")]
   Io(#[from] io::Error),

   #[error("Could not determine config directory")]
   ConfigDirNotFound,

   #[error("TOML parsing error: {0}")]
   TomlParse(#[from] toml::de::Error),

   #[error("TOML serialization error: {0}")]
   TomlSerialize(#[from] toml::ser::Error),
}

impl LinkError {
   /// OS error code behind a failed connect, if the OS reported one.
   pub fn os_error(&self) -> Option<i32> {
      match self {
         Self::ConnectFailed { source, .. } => source.raw_os_error(),
         Self::Io(e) => e.raw_os_error(),
         _ => None,
      }
   }

   /// I/O error kind behind a failed connect.
   pub fn io_kind(&self) -> Option<io::ErrorKind> {
      match self {
         Self::ConnectFailed { source, .. } => Some(source.kind()),
         Self::Io(e) => Some(e.kind()),
         _ => None,
      }
   }
}

/// Convenience type alias for Results with `LinkError`.
pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
   use super::*;
   use crate::address::AddressKind;

   #[test]
   fn test_connect_failed_keeps_os_code() {
      let remote = Endpoint::parse("BB:BB:BB:BB:BB:BB", AddressKind::Random).unwrap();
      let err = LinkError::ConnectFailed {
         remote,
         source: io::Error::from_raw_os_error(libc::EHOSTUNREACH),
      };

      assert_eq!(err.os_error(), Some(libc::EHOSTUNREACH));
      assert!(err.to_string().starts_with("Connect to BB:BB:BB:BB:BB:BB/random failed"));
   }

   #[test]
   fn test_non_io_errors_have_no_code() {
      let err = LinkError::InvalidAddress("nope".into());
      assert_eq!(err.os_error(), None);
      assert_eq!(err.io_kind(), None);
   }
}
