//! LE device addressing.
//!
//! An [`Endpoint`] is one side of a peer link: a 6-byte device address plus
//! the public/random tag that selects how the controller interprets it.

use std::fmt;

use bluer::{Address, AddressType};
use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

/// LE address type, as carried in the 1-bit HCI tag.
#[repr(u8)]
#[derive(
   Debug,
   Default,
   Clone,
   Copy,
   PartialEq,
   Eq,
   Hash,
   Serialize,
   Deserialize,
   strum::FromRepr,
   strum::Display,
   strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AddressKind {
   #[default]
   Public = 0x00,
   Random = 0x01,
}

impl AddressKind {
   /// Socket-layer address type for this kind.
   pub const fn address_type(self) -> AddressType {
      match self {
         Self::Public => AddressType::LePublic,
         Self::Random => AddressType::LeRandom,
      }
   }
}

impl TryFrom<u8> for AddressKind {
   type Error = LinkError;

   fn try_from(tag: u8) -> Result<Self> {
      Self::from_repr(tag)
         .ok_or_else(|| LinkError::InvalidAddress(format!("unknown address type tag {tag:#04x}")))
   }
}

/// One side of a link: device address and address kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
   pub address: Address,
   pub kind: AddressKind,
}

impl Endpoint {
   pub const fn new(address: Address, kind: AddressKind) -> Self {
      Self { address, kind }
   }

   /// Parses a `XX:XX:XX:XX:XX:XX` address string.
   pub fn parse(address: &str, kind: AddressKind) -> Result<Self> {
      let address = address
         .trim()
         .parse::<Address>()
         .map_err(|_| LinkError::InvalidAddress(address.to_string()))?;
      Ok(Self::new(address, kind))
   }

   /// Whether this is the wildcard address `00:00:00:00:00:00`.
   pub fn is_any(&self) -> bool {
      self.address == Address::any()
   }
}

impl fmt::Display for Endpoint {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}/{}", self.address, self.kind)
   }
}
