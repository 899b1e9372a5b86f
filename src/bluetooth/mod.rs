//! Bluetooth socket layer.
//!
//! This module owns everything that touches the kernel's L2CAP sockets.

pub mod l2cap;
