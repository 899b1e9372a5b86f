//! Configuration management for the peer-link daemon.
//!
//! This module handles loading and saving configuration from disk,
//! including link timing parameters and the peers to hold links to.

use std::{
   env, fs,
   path::{Path, PathBuf},
   time::Duration,
};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::{
   address::{AddressKind, Endpoint},
   error::{LinkError, Result},
   link::LinkOptions,
};

/// Main configuration structure for the daemon.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
   #[serde(default = "default_idle_timeout")]
   pub idle_timeout_sec: u64,

   #[serde(default = "default_connect_timeout")]
   pub connect_timeout_sec: u64,

   #[serde(default = "default_hangup_check_interval")]
   pub hangup_check_interval_sec: u64,

   #[serde(default = "default_reconnect_delay")]
   pub reconnect_delay_sec: u64,

   #[serde(default)]
   pub links: Vec<LinkSpec>,
}

/// One configured peer link.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LinkSpec {
   pub name: SmolStr,
   pub local: String,
   #[serde(default)]
   pub local_type: AddressKind,
   pub remote: String,
   #[serde(default)]
   pub remote_type: AddressKind,
}

impl LinkSpec {
   pub fn local_endpoint(&self) -> Result<Endpoint> {
      Endpoint::parse(&self.local, self.local_type)
   }

   pub fn remote_endpoint(&self) -> Result<Endpoint> {
      Endpoint::parse(&self.remote, self.remote_type)
   }
}

const fn default_idle_timeout() -> u64 {
   60
}

const fn default_connect_timeout() -> u64 {
   10
}

const fn default_hangup_check_interval() -> u64 {
   5
}

const fn default_reconnect_delay() -> u64 {
   10
}

impl Default for Config {
   fn default() -> Self {
      Self {
         idle_timeout_sec: default_idle_timeout(),
         connect_timeout_sec: default_connect_timeout(),
         hangup_check_interval_sec: default_hangup_check_interval(),
         reconnect_delay_sec: default_reconnect_delay(),
         links: vec![],
      }
   }
}

impl Config {
   /// Loads configuration from disk or creates default if not exists.
   pub fn load() -> Result<Self> {
      let config_path = Self::config_path()?;

      if config_path.exists() {
         Self::load_from(&config_path)
      } else {
         let config = Self::default();
         config.save_to(&config_path)?;
         Ok(config)
      }
   }

   pub fn load_from(path: &Path) -> Result<Self> {
      let contents = fs::read_to_string(path)?;
      Ok(toml::from_str(&contents)?)
   }

   /// Saves the current configuration to `path`.
   pub fn save_to(&self, path: &Path) -> Result<()> {
      if let Some(parent) = path.parent() {
         fs::create_dir_all(parent)?;
      }

      let contents = toml::to_string_pretty(self)?;
      fs::write(path, contents)?;

      Ok(())
   }

   fn config_path() -> Result<PathBuf> {
      let config_dir = if let Ok(home) = env::var("PEERLINK_HOME") {
         PathBuf::from(home)
      } else if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
         PathBuf::from(config_home)
      } else if let Ok(home) = env::var("HOME") {
         PathBuf::from(home).join(".config")
      } else {
         dirs::config_dir().ok_or(LinkError::ConfigDirNotFound)?
      };

      Ok(config_dir.join("peerlinkd").join("config.toml"))
   }

   pub const fn link_options(&self) -> LinkOptions {
      LinkOptions {
         idle_timeout: Duration::from_secs(self.idle_timeout_sec),
         connect_timeout: Duration::from_secs(self.connect_timeout_sec),
      }
   }

   pub const fn hangup_check_interval(&self) -> Duration {
      Duration::from_secs(self.hangup_check_interval_sec)
   }

   pub const fn reconnect_delay(&self) -> Duration {
      Duration::from_secs(self.reconnect_delay_sec)
   }
}
