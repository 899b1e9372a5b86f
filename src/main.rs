//! Peer-link daemon.
//!
//! Holds one LE L2CAP link per configured peer, reconnecting with backoff
//! when a link drops, until interrupted.

use std::{
   sync::Arc,
   time::{Duration, Instant},
};

use log::{error, info, warn};
use rand::Rng;
use smol_str::SmolStr;
use tokio::{
   select, signal,
   sync::watch,
   task::JoinSet,
   time::{self, MissedTickBehavior},
};

use peerlink::{
   Endpoint, LinkEvent, LinkObserver, PeerLink, Result,
   config::{Config, LinkSpec},
   event,
};

/// Upper bound on the reconnect backoff
const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(120);

/// Logs teardown reported by the links.
struct LogObserver;

impl LinkObserver for LogObserver {
   fn notify(&self, local: &Endpoint, remote: &Endpoint, event: LinkEvent) {
      warn!("{local} → {remote}: {event}");
   }
}

#[tokio::main]
async fn main() -> Result<()> {
   env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

   info!("Starting peerlinkd...");

   let config = Config::load()?;
   info!(
      "Loaded configuration with {} configured links",
      config.links.len()
   );
   if config.links.is_empty() {
      warn!("No links configured, nothing to hold");
   }

   let observer = Arc::new(LogObserver);
   let (shutdown_tx, shutdown_rx) = watch::channel(false);
   let mut jset = JoinSet::new();

   for spec in &config.links {
      let link = open_link(spec, &config, &observer)?;
      jset.spawn(hold(spec.name.clone(), link, config.clone(), shutdown_rx.clone()));
   }

   signal::ctrl_c().await?;
   info!("Shutting down peerlinkd...");
   let _ = shutdown_tx.send(true);

   while let Some(res) = jset.join_next().await {
      if let Err(e) = res {
         error!("Link task failed: {e}");
      }
   }

   Ok(())
}

fn open_link(spec: &LinkSpec, config: &Config, observer: &Arc<LogObserver>) -> Result<PeerLink> {
   let options = config.link_options();
   let link = PeerLink::new(
      event::parent_ref(observer),
      spec.local_endpoint()?,
      spec.remote_endpoint()?,
      Instant::now() + options.idle_timeout,
   )?;
   Ok(link.with_options(options))
}

async fn hold(
   name: SmolStr,
   mut link: PeerLink,
   config: Config,
   mut shutdown: watch::Receiver<bool>,
) {
   let mut hangup_check = time::interval(config.hangup_check_interval());
   hangup_check.set_missed_tick_behavior(MissedTickBehavior::Skip);
   let mut retry_count = 0;

   loop {
      if !link.is_connected() {
         let res = select! {
            res = link.connect() => res,
            _ = shutdown.changed() => break,
         };
         if let Err(e) = res {
            let delay = calc_retry_delay(config.reconnect_delay(), retry_count);
            retry_count += 1;
            warn!("[{name}] {e}, retrying in {delay:?}");
            select! {
               () = time::sleep(delay) => continue,
               _ = shutdown.changed() => break,
            }
         }
         retry_count = 0;
      }

      select! {
         _ = hangup_check.tick() => match link.poll_hangup() {
            Ok(true) => info!("[{name}] peer went away, reconnecting"),
            Ok(false) => {},
            Err(e) => warn!("[{name}] hangup check failed: {e}"),
         },
         _ = shutdown.changed() => break,
      }
   }

   link.disconnect();
}

fn calc_retry_delay(base_delay: Duration, retry_count: u32) -> Duration {
   let exponential = base_delay * (1 << retry_count.min(4));
   let delay = exponential.min(MAX_RECONNECT_DELAY);
   let jitter = rand::thread_rng().gen_range(0..1000);
   delay + Duration::from_millis(jitter)
}
