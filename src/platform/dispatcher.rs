//! Event delivery
//!
//! Packet-in and config events are queued on a bounded channel and
//! drained by a pool of worker tasks, so one app's handlers run
//! concurrently the way a controller's event threads would run them.

use crate::apps::App;
use crate::config::NetworkConfigEvent;
use crate::fabric::{InboundPacket, PacketContext};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

/// Default channel capacity between the feeder and the workers
pub const DEFAULT_QUEUE_DEPTH: usize = 256;

/// Default period of the table sweep
pub const DEFAULT_AGING_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Packet(InboundPacket),
    Config(NetworkConfigEvent),
}

pub struct Dispatcher {
    app: Arc<dyn App>,
    workers: usize,
    queue_depth: usize,
    aging_interval: Option<Duration>,
}

impl Dispatcher {
    pub fn new(app: Arc<dyn App>, workers: usize) -> Self {
        Self {
            app,
            workers: workers.max(1),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            aging_interval: None,
        }
    }

    /// Sweep the app's tables every `interval` while events are running
    pub fn with_aging(mut self, interval: Duration) -> Self {
        self.aging_interval = Some(interval);
        self
    }

    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Deliver one event on the calling task
    pub fn deliver(app: &dyn App, event: PlatformEvent) {
        match event {
            PlatformEvent::Packet(inbound) => app.process(&PacketContext::new(inbound)),
            PlatformEvent::Config(event) => app.config_event(&event),
        }
    }

    /// Feed `events` to the worker pool and wait until all are handled
    ///
    /// Returns how many events the workers handled.
    pub async fn run<I>(&self, events: I) -> usize
    where
        I: IntoIterator<Item = PlatformEvent>,
    {
        let (tx, rx) = mpsc::channel::<PlatformEvent>(self.queue_depth);
        let rx = Arc::new(Mutex::new(rx));

        let handles: Vec<_> = (0..self.workers)
            .map(|id| {
                let rx = Arc::clone(&rx);
                let app = Arc::clone(&self.app);
                tokio::spawn(async move {
                    let mut handled = 0usize;
                    loop {
                        // Guard is released before the handler runs
                        let next = rx.lock().await.recv().await;
                        match next {
                            Some(event) => {
                                Self::deliver(app.as_ref(), event);
                                handled += 1;
                            }
                            None => break,
                        }
                    }
                    debug!("worker {} done after {} events", id, handled);
                    handled
                })
            })
            .collect();

        let aging = self.aging_interval.map(|period| {
            let app = Arc::clone(&self.app);
            tokio::spawn(async move {
                let mut timer = tokio::time::interval(period);
                // First tick completes immediately
                timer.tick().await;
                loop {
                    timer.tick().await;
                    let removed = app.run_aging();
                    if removed > 0 {
                        debug!("aging: removed {} entries", removed);
                    }
                }
            })
        });

        for event in events {
            if tx.send(event).await.is_err() {
                warn!("all workers exited early, dropping remaining events");
                break;
            }
        }
        drop(tx);

        let mut total = 0;
        for handle in handles {
            match handle.await {
                Ok(handled) => total += handled,
                Err(e) => warn!("worker failed: {}", e),
            }
        }
        if let Some(handle) = aging {
            handle.abort();
        }
        total
    }
}
