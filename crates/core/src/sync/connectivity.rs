//! Connectivity monitor: wraps the platform reachability signal into a
//! watch channel gating the sync processor.

use tokio::sync::watch;

/// Event-driven online/offline flag. New subscribers observe the current
/// value immediately; there is no initial "unknown" gap.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    sender: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (sender, _) = watch::channel(initially_online);
        Self { sender }
    }

    /// Fed by the platform reachability callback. Subscribers are only
    /// notified on actual transitions.
    pub fn set_online(&self, online: bool) {
        self.sender.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }

    pub fn is_online(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
