use tokio::sync::broadcast;

/// Payload-free "ledger state changed, refresh now" notification.
///
/// Emitted after a mint or a finalize; the scheduler listens and runs one
/// reconciliation per notification, still subject to the cooldown.
#[derive(Clone)]
pub struct RefreshSignal {
    sender: broadcast::Sender<()>,
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new(16)
    }
}

impl RefreshSignal {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Never blocks. With no listener the notification is simply lost.
    pub fn notify(&self) {
        let _ = self.sender.send(());
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
