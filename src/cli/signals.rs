//! Daemon command channel and shutdown signals

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::info;

/// Commands delivered to the daemon loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonSignal {
    Toggle,
    Cancel,
    /// SIGINT/SIGTERM
    Shutdown,
}

const CHANNEL_CAPACITY: usize = 10;

/// Merges OS shutdown signals with commands from the control socket
pub struct DaemonSignalHandler {
    receiver: mpsc::Receiver<DaemonSignal>,
}

impl DaemonSignalHandler {
    /// Start listening for SIGINT/SIGTERM. The returned sender feeds the
    /// same loop (used by the socket server).
    pub async fn new() -> Result<(Self, mpsc::Sender<DaemonSignal>), std::io::Error> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        for (kind, name) in [
            (SignalKind::interrupt(), "SIGINT"),
            (SignalKind::terminate(), "SIGTERM"),
        ] {
            let mut stream = signal(kind)?;
            let tx = tx.clone();
            tokio::spawn(async move {
                if stream.recv().await.is_some() {
                    info!(signal = name, "Shutdown requested");
                    let _ = tx.send(DaemonSignal::Shutdown).await;
                }
            });
        }

        Ok((Self { receiver: rx }, tx))
    }

    /// Handler fed only by `tx`; no OS signals are installed
    pub fn detached() -> (Self, mpsc::Sender<DaemonSignal>) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        (Self { receiver: rx }, tx)
    }

    pub async fn recv(&mut self) -> Option<DaemonSignal> {
        self.receiver.recv().await
    }
}
